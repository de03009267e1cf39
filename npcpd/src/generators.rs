//! Functions to generate test sequences
use rand::Rng;
use rv::dist::Gaussian;
use rv::traits::Rv;

/// Draws from `G(mu_1, sigma_1)` followed by draws from `G(mu_2, sigma_2)`,
/// switching at `switch` into the sequence.
pub fn discontinuous_jump<R: Rng>(
    rng: &mut R,
    mu_1: f64,
    sigma_1: f64,
    mu_2: f64,
    sigma_2: f64,
    switch: usize,
    size: usize,
) -> Vec<f64> {
    let g1 = Gaussian::new(mu_1, sigma_1).expect("Arguments should be valid");
    let g2 = Gaussian::new(mu_2, sigma_2).expect("Arguments should be valid");
    [g1.sample(switch, rng), g2.sample(size - switch, rng)].concat()
}

/// Blocks of `width` samples around each of `levels`, perturbed by a
/// deterministic sawtooth in `[0, 3]`.
pub fn pseudo_noise_steps(levels: &[f64], width: usize) -> Vec<f64> {
    (0..levels.len() * width)
        .map(|i| levels[i / width] + ((i * 7919) % 13) as f64 / 4.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn jump_has_requested_size() {
        let mut rng = SmallRng::seed_from_u64(0x12345);
        let seq = discontinuous_jump(&mut rng, 0.0, 1.0, 10.0, 5.0, 500, 1000);
        assert_eq!(seq.len(), 1000);
        let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
        assert!(mean(&seq[..500]) < 1.0);
        assert!(mean(&seq[500..]) > 9.0);
    }

    #[test]
    fn noise_stays_in_band() {
        let seq = pseudo_noise_steps(&[0.0, 5.0], 40);
        assert_eq!(seq.len(), 80);
        assert!(seq[..40].iter().all(|&x| (0.0..=3.0).contains(&x)));
        assert!(seq[40..].iter().all(|&x| (5.0..=8.0).contains(&x)));
    }
}
