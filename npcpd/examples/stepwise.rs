use npcpd::utils::segments;
use npcpd::{select, Algorithm, Detector, DetectorConfig, Error};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rv::prelude::*;

fn draw<D: Rv<f64>, R: Rng>(dist: &D, n: usize, rng: &mut R) -> Vec<f64> {
    dist.sample(n, rng)
}

fn main() -> Result<(), Error> {
    let mut rng = SmallRng::seed_from_u64(0x12345);

    // Shifted mean, then inflated variance, then heavy tails
    let data: Vec<f64> = [
        draw(&Gaussian::new_unchecked(0.0, 1.0), 300, &mut rng),
        draw(&Gaussian::new_unchecked(4.0, 1.0), 300, &mut rng),
        draw(&Gaussian::new_unchecked(4.0, 4.0), 300, &mut rng),
        draw(&Cauchy::new_unchecked(0.0, 1.0), 300, &mut rng),
    ]
    .concat();

    for algorithm in [Algorithm::EdPelt, Algorithm::RqqPelt] {
        let detector = Detector::new(
            DetectorConfig::default()
                .with_algorithm(algorithm)
                .with_min_distance(30),
        )?;
        let changepoints = detector.detect(&data)?;
        println!("{algorithm}: change points at {changepoints:?}");

        for segment in segments(&changepoints, data.len()) {
            let mut values = data[segment.clone()].to_vec();
            let last = values.len() - 1;
            let median = select(&mut values, last / 2, 0, last)?;
            println!("  {segment:?} median {median:.3}");
        }
    }
    Ok(())
}
