/// Segment cost consumed by [`Pelt`](crate::Pelt).
///
/// Boundaries use one-based semantics: `tau = 0` is the position before the
/// first sample and `(tau1, tau2]` covers `values[tau1..tau2]`.
pub trait CostModel {
    /// Number of samples the model was built from.
    fn len(&self) -> usize;
    /// Whether the model was built from an empty sequence.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Cost charged once for every introduced change point.
    fn penalty(&self) -> f64;
    /// Cost of treating `(tau1, tau2]` as one segment, given that the segment
    /// before it is `(tau0, tau1]`.
    fn cost(&self, tau0: usize, tau1: usize, tau2: usize) -> f64;
}
