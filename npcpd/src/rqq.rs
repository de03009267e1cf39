//! Range quantile queries over a static sequence
//!
//! The tree is the recursion tree of a quickselect over the whole sequence,
//! kept around so that order statistics of arbitrary subranges can be found by
//! descending it instead of selecting from scratch. See
//! "Range Quantile Queries: Another Virtue of Wavelet Trees"; Travis Gagie,
//! Simon J. Puglisi, Andrew Turpin; SPIRE 2009, arXiv:0903.4726.

use crate::error::check_nan;
use crate::select::select_range;
use crate::Error;
use std::fmt;
use tracing::debug;

/// Nodes with at most this many values are not split any further.
const LEAF_CAPACITY: usize = 16;

#[derive(Clone, Debug, PartialEq)]
enum Node {
    /// Every value in the node is the same.
    Constant { value: f64, len: usize },
    /// Small node, queries select directly among the stored values.
    Leaf { values: Vec<f64> },
    /// The lower half of the values went to `left`, the upper half to
    /// `right`, both keeping their original order. `to_left[i]` counts how
    /// many of the first `i` values of this node went left.
    Split {
        left: usize,
        right: usize,
        to_left: Vec<u32>,
    },
}

impl Node {
    fn len(&self) -> usize {
        match self {
            Self::Constant { len, .. } => *len,
            Self::Leaf { values } => values.len(),
            Self::Split { to_left, .. } => to_left.len() - 1,
        }
    }
}

/// Answers order statistic and quantile queries over arbitrary subranges of a
/// fixed sequence.
///
/// Construction costs `O(n log n)` time and memory; each [`select`] descends
/// `O(log n)` nodes and finishes with a selection among at most sixteen
/// values. The tree is never modified after construction, so it can be shared
/// between threads.
///
/// Values are ordered by `<`, so `-0.0` and `0.0` are ties and a query may
/// return either of them.
///
/// [`select`]: RangeQuantileTree::select
///
/// # Example
/// ```rust
/// use npcpd::RangeQuantileTree;
///
/// let tree = RangeQuantileTree::new(&[5.0, 1.0, 4.0, 2.0, 3.0]).unwrap();
/// // Second smallest of [1.0, 4.0, 2.0]
/// assert_eq!(tree.select(1, 3, 1).unwrap(), 2.0);
/// // Median of the whole sequence
/// assert_eq!(tree.quantile(0, 4, 0.5).unwrap(), 3.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RangeQuantileTree {
    /// Node arena, children are always stored before their parents.
    nodes: Vec<Node>,
    root: usize,
    len: usize,
}

impl RangeQuantileTree {
    /// Build the tree over `values`.
    ///
    /// # Errors
    /// [`Error::NotANumber`] if `values` contains a NaN and
    /// [`Error::SequenceTooLong`] if it has more than `u32::MAX` values.
    pub fn new(values: &[f64]) -> Result<Self, Error> {
        check_nan(values)?;
        let len = values.len();
        if u32::try_from(len).is_err() {
            return Err(Error::SequenceTooLong { len });
        }

        let mut nodes = Vec::new();
        let root = build(&mut nodes, values.to_vec());
        debug!(len, nodes = nodes.len(), "built range quantile tree");
        Ok(Self { nodes, root, len })
    }

    /// Number of values the tree was built from.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree was built from an empty sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The `k`-th smallest (0-based) value of `values[low..=high]`.
    ///
    /// # Errors
    /// [`Error::RankOutOfRange`] if `k > high - low`.
    ///
    /// # Panics
    /// If `low > high` or `high` is out of bounds.
    pub fn select(
        &self,
        low: usize,
        high: usize,
        k: usize,
    ) -> Result<f64, Error> {
        self.check_range(low, high);
        if k > high - low {
            return Err(Error::RankOutOfRange {
                k,
                left: 0,
                right: high - low,
            });
        }
        Ok(self.select_unchecked(low, high, k))
    }

    /// Quantile `p` of `values[low..=high]`, interpolating linearly between
    /// adjacent order statistics.
    ///
    /// `p = 0` yields the minimum and `p = 1` the maximum of the range.
    ///
    /// # Errors
    /// [`Error::InvalidProbability`] if `p` is not within `[0, 1]`.
    ///
    /// # Panics
    /// If `low > high` or `high` is out of bounds.
    pub fn quantile(
        &self,
        low: usize,
        high: usize,
        p: f64,
    ) -> Result<f64, Error> {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidProbability { probability: p });
        }
        self.check_range(low, high);
        Ok(self.quantile_unchecked(low, high, p))
    }

    fn check_range(&self, low: usize, high: usize) {
        assert!(
            low <= high && high < self.len,
            "range [{low}, {high}] is out of bounds for length {}",
            self.len
        );
    }

    pub(crate) fn select_unchecked(
        &self,
        mut low: usize,
        mut high: usize,
        mut k: usize,
    ) -> f64 {
        let mut node = self.root;
        loop {
            match &self.nodes[node] {
                Node::Constant { value, .. } => return *value,
                Node::Leaf { values } => {
                    let mut buffer = [0.0; LEAF_CAPACITY];
                    let window = &mut buffer[..=high - low];
                    window.copy_from_slice(&values[low..=high]);
                    return select_range(window, k, 0, high - low);
                }
                Node::Split {
                    left,
                    right,
                    to_left,
                } => {
                    let before = to_left[low] as usize;
                    let through = to_left[high + 1] as usize;
                    let went_left = through - before;
                    if k < went_left {
                        node = *left;
                        low = before;
                        high = through - 1;
                    } else {
                        node = *right;
                        k -= went_left;
                        low -= before;
                        high -= through;
                    }
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn quantile_unchecked(
        &self,
        low: usize,
        high: usize,
        p: f64,
    ) -> f64 {
        let h = (high - low) as f64 * p;
        let floor = h.floor();
        let below = floor as usize;
        let above = h.ceil() as usize;
        let x_below = self.select_unchecked(low, high, below);
        if above == below {
            return x_below;
        }
        let x_above = self.select_unchecked(low, high, above);
        // Interpolating away from -inf would give -inf + inf
        if x_below == x_above || x_below.is_infinite() {
            return x_below;
        }
        x_below + (h - floor) * (x_above - x_below)
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: usize,
        depth: usize,
    ) -> fmt::Result {
        let indent = 2 * depth;
        match &self.nodes[node] {
            Node::Constant { value, len } => {
                writeln!(f, "{:indent$}constant {value} x{len}", "")
            }
            Node::Leaf { values } => {
                writeln!(f, "{:indent$}leaf {}", "", values.len())
            }
            Node::Split { left, right, .. } => {
                writeln!(
                    f,
                    "{:indent$}split {} ({} | {})",
                    "",
                    self.nodes[node].len(),
                    self.nodes[*left].len(),
                    self.nodes[*right].len()
                )?;
                self.fmt_node(f, *left, depth + 1)?;
                self.fmt_node(f, *right, depth + 1)
            }
        }
    }
}

/// ASCII dump of the tree shape, one node per line, for debugging.
impl fmt::Display for RangeQuantileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}

/// Push the subtree over `values` into `nodes` and return its root.
fn build(nodes: &mut Vec<Node>, values: Vec<f64>) -> usize {
    let constant = values
        .first()
        .copied()
        .filter(|&first| values.iter().all(|&x| x == first));
    let node = if let Some(value) = constant {
        Node::Constant {
            value,
            len: values.len(),
        }
    } else if values.len() <= LEAF_CAPACITY {
        Node::Leaf { values }
    } else {
        split(nodes, values)
    };
    nodes.push(node);
    nodes.len() - 1
}

/// Send the lower half of `values` left and the upper half right. Ties at
/// the median are split so both halves have exact sizes.
// Lengths fit in a u32, `RangeQuantileTree::new` checks that.
#[allow(clippy::cast_possible_truncation)]
fn split(nodes: &mut Vec<Node>, values: Vec<f64>) -> Node {
    let half = values.len().div_ceil(2);
    let mut scratch = values.clone();
    let last = scratch.len() - 1;
    let pivot = select_range(&mut scratch, half - 1, 0, last);
    let mut ties = half - values.iter().filter(|&&x| x < pivot).count();

    let mut lower = Vec::with_capacity(half);
    let mut upper = Vec::with_capacity(values.len() - half);
    let mut to_left = Vec::with_capacity(values.len() + 1);
    to_left.push(0);
    for x in values {
        if x < pivot || (x == pivot && ties > 0) {
            if x == pivot {
                ties -= 1;
            }
            lower.push(x);
        } else {
            upper.push(x);
        }
        to_left.push(lower.len() as u32);
    }

    let left = build(nodes, lower);
    let right = build(nodes, upper);
    Node::Split {
        left,
        right,
        to_left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(values: &[f64], low: usize, high: usize, k: usize) -> f64 {
        let mut range = values[low..=high].to_vec();
        range.sort_by(f64::total_cmp);
        range[k]
    }

    fn check_every_query(values: &[f64]) {
        let tree = RangeQuantileTree::new(values).unwrap();
        for low in 0..values.len() {
            for high in low..values.len() {
                for k in 0..=high - low {
                    assert_eq!(
                        tree.select(low, high, k).unwrap(),
                        brute_force(values, low, high, k),
                        "select({low}, {high}, {k}) over {values:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn every_query_on_small_arrays() {
        let mut rng = SmallRng::seed_from_u64(0xABCD);
        for len in 1..=40 {
            let distinct: Vec<f64> =
                (0..len).map(|_| rng.gen_range(-100.0..100.0)).collect();
            check_every_query(&distinct);

            let ties: Vec<f64> =
                (0..len).map(|_| f64::from(rng.gen_range(0..3))).collect();
            check_every_query(&ties);
        }
    }

    #[test]
    fn every_query_across_many_partitions() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let values: Vec<f64> =
            (0..90).map(|_| f64::from(rng.gen_range(0..25))).collect();
        check_every_query(&values);
    }

    #[test]
    fn sorted_and_constant_runs() {
        let mut values: Vec<f64> = (0..50).map(f64::from).collect();
        values.extend(std::iter::repeat(7.0).take(30));
        values.extend((0..50).rev().map(f64::from));
        check_every_query(&values);
    }

    #[test]
    fn quantile_boundaries() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);
        let values: Vec<f64> =
            (0..120).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let tree = RangeQuantileTree::new(&values).unwrap();
        for (low, high) in [(0, 119), (3, 3), (10, 57), (99, 118)] {
            let range = &values[low..=high];
            let min = range.iter().copied().fold(f64::INFINITY, f64::min);
            let max = range.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(tree.quantile(low, high, 0.0).unwrap(), min);
            assert_eq!(tree.quantile(low, high, 1.0).unwrap(), max);
        }
    }

    #[test]
    fn quantile_of_constant_range() {
        let values = [1.0, 2.0, 4.0, 4.0, 4.0, 4.0, 4.0, 0.0];
        let tree = RangeQuantileTree::new(&values).unwrap();
        for i in 0..=10 {
            let p = f64::from(i) / 10.0;
            assert_eq!(tree.quantile(2, 6, p).unwrap(), 4.0);
        }
    }

    #[test]
    fn quantile_interpolates_by_rank() {
        let tree = RangeQuantileTree::new(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_relative_eq!(tree.quantile(0, 3, 0.5).unwrap(), 2.5);
        assert_relative_eq!(tree.quantile(0, 3, 1.0 / 3.0).unwrap(), 2.0);
        assert_relative_eq!(tree.quantile(0, 3, 0.25).unwrap(), 1.75);
        assert_relative_eq!(tree.quantile(1, 2, 0.5).unwrap(), 2.0);
    }

    #[test]
    fn quantile_next_to_infinities() {
        let values = [f64::NEG_INFINITY, 1.0, f64::INFINITY, f64::INFINITY];
        let tree = RangeQuantileTree::new(&values).unwrap();
        assert_eq!(tree.quantile(0, 1, 0.5).unwrap(), f64::NEG_INFINITY);
        assert_eq!(tree.quantile(0, 2, 0.25).unwrap(), f64::NEG_INFINITY);
        assert_eq!(tree.quantile(0, 2, 0.5).unwrap(), 1.0);
        assert_eq!(tree.quantile(1, 2, 0.5).unwrap(), f64::INFINITY);
        assert_eq!(tree.quantile(2, 3, 0.5).unwrap(), f64::INFINITY);
        for i in 0..=10 {
            let p = f64::from(i) / 10.0;
            assert!(!tree.quantile(0, 3, p).unwrap().is_nan());
        }
    }

    #[test]
    fn invalid_arguments() {
        let tree = RangeQuantileTree::new(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            tree.select(0, 1, 2),
            Err(Error::RankOutOfRange {
                k: 2,
                left: 0,
                right: 1
            })
        );
        assert_eq!(
            tree.quantile(0, 2, 1.5),
            Err(Error::InvalidProbability { probability: 1.5 })
        );
        assert!(tree.quantile(0, 2, -0.1).is_err());
        assert!(tree.quantile(0, 2, f64::NAN).is_err());
        assert_eq!(
            RangeQuantileTree::new(&[0.0, f64::NAN]),
            Err(Error::NotANumber { index: 1 })
        );
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn range_past_the_end() {
        let tree = RangeQuantileTree::new(&[1.0, 2.0, 3.0]).unwrap();
        let _ = tree.select(1, 3, 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn inverted_range() {
        let tree = RangeQuantileTree::new(&[1.0, 2.0, 3.0]).unwrap();
        let _ = tree.quantile(2, 1, 0.5);
    }

    #[test]
    fn signed_zeros_are_ties() {
        let tree = RangeQuantileTree::new(&[-0.0, 0.0, 0.0, -0.0]).unwrap();
        assert_eq!(tree.to_string(), "constant -0 x4\n");
        for k in 0..4 {
            assert_eq!(tree.select(0, 3, k).unwrap(), 0.0);
        }
        assert_eq!(tree.quantile(1, 2, 0.5).unwrap(), 0.0);
    }

    #[test]
    fn empty_sequence() {
        let tree = RangeQuantileTree::new(&[]).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn ascii_dump() {
        let values: Vec<f64> = (0..40).map(f64::from).collect();
        let tree = RangeQuantileTree::new(&values).unwrap();
        assert_eq!(tree.node_count(), 7);
        assert_eq!(
            tree.to_string(),
            "split 40 (20 | 20)\n  split 20 (10 | 10)\n    leaf 10\n    \
             leaf 10\n  split 20 (10 | 10)\n    leaf 10\n    leaf 10\n"
        );

        let tree = RangeQuantileTree::new(&[2.5; 20]).unwrap();
        assert_eq!(tree.to_string(), "constant 2.5 x20\n");
    }

    #[test]
    fn shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RangeQuantileTree>();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn select_matches_sorting(
            values in prop::collection::vec(-30_i32..30, 3..500),
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
            k in any::<prop::sample::Index>(),
        ) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let tree = RangeQuantileTree::new(&values).unwrap();
            let (a, b) = (a.index(values.len()), b.index(values.len()));
            let (low, high) = (a.min(b), a.max(b));
            let k = k.index(high - low + 1);
            prop_assert_eq!(
                tree.select(low, high, k).unwrap(),
                brute_force(&values, low, high, k)
            );
        }
    }
}
