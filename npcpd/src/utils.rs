//! General Utilities

use std::ops::{Range, Sub};

/// Split `0..n` at the given change points.
///
/// Every change point is the index of the last sample of its segment, so the
/// ranges start at `0` and after every change point and together cover `0..n`.
///
/// # Example
/// ```rust
/// use npcpd::utils::segments;
///
/// assert_eq!(segments(&[4, 9], 12), vec![0..5, 5..10, 10..12]);
/// assert_eq!(segments(&[], 3), vec![0..3]);
/// ```
#[must_use]
pub fn segments(changepoints: &[usize], n: usize) -> Vec<Range<usize>> {
    let mut start = 0;
    let mut result: Vec<Range<usize>> = changepoints
        .iter()
        .map(|&cp| {
            let segment = start..cp + 1;
            start = cp + 1;
            segment
        })
        .collect();
    if start < n || result.is_empty() {
        result.push(start..n);
    }
    result
}

fn diff<T>(a: T, b: T) -> T
where
    T: PartialOrd + Sub<Output = T>,
{
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// The max-norm or max-error between two sequences.
///
/// Handy for comparing detected change points with where they were planted.
///
/// # Panics
/// If the input slices are empty or not of equal length, this will panic.
#[must_use]
pub fn max_error<T>(predicted: &[T], expected: &[T]) -> T
where
    T: PartialOrd + Copy + Sub<Output = T>,
{
    assert_eq!(
        predicted.len(),
        expected.len(),
        "predicted and expected must be the same size."
    );
    assert!(!predicted.is_empty(), "Sequences cannot be empty");
    predicted
        .iter()
        .zip(expected)
        .map(|(&a, &b)| diff(a, b))
        .fold(diff(predicted[0], expected[0]), |acc, d| {
            if d > acc {
                d
            } else {
                acc
            }
        })
}
