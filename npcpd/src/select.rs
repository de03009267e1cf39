//! Adaptive selection of order statistics
//!
//! A quickselect that picks its pivots from a median of five samples and
//! partitions three ways, so runs of equal values are settled in a single pass.
//! When partitioning keeps failing to shrink the range it falls back to the
//! median of medians of Blum, Floyd, Pratt, Rivest and Tarjan, "Time bounds for
//! selection" (1973), which bounds the worst case to linear time.

use crate::Error;
use num_traits::Float;

/// Ranges this small are finished with an insertion sort.
const SMALL_RANGE: usize = 16;

/// Find the value that would sit at position `k` if `values[left..=right]`
/// were sorted ascending.
///
/// The range is reordered partially: afterwards every value in
/// `values[left..k]` is not greater than the result and every value in
/// `values[k + 1..=right]` is not smaller. Values outside of the range are
/// left untouched. `-0.0` and `0.0` are ties, and the ordering of NaNs is
/// unspecified.
///
/// # Errors
/// If `k` lies outside of `[left, right]`, [`Error::RankOutOfRange`] is
/// returned and `values` is not modified.
///
/// # Panics
/// If `right` is out of bounds for `values`.
///
/// # Example
/// ```rust
/// use npcpd::select;
///
/// let mut values = vec![9.0, 1.0, 8.0, 2.0, 7.0, 3.0];
/// let third = select(&mut values, 2, 0, 5).unwrap();
/// assert_eq!(third, 3.0);
/// ```
pub fn select<T: Float>(
    values: &mut [T],
    k: usize,
    left: usize,
    right: usize,
) -> Result<T, Error> {
    if k < left || k > right {
        return Err(Error::RankOutOfRange { k, left, right });
    }
    assert!(
        right < values.len(),
        "range end {right} is out of bounds for length {}",
        values.len()
    );
    Ok(select_range(values, k, left, right))
}

/// [`select`] without the argument checks, for callers that already know
/// `left <= k <= right < values.len()`.
pub(crate) fn select_range<T: Float>(
    values: &mut [T],
    k: usize,
    left: usize,
    right: usize,
) -> T {
    debug_assert!(left <= k && k <= right && right < values.len());
    let len = right - left + 1;
    select_with_budget(values, k, left, right, 2 * len.ilog2() as usize)
}

/// Quickselect loop. Every round that keeps more than three quarters of the
/// range costs one unit of `budget`; with no budget left, pivots are chosen
/// by median of medians.
fn select_with_budget<T: Float>(
    values: &mut [T],
    k: usize,
    mut left: usize,
    mut right: usize,
    mut budget: usize,
) -> T {
    loop {
        let len = right - left + 1;
        if len <= SMALL_RANGE {
            insertion_sort(&mut values[left..=right]);
            return values[k];
        }

        let pivot = if budget > 0 {
            median_of_five(values, left, right)
        } else {
            median_of_medians(values, left, right)
        };

        // [left, lt) < pivot, [lt, gt) == pivot, [gt, right] > pivot
        let (lt, gt) = partition(values, left, right, pivot);
        if k < lt {
            right = lt - 1;
        } else if k >= gt {
            left = gt;
        } else {
            return pivot;
        }

        if 4 * (right - left + 1) > 3 * len {
            budget = budget.saturating_sub(1);
        }
    }
}

/// Dutch national flag partition of `values[left..=right]` around `pivot`.
///
/// Returns `(lt, gt)` such that `values[left..lt]` are less than the pivot,
/// `values[lt..gt]` equal it and `values[gt..=right]` are greater.
fn partition<T: Float>(
    values: &mut [T],
    left: usize,
    right: usize,
    pivot: T,
) -> (usize, usize) {
    let mut lt = left;
    let mut i = left;
    let mut gt = right + 1;
    while i < gt {
        if values[i] < pivot {
            values.swap(lt, i);
            lt += 1;
            i += 1;
        } else if values[i] > pivot {
            gt -= 1;
            values.swap(i, gt);
        } else {
            i += 1;
        }
    }
    (lt, gt)
}

/// Median of five samples spread evenly over the range.
fn median_of_five<T: Float>(values: &[T], left: usize, right: usize) -> T {
    let step = (right - left) / 4;
    let mut sample = [
        values[left],
        values[left + step],
        values[left + 2 * step],
        values[left + 3 * step],
        values[right],
    ];
    sort_five(&mut sample);
    sample[2]
}

/// Median of the medians of consecutive groups of five.
///
/// The group medians are gathered at the front of the range and the median
/// among them is selected recursively, again by median of medians.
fn median_of_medians<T: Float>(
    values: &mut [T],
    left: usize,
    right: usize,
) -> T {
    let mut store = left;
    let mut start = left;
    while start <= right {
        let end = (start + 4).min(right);
        let group = &mut values[start..=end];
        if group.len() == 5 {
            sort_five(group);
        } else {
            insertion_sort(group);
        }
        values.swap(store, start + (end - start) / 2);
        store += 1;
        start = end + 1;
    }
    let last_median = store - 1;
    let middle = left + (last_median - left) / 2;
    select_with_budget(values, middle, left, last_median, 0)
}

#[inline]
fn compare_exchange<T: Float>(values: &mut [T], i: usize, j: usize) {
    if values[j] < values[i] {
        values.swap(i, j);
    }
}

/// Knuth's nine comparator sorting network for the first five values.
fn sort_five<T: Float>(values: &mut [T]) {
    compare_exchange(values, 0, 1);
    compare_exchange(values, 3, 4);
    compare_exchange(values, 2, 4);
    compare_exchange(values, 2, 3);
    compare_exchange(values, 1, 4);
    compare_exchange(values, 0, 3);
    compare_exchange(values, 0, 2);
    compare_exchange(values, 1, 3);
    compare_exchange(values, 1, 2);
}

fn insertion_sort<T: Float>(values: &mut [T]) {
    for i in 1..values.len() {
        let mut j = i;
        while j > 0 && values[j] < values[j - 1] {
            values.swap(j, j - 1);
            j -= 1;
        }
    }
}
