//! Small helpers shared across the container modules: position gathering,
//! duplicate-name bookkeeping and polars index conversion.

use hashbrown::HashSet;
use polars::prelude::*;

/// Clones the elements at `indices`, in order. Duplicates are allowed;
/// indices must already be range-checked.
pub(crate) fn take_clone<T: Clone>(
    values: &[T],
    indices: &[usize],
) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

/// Returns the values that occur more than once, each reported a single
/// time, in first-duplicate order.
pub(crate) fn duplicated_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>, {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicated = Vec::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            duplicated.push(name.to_string());
        }
    }
    duplicated
}

/// Converts resolved positions into a polars gather index.
pub(crate) fn idx_ca(indices: &[usize]) -> IdxCa {
    IdxCa::from_vec(
        PlSmallStr::from_static("idx"),
        indices.iter().map(|&i| i as IdxSize).collect(),
    )
}
