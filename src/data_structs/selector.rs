use std::ops::{
    Range,
    RangeFull,
    RangeInclusive,
};

use hashbrown::HashMap;
use itertools::Itertools;

use crate::data_structs::Axis;
use crate::error::{
    AssayFrameError,
    Result,
};

/// A selection along one axis of the container.
///
/// Selectors are descriptions, not results: every operation first resolves
/// its selectors into concrete zero-based positions with
/// [`resolve_selector`] and then applies those positions to each aligned
/// structure. Positions may repeat and may be out of order.
///
/// `From` conversions cover the common spellings, so the subsetting API
/// accepts ranges, position vectors, boolean masks and name lists
/// directly:
///
/// ```
/// use assayframe::data_structs::Selector;
///
/// let _: Selector = (..).into();
/// let _: Selector = (0..5).into();
/// let _: Selector = vec![4, 3, 3].into();
/// let _: Selector = vec![true, false, true].into();
/// let _: Selector = vec!["FEATURE_1", "FEATURE_2"].into();
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selector {
    /// Every position on the axis, in order.
    All,
    /// Explicit zero-based positions.
    Positions(Vec<usize>),
    /// One flag per position; `true` keeps it.
    Mask(Vec<bool>),
    /// Axis names; requires names to be set on the axis.
    Names(Vec<String>),
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::All
    }
}

impl From<Range<usize>> for Selector {
    fn from(value: Range<usize>) -> Self {
        Selector::Positions(value.collect())
    }
}

impl From<RangeInclusive<usize>> for Selector {
    fn from(value: RangeInclusive<usize>) -> Self {
        Selector::Positions(value.collect())
    }
}

impl From<Vec<usize>> for Selector {
    fn from(value: Vec<usize>) -> Self {
        Selector::Positions(value)
    }
}

impl<'a> From<&'a [usize]> for Selector {
    fn from(value: &'a [usize]) -> Self {
        Selector::Positions(value.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Selector {
    fn from(value: [usize; N]) -> Self {
        Selector::Positions(value.to_vec())
    }
}

impl From<Vec<bool>> for Selector {
    fn from(value: Vec<bool>) -> Self {
        Selector::Mask(value)
    }
}

impl<'a> From<&'a [bool]> for Selector {
    fn from(value: &'a [bool]) -> Self {
        Selector::Mask(value.to_vec())
    }
}

impl<const N: usize> From<[bool; N]> for Selector {
    fn from(value: [bool; N]) -> Self {
        Selector::Mask(value.to_vec())
    }
}

impl From<Vec<String>> for Selector {
    fn from(value: Vec<String>) -> Self {
        Selector::Names(value)
    }
}

impl<'a> From<Vec<&'a str>> for Selector {
    fn from(value: Vec<&'a str>) -> Self {
        Selector::Names(value.into_iter().map(String::from).collect())
    }
}

impl<'a, 'b> From<&'a [&'b str]> for Selector {
    fn from(value: &'a [&'b str]) -> Self {
        Selector::Names(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Selector {
    fn from(value: [&'a str; N]) -> Self {
        Selector::Names(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Resolves a selector into concrete zero-based positions on an axis of
/// length `len`.
///
/// Resolution is pure: it never touches the container, only the axis
/// length and (for name selections) the axis names. Every invalid
/// position or unknown name is collected before failing, so the error
/// lists the complete set of offenders rather than the first one.
///
/// # Errors
///
/// - [`AssayFrameError::IndexOutOfBounds`] when any position is `>= len`.
/// - [`AssayFrameError::LengthMismatch`] when a mask length differs from
///   `len`.
/// - [`AssayFrameError::MissingNames`] when names are selected on an
///   unnamed axis.
/// - [`AssayFrameError::UnknownNames`] when any selected name is absent.
pub fn resolve_selector(
    selector: &Selector,
    axis: Axis,
    len: usize,
    names: Option<&[String]>,
) -> Result<Vec<usize>> {
    match selector {
        Selector::All => Ok((0..len).collect()),
        Selector::Positions(positions) => {
            let bad = positions
                .iter()
                .copied()
                .filter(|&pos| pos >= len)
                .collect_vec();
            if !bad.is_empty() {
                return Err(AssayFrameError::IndexOutOfBounds {
                    axis,
                    len,
                    indices: bad,
                });
            }
            Ok(positions.clone())
        },
        Selector::Mask(mask) => {
            if mask.len() != len {
                return Err(AssayFrameError::LengthMismatch {
                    what:     format!("{} selection mask", axis),
                    found:    mask.len(),
                    expected: len,
                });
            }
            Ok(mask.iter().positions(|&keep| keep).collect())
        },
        Selector::Names(selected) => {
            let names = names.ok_or(AssayFrameError::MissingNames { axis })?;
            let index: HashMap<&str, usize> = names
                .iter()
                .enumerate()
                .map(|(pos, name)| (name.as_str(), pos))
                .collect();
            let unknown = selected
                .iter()
                .filter(|name| !index.contains_key(name.as_str()))
                .cloned()
                .collect_vec();
            if !unknown.is_empty() {
                return Err(AssayFrameError::UnknownNames {
                    axis,
                    names: unknown,
                });
            }
            Ok(selected.iter().map(|name| index[name.as_str()]).collect())
        },
    }
}
