//! Error taxonomy for container construction, access and transformation.
//!
//! Selector resolution failures always report every offending index or name
//! together with the axis they were resolved against, and [`validate`]
//! failures carry the full list of violation messages rather than the first
//! one encountered.
//!
//! [`validate`]: crate::data_structs::frame::AssayFrame::validate

use itertools::Itertools;
use polars::prelude::PolarsError;
use thiserror::Error;

use crate::data_structs::Axis;

pub type Result<T> = std::result::Result<T, AssayFrameError>;

/// Errors produced by the container and its collaborators.
#[derive(Error, Debug)]
pub enum AssayFrameError {
    /// A matrix or table shape disagrees with the container dimensions.
    #[error("{what} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        what:     String,
        found:    (usize, usize),
        expected: (usize, usize),
    },

    /// A vector, name sequence or replacement has the wrong length.
    #[error("{}", fmt_length(.what, .found, .expected))]
    LengthMismatch {
        what:     String,
        found:    usize,
        expected: usize,
    },

    /// Names on an axis are not unique.
    #[error("duplicate {axis} names: {}", .names.iter().join(", "))]
    DuplicateNames { axis: Axis, names: Vec<String> },

    /// A position selector referenced indices past the end of the axis.
    #[error(
        "{axis} selection contains out-of-bounds indices (axis length {len}): {}",
        .indices.iter().join(", ")
    )]
    IndexOutOfBounds {
        axis:    Axis,
        len:     usize,
        indices: Vec<usize>,
    },

    /// A name selector referenced names the axis does not carry.
    #[error(
        "{axis} selection contains out-of-bounds names: {}",
        .names.iter().join(", ")
    )]
    UnknownNames { axis: Axis, names: Vec<String> },

    /// A name selector was used on an axis without names.
    #[error("{axis} names are not set")]
    MissingNames { axis: Axis },

    /// Containers cannot be combined or assigned into each other.
    #[error("{reason}")]
    IncompatibleStructure { reason: String },

    /// An assay or slot lookup failed.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Aggregated validity failure; every violated invariant is listed.
    #[error("container state is invalid: {}", .violations.iter().join("; "))]
    InvalidState { violations: Vec<String> },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("matrix layout error: {0}")]
    MatrixLayout(#[from] ndarray::ShapeError),
}

fn fmt_length(
    what: &str,
    found: &usize,
    expected: &usize,
) -> String {
    if *found == 0 && *expected != 0 {
        format!("{what} has length zero, expected {expected}")
    }
    else {
        format!("{what} has length {found}, expected {expected}")
    }
}
