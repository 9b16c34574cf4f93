use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

/// One of the two dimensions of an [`AssayFrame`].
///
/// [`AssayFrame`]: crate::data_structs::frame::AssayFrame
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum Axis {
    /// First dimension (features, loci, genes).
    Rows,
    /// Second dimension (samples, cells).
    Cols,
}

impl Axis {
    /// Returns the opposite axis.
    pub fn other(&self) -> Axis {
        match self {
            Axis::Rows => Axis::Cols,
            Axis::Cols => Axis::Rows,
        }
    }
}

impl Display for Axis {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Axis::Rows => write!(f, "row"),
            Axis::Cols => write!(f, "column"),
        }
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "row" | "rows" => Ok(Axis::Rows),
            "col" | "cols" | "column" | "columns" => Ok(Axis::Cols),
            other => Err(format!("unknown axis: {}", other)),
        }
    }
}

impl Serialize for Axis {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Axis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}


/// Ties one dimension of an extension slot to a container axis.
///
/// A linked dimension must match the container length on that axis and
/// follows it through subsetting and binding. A free dimension is opaque
/// to the container.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum AxisLink {
    /// Follows the container rows.
    Rows,
    /// Follows the container columns.
    Cols,
    /// Not tied to either axis.
    Free,
}

impl AxisLink {
    /// True if this dimension follows `axis`.
    pub fn is(
        &self,
        axis: Axis,
    ) -> bool {
        matches!(
            (self, axis),
            (AxisLink::Rows, Axis::Rows) | (AxisLink::Cols, Axis::Cols)
        )
    }

    /// Required length for this dimension under the given container
    /// shape, or `None` when the dimension is free.
    pub fn expected_len(
        &self,
        nrows: usize,
        ncols: usize,
    ) -> Option<usize> {
        match self {
            AxisLink::Rows => Some(nrows),
            AxisLink::Cols => Some(ncols),
            AxisLink::Free => None,
        }
    }

    /// Picks the selection this dimension follows, or `None` when free.
    pub fn positions<'a>(
        &self,
        rows: &'a [usize],
        cols: &'a [usize],
    ) -> Option<&'a [usize]> {
        match self {
            AxisLink::Rows => Some(rows),
            AxisLink::Cols => Some(cols),
            AxisLink::Free => None,
        }
    }
}

impl From<Axis> for AxisLink {
    fn from(value: Axis) -> Self {
        match value {
            Axis::Rows => AxisLink::Rows,
            Axis::Cols => AxisLink::Cols,
        }
    }
}

impl Display for AxisLink {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            AxisLink::Rows => write!(f, "row"),
            AxisLink::Cols => write!(f, "column"),
            AxisLink::Free => write!(f, "free"),
        }
    }
}


/// Shape classification of an extension slot: which of its dimensions
/// follow the container and which are free.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum SlotRole {
    /// One-dimensional payload.
    Vector(AxisLink),
    /// Two-dimensional payload.
    Matrix(AxisLink, AxisLink),
}

impl SlotRole {
    /// True if any dimension of the slot follows `axis`.
    pub fn linked_to(
        &self,
        axis: Axis,
    ) -> bool {
        match self {
            SlotRole::Vector(link) => link.is(axis),
            SlotRole::Matrix(first, second) => {
                first.is(axis) || second.is(axis)
            },
        }
    }

    /// True if no dimension follows `axis`, meaning a bind along `axis`
    /// carries the slot through unchanged.
    pub fn fixed_under(
        &self,
        axis: Axis,
    ) -> bool {
        !self.linked_to(axis)
    }
}

impl Display for SlotRole {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            SlotRole::Vector(AxisLink::Free) => write!(f, "free vector"),
            SlotRole::Vector(link) => write!(f, "per-{} vector", link),
            SlotRole::Matrix(first, second) => {
                write!(f, "{} x {} matrix", first, second)
            },
        }
    }
}
