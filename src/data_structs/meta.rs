use polars::prelude::*;

use crate::error::Result;
use crate::utils::idx_ca;

/// An annotation table for one axis of the container.
///
/// Wraps a [`DataFrame`] together with an explicit height, because a
/// frame with zero columns cannot carry a row count on its own and the
/// container must keep "no annotation columns yet" distinct from "no
/// rows". The height is the number of described axis positions and is
/// kept in lockstep with the wrapped data whenever columns are present.
#[derive(Clone, Debug)]
pub struct MetaFrame {
    nrows: usize,
    data:  DataFrame,
}

impl MetaFrame {
    /// Creates a table with no columns describing `nrows` positions.
    pub fn empty(nrows: usize) -> Self {
        MetaFrame {
            nrows,
            data: DataFrame::empty(),
        }
    }

    /// Wraps an existing frame; the height is taken from the data.
    pub fn new(data: DataFrame) -> Self {
        MetaFrame {
            nrows: data.height(),
            data,
        }
    }

    /// Number of described axis positions.
    pub fn height(&self) -> usize {
        self.nrows
    }

    /// Number of annotation columns.
    pub fn width(&self) -> usize {
        self.data.width()
    }

    /// The wrapped annotation columns.
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes the wrapper and returns the annotation columns.
    pub fn into_data(self) -> DataFrame {
        self.data
    }

    /// True if both tables have the same column names and dtypes in the
    /// same order. Polars schema equality ignores column order, while
    /// stacking does not, so the comparison here is positional.
    pub fn same_layout(
        &self,
        other: &MetaFrame,
    ) -> bool {
        self.data.get_column_names_str() == other.data.get_column_names_str()
            && self.data.dtypes() == other.data.dtypes()
    }

    /// True if both tables describe the same number of positions with
    /// equal values, treating nulls on both sides as equal.
    pub fn content_eq(
        &self,
        other: &MetaFrame,
    ) -> bool {
        if self.nrows != other.nrows || !self.same_layout(other) {
            return false;
        }
        if self.width() == 0 {
            return true;
        }
        self.data.equals_missing(&other.data)
    }

    /// Gathers the given positions into a new table. Positions may
    /// repeat and may be out of order; they must be range-checked by
    /// the caller.
    pub fn take(
        &self,
        indices: &[usize],
    ) -> Result<MetaFrame> {
        if self.width() == 0 {
            return Ok(MetaFrame::empty(indices.len()));
        }
        let data = self.data.take(&idx_ca(indices))?;
        Ok(MetaFrame {
            nrows: indices.len(),
            data,
        })
    }

    /// Stacks `other` below this table. Layouts must already agree.
    pub fn vstack(
        &self,
        other: &MetaFrame,
    ) -> Result<MetaFrame> {
        let nrows = self.nrows + other.nrows;
        if self.width() == 0 {
            return Ok(MetaFrame::empty(nrows));
        }
        let mut data = self.data.vstack(&other.data)?;
        data.rechunk_mut();
        Ok(MetaFrame { nrows, data })
    }

    /// Returns a copy with the rows at `positions` replaced by the rows
    /// of `src`, in order. `src` must have one row per position and the
    /// same layout; repeated positions are written in order, so the
    /// last one wins.
    pub fn assign_rows(
        &self,
        positions: &[usize],
        src: &MetaFrame,
    ) -> Result<MetaFrame> {
        if self.width() == 0 {
            return Ok(self.clone());
        }
        // Gathering through a stacked copy replaces rows without any
        // per-column mutation.
        let mut pick: Vec<usize> = (0..self.nrows).collect();
        for (offset, &pos) in positions.iter().enumerate() {
            pick[pos] = self.nrows + offset;
        }
        let stacked = self.data.vstack(&src.data)?;
        let data = stacked.take(&idx_ca(&pick))?;
        Ok(MetaFrame {
            nrows: self.nrows,
            data,
        })
    }
}

impl From<DataFrame> for MetaFrame {
    fn from(data: DataFrame) -> Self {
        MetaFrame::new(data)
    }
}

impl PartialEq for MetaFrame {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.content_eq(other)
    }
}
