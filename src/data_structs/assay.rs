use std::fmt::Debug;

use ndarray::{
    concatenate,
    Array2,
    Axis as NdAxis,
};

use crate::data_structs::Axis;
use crate::error::Result;

/// Capabilities a matrix type needs to live inside an [`AssayFrame`].
///
/// The container never looks at matrix elements. It only needs the shape,
/// row/column gathering, concatenation along one axis and block writes,
/// so any rectangular storage that can answer those is usable as an
/// assay. Dense [`Array2`] is provided here; sparse or disk-backed
/// implementations plug in the same way.
///
/// Positions handed to [`take`] and [`set_block`] are resolved and
/// range-checked by the container first, so implementations may index
/// without further checks.
///
/// [`AssayFrame`]: crate::data_structs::frame::AssayFrame
/// [`take`]: AssayData::take
/// [`set_block`]: AssayData::set_block
pub trait AssayData: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Length of the first dimension.
    fn nrows(&self) -> usize;

    /// Length of the second dimension.
    fn ncols(&self) -> usize;

    /// Gathers the given positions along `axis` into a new matrix.
    /// Positions may repeat and may be out of order.
    fn take(
        &self,
        axis: Axis,
        indices: &[usize],
    ) -> Self;

    /// Stacks `parts` along `axis`. The other dimension must agree
    /// across all parts and `parts` must be non-empty.
    fn concat(
        axis: Axis,
        parts: &[&Self],
    ) -> Result<Self>;

    /// Writes `src` into the block addressed by the cross product of
    /// `rows` and `cols`. `src` has shape `(rows.len(), cols.len())`;
    /// repeated positions are written in order, so the last one wins.
    fn set_block(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        src: &Self,
    );

    /// Shape as `(nrows, ncols)`.
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl<T> AssayData for Array2<T>
where
    T: Clone + Debug + PartialEq + Send + Sync + 'static,
{
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn take(
        &self,
        axis: Axis,
        indices: &[usize],
    ) -> Self {
        self.select(matrix_axis(axis), indices)
    }

    fn concat(
        axis: Axis,
        parts: &[&Self],
    ) -> Result<Self> {
        let views = parts.iter().map(|part| part.view()).collect::<Vec<_>>();
        Ok(concatenate(matrix_axis(axis), &views)?)
    }

    fn set_block(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        src: &Self,
    ) {
        for (src_row, &row) in rows.iter().enumerate() {
            for (src_col, &col) in cols.iter().enumerate() {
                self[[row, col]] = src[[src_row, src_col]].clone();
            }
        }
    }
}

fn matrix_axis(axis: Axis) -> NdAxis {
    match axis {
        Axis::Rows => NdAxis(0),
        Axis::Cols => NdAxis(1),
    }
}
