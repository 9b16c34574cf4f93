//! Extension slots: external structures that travel with the container.
//!
//! A slot declares, through its [`SlotRole`], which of its dimensions
//! follow the container rows or columns. The container uses the role to
//! keep the slot synchronized under subsetting, assignment and binding
//! without knowing anything else about the payload. Three payloads cover
//! the common cases:
//!
//! - [`AxisVector`], one value per position along one axis;
//! - [`LinkedMatrix`], a matrix whose dimensions may each follow an axis
//!   or stay free (embeddings, dense pairwise relations);
//! - [`AxisPairs`], a sparse set of position pairs on one axis (graphs,
//!   nearest-neighbour lists).
//!
//! Custom payloads implement [`ExtensionSlot`] directly. Positions handed
//! to [`subset`] and [`assign`] are resolved and range-checked by the
//! container first.
//!
//! [`subset`]: ExtensionSlot::subset
//! [`assign`]: ExtensionSlot::assign

use std::any::Any;
use std::fmt::Debug;

use hashbrown::HashSet;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::assay::AssayData;
use crate::data_structs::{
    Axis,
    AxisLink,
    SlotRole,
};
use crate::error::{
    AssayFrameError,
    Result,
};
use crate::utils::take_clone;

/// Protocol every extension slot implements.
///
/// The container drives slots purely through this trait: validation
/// reports shape violations as strings, subsetting and binding return
/// fresh boxed slots, and assignment rewrites the selected region in
/// place. `content_eq` is the equality used when a bind requires fixed
/// slots to agree.
pub trait ExtensionSlot: Debug + Send + Sync {
    /// How the slot dimensions relate to the container axes.
    fn role(&self) -> SlotRole;

    /// Shape violations against a container of `nrows` by `ncols`,
    /// empty when the slot fits.
    fn validate(
        &self,
        nrows: usize,
        ncols: usize,
    ) -> Vec<String>;

    /// Applies resolved row and column positions to every linked
    /// dimension.
    fn subset(
        &self,
        rows: &[usize],
        cols: &[usize],
    ) -> Box<dyn ExtensionSlot>;

    /// Writes the matching slot of a source container into the region
    /// addressed by the resolved positions.
    fn assign(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        src: &dyn ExtensionSlot,
    ) -> Result<()>;

    /// Combines this slot with the matching slots of other containers
    /// along `axis`. Called with the slot listed first among its peers;
    /// slots not linked to `axis` return a clone of themselves.
    fn bind(
        &self,
        others: &[&dyn ExtensionSlot],
        axis: Axis,
    ) -> Result<Box<dyn ExtensionSlot>>;

    /// Value equality across type-erased slots; `false` when the
    /// payload types differ.
    fn content_eq(
        &self,
        other: &dyn ExtensionSlot,
    ) -> bool;

    fn boxed_clone(&self) -> Box<dyn ExtensionSlot>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn ExtensionSlot> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Borrows a type-erased slot as its concrete payload type.
pub fn downcast_slot<S>(slot: &dyn ExtensionSlot) -> Result<&S>
where
    S: ExtensionSlot + 'static, {
    slot.as_any().downcast_ref::<S>().ok_or_else(|| {
        AssayFrameError::IncompatibleStructure {
            reason: "slot types are not compatible".to_string(),
        }
    })
}


// PER-AXIS VECTORS

/// One value per position along a single container axis.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AxisVector<T> {
    axis:   Axis,
    values: Vec<T>,
}

impl<T> AxisVector<T> {
    pub fn new(
        axis: Axis,
        values: Vec<T>,
    ) -> Self {
        AxisVector { axis, values }
    }

    /// One value per container row.
    pub fn rows(values: Vec<T>) -> Self {
        AxisVector::new(Axis::Rows, values)
    }

    /// One value per container column.
    pub fn cols(values: Vec<T>) -> Self {
        AxisVector::new(Axis::Cols, values)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T> ExtensionSlot for AxisVector<T>
where
    T: Clone + Debug + PartialEq + Send + Sync + 'static,
{
    fn role(&self) -> SlotRole {
        SlotRole::Vector(self.axis.into())
    }

    fn validate(
        &self,
        nrows: usize,
        ncols: usize,
    ) -> Vec<String> {
        let expected = match self.axis {
            Axis::Rows => nrows,
            Axis::Cols => ncols,
        };
        if self.values.len() != expected {
            vec![format!(
                "{} has length {}, expected {}",
                self.role(),
                self.values.len(),
                expected
            )]
        }
        else {
            Vec::new()
        }
    }

    fn subset(
        &self,
        rows: &[usize],
        cols: &[usize],
    ) -> Box<dyn ExtensionSlot> {
        let positions = match self.axis {
            Axis::Rows => rows,
            Axis::Cols => cols,
        };
        let values = take_clone(&self.values, positions);
        Box::new(AxisVector::new(self.axis, values))
    }

    fn assign(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        src: &dyn ExtensionSlot,
    ) -> Result<()> {
        let src = downcast_slot::<Self>(src)?;
        let positions = match self.axis {
            Axis::Rows => rows,
            Axis::Cols => cols,
        };
        if src.values.len() != positions.len() {
            return Err(AssayFrameError::IncompatibleStructure {
                reason: format!(
                    "{} has length {}, expected {}",
                    src.role(),
                    src.values.len(),
                    positions.len()
                ),
            });
        }
        for (value, &pos) in src.values.iter().zip(positions) {
            self.values[pos] = value.clone();
        }
        Ok(())
    }

    fn bind(
        &self,
        others: &[&dyn ExtensionSlot],
        axis: Axis,
    ) -> Result<Box<dyn ExtensionSlot>> {
        if self.axis != axis {
            return Ok(self.boxed_clone());
        }
        let mut values = self.values.clone();
        for other in others {
            values.extend_from_slice(&downcast_slot::<Self>(*other)?.values);
        }
        Ok(Box::new(AxisVector::new(self.axis, values)))
    }

    fn content_eq(
        &self,
        other: &dyn ExtensionSlot,
    ) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn boxed_clone(&self) -> Box<dyn ExtensionSlot> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}


// LINKED MATRICES

/// A matrix whose dimensions may each follow a container axis or stay
/// free.
///
/// The first matrix dimension is described by `rows_link`, the second by
/// `cols_link`. A per-row embedding is `Matrix(Rows, Free)`, a dense
/// row-by-row relation is `Matrix(Rows, Rows)`, and so on. Any
/// [`AssayData`] implementation can be the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkedMatrix<M> {
    rows_link: AxisLink,
    cols_link: AxisLink,
    data:      M,
}

impl<M: AssayData> LinkedMatrix<M> {
    pub fn new(
        rows_link: AxisLink,
        cols_link: AxisLink,
        data: M,
    ) -> Self {
        LinkedMatrix {
            rows_link,
            cols_link,
            data,
        }
    }

    /// One matrix row per container row; columns free.
    pub fn per_row(data: M) -> Self {
        LinkedMatrix::new(AxisLink::Rows, AxisLink::Free, data)
    }

    /// One matrix row per container column; columns free.
    pub fn per_col(data: M) -> Self {
        LinkedMatrix::new(AxisLink::Cols, AxisLink::Free, data)
    }

    /// Rows follow container rows, columns follow container columns.
    pub fn row_by_col(data: M) -> Self {
        LinkedMatrix::new(AxisLink::Rows, AxisLink::Cols, data)
    }

    /// Rows follow container columns, columns follow container rows.
    pub fn col_by_row(data: M) -> Self {
        LinkedMatrix::new(AxisLink::Cols, AxisLink::Rows, data)
    }

    /// Dense row-by-row relation; both dimensions follow the rows.
    pub fn row_pairwise(data: M) -> Self {
        LinkedMatrix::new(AxisLink::Rows, AxisLink::Rows, data)
    }

    /// Dense column-by-column relation; both dimensions follow the
    /// columns.
    pub fn col_pairwise(data: M) -> Self {
        LinkedMatrix::new(AxisLink::Cols, AxisLink::Cols, data)
    }

    pub fn data(&self) -> &M {
        &self.data
    }
}

impl<M: AssayData> ExtensionSlot for LinkedMatrix<M> {
    fn role(&self) -> SlotRole {
        SlotRole::Matrix(self.rows_link, self.cols_link)
    }

    fn validate(
        &self,
        nrows: usize,
        ncols: usize,
    ) -> Vec<String> {
        let mut violations = Vec::new();
        if let Some(expected) = self.rows_link.expected_len(nrows, ncols) {
            if self.data.nrows() != expected {
                violations.push(format!(
                    "{} has {} rows, expected {}",
                    self.role(),
                    self.data.nrows(),
                    expected
                ));
            }
        }
        if let Some(expected) = self.cols_link.expected_len(nrows, ncols) {
            if self.data.ncols() != expected {
                violations.push(format!(
                    "{} has {} columns, expected {}",
                    self.role(),
                    self.data.ncols(),
                    expected
                ));
            }
        }
        violations
    }

    fn subset(
        &self,
        rows: &[usize],
        cols: &[usize],
    ) -> Box<dyn ExtensionSlot> {
        let mut data = self.data.clone();
        if let Some(positions) = self.rows_link.positions(rows, cols) {
            data = data.take(Axis::Rows, positions);
        }
        if let Some(positions) = self.cols_link.positions(rows, cols) {
            data = data.take(Axis::Cols, positions);
        }
        Box::new(LinkedMatrix::new(self.rows_link, self.cols_link, data))
    }

    /// Writes the block addressed by the linked selections. For a dense
    /// pairwise relation only the selected square block is rewritten;
    /// entries pairing a selected position with an unselected one keep
    /// their old values.
    fn assign(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        src: &dyn ExtensionSlot,
    ) -> Result<()> {
        let src = downcast_slot::<Self>(src)?;
        let full_rows: Vec<usize>;
        let dim0 = match self.rows_link.positions(rows, cols) {
            Some(positions) => positions,
            None => {
                if src.data.nrows() != self.data.nrows() {
                    return Err(free_len_mismatch(
                        src.data.nrows(),
                        self.data.nrows(),
                    ));
                }
                full_rows = (0..self.data.nrows()).collect();
                full_rows.as_slice()
            },
        };
        let full_cols: Vec<usize>;
        let dim1 = match self.cols_link.positions(rows, cols) {
            Some(positions) => positions,
            None => {
                if src.data.ncols() != self.data.ncols() {
                    return Err(free_len_mismatch(
                        src.data.ncols(),
                        self.data.ncols(),
                    ));
                }
                full_cols = (0..self.data.ncols()).collect();
                full_cols.as_slice()
            },
        };
        self.data.set_block(dim0, dim1, &src.data);
        Ok(())
    }

    fn bind(
        &self,
        others: &[&dyn ExtensionSlot],
        axis: Axis,
    ) -> Result<Box<dyn ExtensionSlot>> {
        if self.role().fixed_under(axis) {
            return Ok(self.boxed_clone());
        }
        if self.rows_link.is(axis) && self.cols_link.is(axis) {
            return Err(AssayFrameError::IncompatibleStructure {
                reason: format!(
                    "pairwise matrix cannot be combined along the {} axis",
                    axis
                ),
            });
        }
        let concat_dim = if self.rows_link.is(axis) {
            Axis::Rows
        }
        else {
            Axis::Cols
        };
        let mut parts = vec![&self.data];
        for other in others {
            let other = downcast_slot::<Self>(*other)?;
            let (found, expected) = match concat_dim {
                Axis::Rows => (other.data.ncols(), self.data.ncols()),
                Axis::Cols => (other.data.nrows(), self.data.nrows()),
            };
            if found != expected {
                return Err(free_len_mismatch(found, expected));
            }
            parts.push(&other.data);
        }
        let data = M::concat(concat_dim, &parts)?;
        Ok(Box::new(LinkedMatrix::new(
            self.rows_link,
            self.cols_link,
            data,
        )))
    }

    fn content_eq(
        &self,
        other: &dyn ExtensionSlot,
    ) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn boxed_clone(&self) -> Box<dyn ExtensionSlot> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}


// SPARSE PAIR SETS

/// A sparse set of position pairs on one axis, each carrying a value.
///
/// Unlike a dense pairwise [`LinkedMatrix`], a pair set survives binding:
/// the endpoints of each part are offset by the lengths of the parts
/// before it, exactly like graph edges under vertical concatenation of
/// their vertex sets.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AxisPairs<T> {
    axis:     Axis,
    axis_len: usize,
    from:     Vec<usize>,
    to:       Vec<usize>,
    values:   Vec<T>,
}

impl<T> AxisPairs<T> {
    /// Creates a pair set over `axis_len` positions. `from`, `to` and
    /// `values` must have equal lengths and every endpoint must be
    /// below `axis_len`.
    pub fn new(
        axis: Axis,
        axis_len: usize,
        from: Vec<usize>,
        to: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        if to.len() != from.len() {
            return Err(AssayFrameError::LengthMismatch {
                what:     "pair endpoints".to_string(),
                found:    to.len(),
                expected: from.len(),
            });
        }
        if values.len() != from.len() {
            return Err(AssayFrameError::LengthMismatch {
                what:     "pair values".to_string(),
                found:    values.len(),
                expected: from.len(),
            });
        }
        let bad: Vec<usize> = from
            .iter()
            .chain(to.iter())
            .copied()
            .filter(|&pos| pos >= axis_len)
            .collect();
        if !bad.is_empty() {
            return Err(AssayFrameError::IndexOutOfBounds {
                axis,
                len: axis_len,
                indices: bad,
            });
        }
        Ok(AxisPairs {
            axis,
            axis_len,
            from,
            to,
            values,
        })
    }

    /// Pairs between container rows.
    pub fn rows(
        axis_len: usize,
        from: Vec<usize>,
        to: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        AxisPairs::new(Axis::Rows, axis_len, from, to, values)
    }

    /// Pairs between container columns.
    pub fn cols(
        axis_len: usize,
        from: Vec<usize>,
        to: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        AxisPairs::new(Axis::Cols, axis_len, from, to, values)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of axis positions the pair set spans.
    pub fn axis_len(&self) -> usize {
        self.axis_len
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    /// Iterates `(from, to, value)` triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.from
            .iter()
            .zip(&self.to)
            .zip(&self.values)
            .map(|((&from, &to), value)| (from, to, value))
    }
}

impl<T> ExtensionSlot for AxisPairs<T>
where
    T: Clone + Debug + PartialEq + Send + Sync + 'static,
{
    fn role(&self) -> SlotRole {
        SlotRole::Matrix(self.axis.into(), self.axis.into())
    }

    fn validate(
        &self,
        nrows: usize,
        ncols: usize,
    ) -> Vec<String> {
        let expected = match self.axis {
            Axis::Rows => nrows,
            Axis::Cols => ncols,
        };
        if self.axis_len != expected {
            vec![format!(
                "{} pair set covers {} positions, expected {}",
                self.axis, self.axis_len, expected
            )]
        }
        else {
            Vec::new()
        }
    }

    /// Pairs whose endpoints are both kept are remapped to the new
    /// positions; pairs losing an endpoint vanish. A position selected
    /// twice fans its pairs out to every combination of copies.
    fn subset(
        &self,
        rows: &[usize],
        cols: &[usize],
    ) -> Box<dyn ExtensionSlot> {
        let selection = match self.axis {
            Axis::Rows => rows,
            Axis::Cols => cols,
        };
        let mut new_positions: Vec<Vec<usize>> = vec![Vec::new(); self.axis_len];
        for (new_pos, &old_pos) in selection.iter().enumerate() {
            new_positions[old_pos].push(new_pos);
        }
        let mut from = Vec::new();
        let mut to = Vec::new();
        let mut values = Vec::new();
        for (old_from, old_to, value) in self.iter() {
            for &new_from in &new_positions[old_from] {
                for &new_to in &new_positions[old_to] {
                    from.push(new_from);
                    to.push(new_to);
                    values.push(value.clone());
                }
            }
        }
        Box::new(AxisPairs {
            axis: self.axis,
            axis_len: selection.len(),
            from,
            to,
            values,
        })
    }

    /// Drops every pair touching a replaced position, then adds the
    /// source pairs with their endpoints mapped through the selection.
    fn assign(
        &mut self,
        rows: &[usize],
        cols: &[usize],
        src: &dyn ExtensionSlot,
    ) -> Result<()> {
        let src = downcast_slot::<Self>(src)?;
        let selection = match self.axis {
            Axis::Rows => rows,
            Axis::Cols => cols,
        };
        if src.axis_len != selection.len() {
            return Err(AssayFrameError::IncompatibleStructure {
                reason: format!(
                    "pair set covers {} positions, expected {}",
                    src.axis_len,
                    selection.len()
                ),
            });
        }
        let replaced: HashSet<usize> = selection.iter().copied().collect();
        let mut from = Vec::new();
        let mut to = Vec::new();
        let mut values = Vec::new();
        for (old_from, old_to, value) in self.iter() {
            if !replaced.contains(&old_from) && !replaced.contains(&old_to) {
                from.push(old_from);
                to.push(old_to);
                values.push(value.clone());
            }
        }
        for (src_from, src_to, value) in src.iter() {
            from.push(selection[src_from]);
            to.push(selection[src_to]);
            values.push(value.clone());
        }
        self.from = from;
        self.to = to;
        self.values = values;
        Ok(())
    }

    fn bind(
        &self,
        others: &[&dyn ExtensionSlot],
        axis: Axis,
    ) -> Result<Box<dyn ExtensionSlot>> {
        if self.axis != axis {
            return Ok(self.boxed_clone());
        }
        let mut axis_len = self.axis_len;
        let mut from = self.from.clone();
        let mut to = self.to.clone();
        let mut values = self.values.clone();
        for other in others {
            let other = downcast_slot::<Self>(*other)?;
            from.extend(other.from.iter().map(|&pos| pos + axis_len));
            to.extend(other.to.iter().map(|&pos| pos + axis_len));
            values.extend(other.values.iter().cloned());
            axis_len += other.axis_len;
        }
        Ok(Box::new(AxisPairs {
            axis: self.axis,
            axis_len,
            from,
            to,
            values,
        }))
    }

    fn content_eq(
        &self,
        other: &dyn ExtensionSlot,
    ) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn boxed_clone(&self) -> Box<dyn ExtensionSlot> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn free_len_mismatch(
    found: usize,
    expected: usize,
) -> AssayFrameError {
    AssayFrameError::IncompatibleStructure {
        reason: format!(
            "free-axis lengths are not compatible ({} vs {})",
            found, expected
        ),
    }
}
