use indexmap::IndexMap;
use log::debug;

use super::base::{
    incompatible,
    named_slot_err,
    AssayFrame,
};
use crate::data_structs::assay::AssayData;
use crate::data_structs::selector::{
    resolve_selector,
    Selector,
};
use crate::data_structs::Axis;
use crate::error::{
    AssayFrameError,
    Result,
};
use crate::utils::{
    duplicated_names,
    take_clone,
};

impl<M: AssayData> AssayFrame<M> {
    // SUBSETTING
    /// Returns the container restricted to the selected rows and
    /// columns.
    ///
    /// Both selectors are resolved first and the resulting positions are
    /// applied to every assay, both metadata tables, the names and every
    /// extension slot, so all structures stay aligned. Positions may
    /// repeat and may be out of order, except that repeating a position
    /// on a named axis would duplicate its name and is refused. The
    /// metadata bag is carried over unchanged.
    pub fn subset(
        &self,
        rows: impl Into<Selector>,
        cols: impl Into<Selector>,
    ) -> Result<Self> {
        let rows = resolve_selector(
            &rows.into(),
            Axis::Rows,
            self.nrows,
            self.names_of(Axis::Rows),
        )?;
        let cols = resolve_selector(
            &cols.into(),
            Axis::Cols,
            self.ncols,
            self.names_of(Axis::Cols),
        )?;
        self.take_positions(&rows, &cols)
    }

    /// Subsets the rows, keeping every column.
    pub fn subset_rows(
        &self,
        rows: impl Into<Selector>,
    ) -> Result<Self> {
        self.subset(rows, ..)
    }

    /// Subsets the columns, keeping every row.
    pub fn subset_cols(
        &self,
        cols: impl Into<Selector>,
    ) -> Result<Self> {
        self.subset(.., cols)
    }

    pub(super) fn take_positions(
        &self,
        rows: &[usize],
        cols: &[usize],
    ) -> Result<Self> {
        debug!(
            "Gathering a {} x {} selection from a {} x {} container",
            rows.len(),
            cols.len(),
            self.nrows,
            self.ncols
        );
        for (axis, positions) in [(Axis::Rows, rows), (Axis::Cols, cols)] {
            let Some(names) = self.names_of(axis)
            else {
                continue;
            };
            let gathered = take_clone(names, positions);
            let duplicated =
                duplicated_names(gathered.iter().map(String::as_str));
            if !duplicated.is_empty() {
                return Err(AssayFrameError::DuplicateNames {
                    axis,
                    names: duplicated,
                });
            }
        }
        let mut assays = IndexMap::with_capacity(self.assays.len());
        for (name, data) in &self.assays {
            assays.insert(
                name.clone(),
                data.take(Axis::Rows, rows).take(Axis::Cols, cols),
            );
        }
        let mut slots = IndexMap::with_capacity(self.slots.len());
        for (name, slot) in &self.slots {
            slots.insert(name.clone(), slot.subset(rows, cols));
        }
        let out = AssayFrame {
            nrows: rows.len(),
            ncols: cols.len(),
            assays,
            row_meta: self.row_meta.take(rows)?,
            col_meta: self.col_meta.take(cols)?,
            row_names: self.row_names.as_ref().map(|names| {
                take_clone(names, rows)
            }),
            col_names: self.col_names.as_ref().map(|names| {
                take_clone(names, cols)
            }),
            slots,
            metadata: self.metadata.clone(),
        };
        debug_assert!(out.validate().is_ok());
        Ok(out)
    }

    // ASSIGNMENT
    /// Replaces the selected region with the matching region of `src`.
    ///
    /// `src` must be structurally compatible: same assay names in the
    /// same order, same metadata layouts and same slots with the same
    /// roles. Its shape must be exactly `rows` by `cols`; nothing is
    /// recycled. Axis names are rewritten only where both containers
    /// carry them, and the result must keep them unique. The metadata
    /// bag of `self` is kept.
    ///
    /// The container is only modified when the whole assignment
    /// succeeds; on error it is left untouched.
    pub fn assign_subset(
        &mut self,
        rows: impl Into<Selector>,
        cols: impl Into<Selector>,
        src: &Self,
    ) -> Result<()> {
        let rows = resolve_selector(
            &rows.into(),
            Axis::Rows,
            self.nrows,
            self.names_of(Axis::Rows),
        )?;
        let cols = resolve_selector(
            &cols.into(),
            Axis::Cols,
            self.ncols,
            self.names_of(Axis::Cols),
        )?;
        self.check_assign_compatible(src)?;
        if (src.nrows == 0 || src.ncols == 0)
            && !rows.is_empty()
            && !cols.is_empty()
        {
            return Err(AssayFrameError::LengthMismatch {
                what:     "replacement".to_string(),
                found:    0,
                expected: rows.len() * cols.len(),
            });
        }
        if src.nrows != rows.len() {
            return Err(AssayFrameError::LengthMismatch {
                what:     "replacement rows".to_string(),
                found:    src.nrows,
                expected: rows.len(),
            });
        }
        if src.ncols != cols.len() {
            return Err(AssayFrameError::LengthMismatch {
                what:     "replacement columns".to_string(),
                found:    src.ncols,
                expected: cols.len(),
            });
        }

        let mut out = self.clone();
        for index in 0..out.assays.len() {
            out.assays[index].set_block(&rows, &cols, &src.assays[index]);
        }
        out.row_meta = out.row_meta.assign_rows(&rows, &src.row_meta)?;
        out.col_meta = out.col_meta.assign_rows(&cols, &src.col_meta)?;
        if let (Some(target), Some(source)) =
            (out.row_names.as_mut(), src.row_names.as_ref())
        {
            assign_names(target, &rows, source, Axis::Rows)?;
        }
        if let (Some(target), Some(source)) =
            (out.col_names.as_mut(), src.col_names.as_ref())
        {
            assign_names(target, &cols, source, Axis::Cols)?;
        }
        for (name, slot) in out.slots.iter_mut() {
            slot.assign(&rows, &cols, src.slots[name].as_ref())
                .map_err(|e| named_slot_err(name, e))?;
        }
        debug_assert!(out.validate().is_ok());
        *self = out;
        Ok(())
    }

    fn check_assign_compatible(
        &self,
        src: &Self,
    ) -> Result<()> {
        if !self.assays.keys().eq(src.assays.keys()) {
            return Err(incompatible("assay names are not compatible"));
        }
        if !self.row_meta.same_layout(&src.row_meta) {
            return Err(incompatible(
                "per-row metadata columns are not compatible",
            ));
        }
        if !self.col_meta.same_layout(&src.col_meta) {
            return Err(incompatible(
                "per-column metadata columns are not compatible",
            ));
        }
        if !self.slots.keys().eq(src.slots.keys()) {
            return Err(incompatible("slot names are not compatible"));
        }
        for (name, slot) in &self.slots {
            if slot.role() != src.slots[name].role() {
                return Err(AssayFrameError::IncompatibleStructure {
                    reason: format!(
                        "slot '{}': roles are not compatible",
                        name
                    ),
                });
            }
        }
        Ok(())
    }
}

fn assign_names(
    target: &mut [String],
    positions: &[usize],
    source: &[String],
    axis: Axis,
) -> Result<()> {
    for (offset, &pos) in positions.iter().enumerate() {
        target[pos] = source[offset].clone();
    }
    let duplicated = duplicated_names(target.iter().map(|name| name.as_str()));
    if !duplicated.is_empty() {
        return Err(AssayFrameError::DuplicateNames {
            axis,
            names: duplicated,
        });
    }
    Ok(())
}
