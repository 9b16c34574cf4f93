use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;

use super::base::{
    incompatible,
    named_slot_err,
    AssayFrame,
};
use crate::data_structs::assay::AssayData;
use crate::data_structs::extension::ExtensionSlot;
use crate::data_structs::Axis;
use crate::error::{
    AssayFrameError,
    Result,
};
use crate::utils::duplicated_names;

/// Which equality checks a bind performs on the structures it does not
/// concatenate.
///
/// Structural compatibility (matching shapes, assay names, metadata
/// layouts, axis names and slot roles) is always required. Content
/// equality of the fixed-axis metadata and of fixed slots is on by
/// default and can be switched off when the caller knows the inputs
/// describe the same fixed axis, for example when binding chunks that
/// were split off one container.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BindChecks {
    fixed_content: bool,
}

impl Default for BindChecks {
    fn default() -> Self {
        Self::all()
    }
}

impl BindChecks {
    /// Every check enabled.
    pub fn all() -> Self {
        BindChecks {
            fixed_content: true,
        }
    }

    /// Sets whether fixed-axis metadata and fixed slots must be
    /// content-equal across the inputs.
    pub fn with_fixed_content(
        mut self,
        fixed_content: bool,
    ) -> Self {
        self.fixed_content = fixed_content;
        self
    }
}

impl<M: AssayData> AssayFrame<M> {
    // BINDING
    /// Stacks `others` below this container, concatenating the rows of
    /// every row-linked structure.
    ///
    /// All inputs must have the same column count, the same assay names
    /// in the same order, the same metadata layouts, equal column names
    /// and the same slots with the same roles; with the default
    /// [`BindChecks`] the per-column metadata and every fixed slot must
    /// also be content-equal. Row names are concatenated when every
    /// input is named and dropped otherwise. Metadata bags are merged
    /// with earlier containers winning on key conflicts.
    pub fn bind_rows(
        &self,
        others: &[&Self],
    ) -> Result<Self> {
        self.bind_axis(others, Axis::Rows, BindChecks::default())
    }

    /// [`bind_rows`] with explicit [`BindChecks`].
    ///
    /// [`bind_rows`]: AssayFrame::bind_rows
    pub fn bind_rows_with(
        &self,
        others: &[&Self],
        checks: BindChecks,
    ) -> Result<Self> {
        self.bind_axis(others, Axis::Rows, checks)
    }

    /// Stacks `others` to the right of this container; the column-wise
    /// mirror of [`bind_rows`].
    ///
    /// [`bind_rows`]: AssayFrame::bind_rows
    pub fn bind_cols(
        &self,
        others: &[&Self],
    ) -> Result<Self> {
        self.bind_axis(others, Axis::Cols, BindChecks::default())
    }

    /// [`bind_cols`] with explicit [`BindChecks`].
    ///
    /// [`bind_cols`]: AssayFrame::bind_cols
    pub fn bind_cols_with(
        &self,
        others: &[&Self],
        checks: BindChecks,
    ) -> Result<Self> {
        self.bind_axis(others, Axis::Cols, checks)
    }

    fn bind_axis(
        &self,
        others: &[&Self],
        axis: Axis,
        checks: BindChecks,
    ) -> Result<Self> {
        if others.is_empty() {
            return Ok(self.clone());
        }
        debug!(
            "Combining {} containers along the {} axis",
            others.len() + 1,
            axis
        );
        self.check_bind_compatible(others, axis, checks)?;

        let mut frames: Vec<&Self> = Vec::with_capacity(others.len() + 1);
        frames.push(self);
        frames.extend_from_slice(others);

        let bound_len: usize =
            frames.iter().map(|frame| frame.axis_len(axis)).sum();
        let (nrows, ncols) = match axis {
            Axis::Rows => (bound_len, self.ncols),
            Axis::Cols => (self.nrows, bound_len),
        };

        let mut assays = IndexMap::with_capacity(self.assays.len());
        for name in self.assays.keys() {
            let parts: Vec<&M> =
                frames.iter().map(|frame| &frame.assays[name]).collect();
            assays.insert(name.clone(), M::concat(axis, &parts)?);
        }

        let mut bound_meta = self.meta_of(axis).clone();
        for other in others {
            bound_meta = bound_meta.vstack(other.meta_of(axis))?;
        }

        let all_named =
            frames.iter().all(|frame| frame.names_of(axis).is_some());
        let bound_names = if all_named {
            let mut names = Vec::with_capacity(bound_len);
            for frame in &frames {
                names.extend(
                    frame.names_of(axis).into_iter().flatten().cloned(),
                );
            }
            let duplicated =
                duplicated_names(names.iter().map(String::as_str));
            if !duplicated.is_empty() {
                return Err(AssayFrameError::DuplicateNames {
                    axis,
                    names: duplicated,
                });
            }
            Some(names)
        }
        else {
            None
        };

        let mut slots = IndexMap::with_capacity(self.slots.len());
        for (name, slot) in &self.slots {
            let other_slots: Vec<&dyn ExtensionSlot> = others
                .iter()
                .map(|frame| frame.slots[name].as_ref())
                .collect();
            let bound = slot
                .bind(&other_slots, axis)
                .map_err(|e| named_slot_err(name, e))?;
            slots.insert(name.clone(), bound);
        }

        let mut metadata = self.metadata.clone();
        for other in others {
            for (key, value) in &other.metadata {
                metadata
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        let fixed = axis.other();
        let (row_meta, col_meta, row_names, col_names) = match axis {
            Axis::Rows => {
                (
                    bound_meta,
                    self.meta_of(fixed).clone(),
                    bound_names,
                    self.col_names.clone(),
                )
            },
            Axis::Cols => {
                (
                    self.meta_of(fixed).clone(),
                    bound_meta,
                    self.row_names.clone(),
                    bound_names,
                )
            },
        };
        let out = AssayFrame {
            nrows,
            ncols,
            assays,
            row_meta,
            col_meta,
            row_names,
            col_names,
            slots,
            metadata,
        };
        out.validate()?;
        Ok(out)
    }

    fn check_bind_compatible(
        &self,
        others: &[&Self],
        axis: Axis,
        checks: BindChecks,
    ) -> Result<()> {
        let fixed = axis.other();
        if !std::iter::once(self.axis_len(fixed))
            .chain(others.iter().map(|frame| frame.axis_len(fixed)))
            .all_equal()
        {
            return Err(incompatible(&format!(
                "{} counts are not compatible",
                fixed
            )));
        }
        for other in others {
            if !self.assays.keys().eq(other.assays.keys()) {
                return Err(incompatible("assay names are not compatible"));
            }
            if !self.meta_of(axis).same_layout(other.meta_of(axis)) {
                return Err(incompatible(&format!(
                    "per-{} metadata columns are not compatible",
                    axis
                )));
            }
            if !self.meta_of(fixed).same_layout(other.meta_of(fixed)) {
                return Err(incompatible(&format!(
                    "per-{} metadata columns are not compatible",
                    fixed
                )));
            }
            if self.names_of(fixed) != other.names_of(fixed) {
                return Err(incompatible(&format!(
                    "{} names are not compatible",
                    fixed
                )));
            }
            if !self.slots.keys().eq(other.slots.keys()) {
                return Err(incompatible("slot names are not compatible"));
            }
            for (name, slot) in &self.slots {
                if slot.role() != other.slots[name].role() {
                    return Err(AssayFrameError::IncompatibleStructure {
                        reason: format!(
                            "slot '{}': roles are not compatible",
                            name
                        ),
                    });
                }
            }
        }
        if checks.fixed_content {
            for other in others {
                if !self.meta_of(fixed).content_eq(other.meta_of(fixed)) {
                    return Err(incompatible(&format!(
                        "per-{} values are not compatible",
                        fixed
                    )));
                }
                for (name, slot) in &self.slots {
                    if slot.role().fixed_under(axis)
                        && !slot.content_eq(other.slots[name].as_ref())
                    {
                        return Err(incompatible(&format!(
                            "slot '{}' values are not compatible",
                            name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
