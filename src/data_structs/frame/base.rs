use std::fmt::Display;

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::Array2;
use serde_json::Value;

use super::AssayFrameBuilder;
use crate::data_structs::assay::AssayData;
use crate::data_structs::extension::{
    downcast_slot,
    ExtensionSlot,
};
use crate::data_structs::meta::MetaFrame;
use crate::data_structs::Axis;
use crate::error::{
    AssayFrameError,
    Result,
};
use crate::utils::duplicated_names;

/// A rectangular experiment: named assay matrices of one shape plus the
/// annotation structures that stay synchronized with them.
///
/// Every assay is `nrows` by `ncols`. Row and column metadata tables
/// describe the axes, optional unique names label them, extension slots
/// carry linked structures, and a free-form metadata bag travels with
/// the container. All operations keep these aligned: a subset, an
/// assignment or a bind applies one resolved selection to every
/// structure at once, and every container handed out satisfies
/// [`validate`].
///
/// [`validate`]: AssayFrame::validate
#[derive(Clone, Debug)]
pub struct AssayFrame<M: AssayData = Array2<f64>> {
    pub(super) nrows:     usize,
    pub(super) ncols:     usize,
    pub(super) assays:    IndexMap<String, M>,
    pub(super) row_meta:  MetaFrame,
    pub(super) col_meta:  MetaFrame,
    pub(super) row_names: Option<Vec<String>>,
    pub(super) col_names: Option<Vec<String>>,
    pub(super) slots:     IndexMap<String, Box<dyn ExtensionSlot>>,
    pub(super) metadata:  IndexMap<String, Value>,
}

/// Addresses an assay by name or by position in insertion order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssayKey {
    Name(String),
    Index(usize),
}

impl From<&str> for AssayKey {
    fn from(value: &str) -> Self {
        AssayKey::Name(value.to_string())
    }
}

impl From<String> for AssayKey {
    fn from(value: String) -> Self {
        AssayKey::Name(value)
    }
}

impl From<usize> for AssayKey {
    fn from(value: usize) -> Self {
        AssayKey::Index(value)
    }
}

/// Borrowed view of one assay together with the axis names.
#[derive(Debug)]
pub struct AssayView<'a, M> {
    name:      &'a str,
    data:      &'a M,
    row_names: Option<&'a [String]>,
    col_names: Option<&'a [String]>,
}

impl<'a, M> AssayView<'a, M> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn data(&self) -> &'a M {
        self.data
    }

    pub fn row_names(&self) -> Option<&'a [String]> {
        self.row_names
    }

    pub fn col_names(&self) -> Option<&'a [String]> {
        self.col_names
    }
}

// Holds only references, so copying never depends on `M: Copy`.
impl<'a, M> Clone for AssayView<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M> Copy for AssayView<'a, M> {}

impl<M: AssayData> AssayFrame<M> {
    // CONSTRUCTORS
    pub fn builder() -> AssayFrameBuilder<M> {
        AssayFrameBuilder::all_checks()
    }

    /// Builds a container around a single assay, with empty metadata
    /// tables and no names.
    pub fn from_assay(
        name: impl Into<String>,
        data: M,
    ) -> Result<Self> {
        AssayFrameBuilder::all_checks()
            .with_assay(name, data)
            .build()
    }

    // DIMENSIONS
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn axis_len(
        &self,
        axis: Axis,
    ) -> usize {
        match axis {
            Axis::Rows => self.nrows,
            Axis::Cols => self.ncols,
        }
    }

    // ASSAYS
    pub fn n_assays(&self) -> usize {
        self.assays.len()
    }

    pub fn assay_names(&self) -> Vec<&str> {
        self.assays.keys().map(String::as_str).collect()
    }

    /// Iterates `(name, matrix)` pairs in insertion order.
    pub fn assays(&self) -> impl Iterator<Item = (&str, &M)> {
        self.assays.iter().map(|(name, data)| (name.as_str(), data))
    }

    pub fn assay(
        &self,
        key: impl Into<AssayKey>,
    ) -> Result<&M> {
        let index = self.resolve_assay(&key.into())?;
        Ok(&self.assays[index])
    }

    /// Like [`assay`], but pairs the matrix with the axis names so
    /// labelled rows and columns can be read off together.
    ///
    /// [`assay`]: AssayFrame::assay
    pub fn assay_view(
        &self,
        key: impl Into<AssayKey>,
    ) -> Result<AssayView<'_, M>> {
        let index = self.resolve_assay(&key.into())?;
        let (name, data) = match self.assays.get_index(index) {
            Some(entry) => entry,
            None => unreachable!("resolved assay index is always present"),
        };
        Ok(AssayView {
            name,
            data,
            row_names: self.row_names.as_deref(),
            col_names: self.col_names.as_deref(),
        })
    }

    /// Inserts or replaces an assay. A name key appends when absent; an
    /// index key must address an existing assay.
    pub fn set_assay(
        &mut self,
        key: impl Into<AssayKey>,
        data: M,
    ) -> Result<()> {
        let key = key.into();
        if data.shape() != (self.nrows, self.ncols) {
            let what = match &key {
                AssayKey::Name(name) => format!("assay '{}'", name),
                AssayKey::Index(index) => format!("assay #{}", index),
            };
            return Err(AssayFrameError::ShapeMismatch {
                what,
                found: data.shape(),
                expected: (self.nrows, self.ncols),
            });
        }
        match key {
            AssayKey::Name(name) => {
                self.assays.insert(name, data);
            },
            AssayKey::Index(index) => {
                let index = self.resolve_assay(&AssayKey::Index(index))?;
                self.assays[index] = data;
            },
        }
        Ok(())
    }

    /// Removes an assay and returns it. The container shape is kept
    /// even when the last assay goes.
    pub fn remove_assay(
        &mut self,
        key: impl Into<AssayKey>,
    ) -> Result<M> {
        let index = self.resolve_assay(&key.into())?;
        match self.assays.shift_remove_index(index) {
            Some((_, data)) => Ok(data),
            None => unreachable!("resolved assay index is always present"),
        }
    }

    fn resolve_assay(
        &self,
        key: &AssayKey,
    ) -> Result<usize> {
        match key {
            AssayKey::Name(name) => {
                self.assays.get_index_of(name.as_str()).ok_or_else(|| {
                    AssayFrameError::NotFound {
                        what: format!("assay '{}'", name),
                    }
                })
            },
            AssayKey::Index(index) => {
                if *index < self.assays.len() {
                    Ok(*index)
                }
                else {
                    Err(AssayFrameError::NotFound {
                        what: format!("assay #{}", index),
                    })
                }
            },
        }
    }

    // METADATA TABLES
    pub fn row_meta(&self) -> &MetaFrame {
        &self.row_meta
    }

    pub fn col_meta(&self) -> &MetaFrame {
        &self.col_meta
    }

    /// Replaces the row metadata table. A table without columns fits
    /// any height; otherwise the height must equal `nrows`.
    pub fn set_row_meta(
        &mut self,
        meta: impl Into<MetaFrame>,
    ) -> Result<()> {
        self.row_meta = checked_meta(meta.into(), Axis::Rows, self.nrows)?;
        Ok(())
    }

    /// Replaces the column metadata table; see [`set_row_meta`].
    ///
    /// [`set_row_meta`]: AssayFrame::set_row_meta
    pub fn set_col_meta(
        &mut self,
        meta: impl Into<MetaFrame>,
    ) -> Result<()> {
        self.col_meta = checked_meta(meta.into(), Axis::Cols, self.ncols)?;
        Ok(())
    }

    // NAMES
    pub fn row_names(&self) -> Option<&[String]> {
        self.row_names.as_deref()
    }

    pub fn col_names(&self) -> Option<&[String]> {
        self.col_names.as_deref()
    }

    /// Sets the row names; one unique name per row.
    pub fn set_row_names<I, S>(
        &mut self,
        names: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        let names = names.into_iter().map(Into::into).collect_vec();
        self.row_names = Some(checked_names(names, Axis::Rows, self.nrows)?);
        Ok(())
    }

    /// Sets the column names; one unique name per column.
    pub fn set_col_names<I, S>(
        &mut self,
        names: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        let names = names.into_iter().map(Into::into).collect_vec();
        self.col_names = Some(checked_names(names, Axis::Cols, self.ncols)?);
        Ok(())
    }

    pub fn clear_row_names(&mut self) {
        self.row_names = None;
    }

    pub fn clear_col_names(&mut self) {
        self.col_names = None;
    }

    pub(super) fn names_of(
        &self,
        axis: Axis,
    ) -> Option<&[String]> {
        match axis {
            Axis::Rows => self.row_names.as_deref(),
            Axis::Cols => self.col_names.as_deref(),
        }
    }

    pub(super) fn meta_of(
        &self,
        axis: Axis,
    ) -> &MetaFrame {
        match axis {
            Axis::Rows => &self.row_meta,
            Axis::Cols => &self.col_meta,
        }
    }

    // EXTENSION SLOTS
    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_names(&self) -> Vec<&str> {
        self.slots.keys().map(String::as_str).collect()
    }

    pub fn slot(
        &self,
        name: &str,
    ) -> Result<&dyn ExtensionSlot> {
        match self.slots.get(name) {
            Some(slot) => Ok(slot.as_ref()),
            None => {
                Err(AssayFrameError::NotFound {
                    what: format!("slot '{}'", name),
                })
            },
        }
    }

    /// Borrows a slot as its concrete payload type.
    pub fn slot_downcast<S>(
        &self,
        name: &str,
    ) -> Result<&S>
    where
        S: ExtensionSlot + 'static, {
        downcast_slot(self.slot(name)?)
    }

    /// Inserts or replaces an extension slot after checking its shape
    /// against the container.
    pub fn set_slot(
        &mut self,
        name: impl Into<String>,
        slot: impl ExtensionSlot + 'static,
    ) -> Result<()> {
        self.set_boxed_slot(name, Box::new(slot))
    }

    pub fn set_boxed_slot(
        &mut self,
        name: impl Into<String>,
        slot: Box<dyn ExtensionSlot>,
    ) -> Result<()> {
        let name = name.into();
        let violations = slot
            .validate(self.nrows, self.ncols)
            .into_iter()
            .map(|violation| format!("slot '{}': {}", name, violation))
            .collect_vec();
        if !violations.is_empty() {
            return Err(AssayFrameError::InvalidState { violations });
        }
        self.slots.insert(name, slot);
        Ok(())
    }

    pub fn remove_slot(
        &mut self,
        name: &str,
    ) -> Result<Box<dyn ExtensionSlot>> {
        self.slots.shift_remove(name).ok_or_else(|| {
            AssayFrameError::NotFound {
                what: format!("slot '{}'", name),
            }
        })
    }

    // METADATA BAG
    pub fn metadata(&self) -> &IndexMap<String, Value> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.metadata
    }

    // VALIDATION
    /// Checks every structural invariant at once. The error lists all
    /// violations, not just the first.
    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        }
        else {
            Err(AssayFrameError::InvalidState { violations })
        }
    }

    pub(super) fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let expected = (self.nrows, self.ncols);
        for (name, data) in &self.assays {
            if data.shape() != expected {
                violations.push(format!(
                    "assay '{}' has shape {:?}, expected {:?}",
                    name,
                    data.shape(),
                    expected
                ));
            }
        }
        if self.row_meta.height() != self.nrows {
            violations.push(format!(
                "row metadata has length {}, expected {}",
                self.row_meta.height(),
                self.nrows
            ));
        }
        if self.col_meta.height() != self.ncols {
            violations.push(format!(
                "column metadata has length {}, expected {}",
                self.col_meta.height(),
                self.ncols
            ));
        }
        for (axis, names, expected) in [
            (Axis::Rows, &self.row_names, self.nrows),
            (Axis::Cols, &self.col_names, self.ncols),
        ] {
            let Some(names) = names
            else {
                continue;
            };
            if names.len() != expected {
                violations.push(format!(
                    "{} names has length {}, expected {}",
                    axis,
                    names.len(),
                    expected
                ));
            }
            let duplicated = duplicated_names(names.iter().map(String::as_str));
            if !duplicated.is_empty() {
                violations.push(format!(
                    "duplicate {} names: {}",
                    axis,
                    duplicated.iter().join(", ")
                ));
            }
        }
        for (name, slot) in &self.slots {
            for violation in slot.validate(self.nrows, self.ncols) {
                violations.push(format!("slot '{}': {}", name, violation));
            }
        }
        violations
    }
}

impl<M: AssayData> PartialEq for AssayFrame<M> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.assays.iter().eq(other.assays.iter())
            && self.row_meta == other.row_meta
            && self.col_meta == other.col_meta
            && self.row_names == other.row_names
            && self.col_names == other.col_names
            && self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(other.slots.iter())
                .all(|((left_name, left), (right_name, right))| {
                    left_name == right_name && left.content_eq(right.as_ref())
                })
            && self.metadata == other.metadata
    }
}

impl<M: AssayData> Display for AssayFrame<M> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "AssayFrame of {} x {}", self.nrows, self.ncols)?;
        writeln!(
            f,
            "assays({}): {}",
            self.assays.len(),
            self.assays.keys().join(", ")
        )?;
        writeln!(
            f,
            "row metadata({}): {}",
            self.row_meta.width(),
            self.row_meta.data().get_column_names_str().iter().join(", ")
        )?;
        writeln!(
            f,
            "column metadata({}): {}",
            self.col_meta.width(),
            self.col_meta.data().get_column_names_str().iter().join(", ")
        )?;
        writeln!(f, "row names: {}", preview_names(&self.row_names))?;
        writeln!(f, "column names: {}", preview_names(&self.col_names))?;
        writeln!(
            f,
            "slots({}): {}",
            self.slots.len(),
            self.slots
                .iter()
                .map(|(name, slot)| format!("{} ({})", name, slot.role()))
                .join(", ")
        )?;
        write!(
            f,
            "metadata({}): {}",
            self.metadata.len(),
            self.metadata.keys().join(", ")
        )
    }
}

fn checked_meta(
    meta: MetaFrame,
    axis: Axis,
    expected: usize,
) -> Result<MetaFrame> {
    if meta.width() == 0 {
        return Ok(MetaFrame::empty(expected));
    }
    if meta.height() != expected {
        return Err(AssayFrameError::ShapeMismatch {
            what: format!("{} metadata", axis),
            found: (meta.height(), meta.width()),
            expected: (expected, meta.width()),
        });
    }
    Ok(meta)
}

fn checked_names(
    names: Vec<String>,
    axis: Axis,
    expected: usize,
) -> Result<Vec<String>> {
    if names.len() != expected {
        return Err(AssayFrameError::LengthMismatch {
            what: format!("{} names", axis),
            found: names.len(),
            expected,
        });
    }
    let duplicated = duplicated_names(names.iter().map(String::as_str));
    if !duplicated.is_empty() {
        return Err(AssayFrameError::DuplicateNames {
            axis,
            names: duplicated,
        });
    }
    Ok(names)
}

pub(super) fn incompatible(reason: &str) -> AssayFrameError {
    AssayFrameError::IncompatibleStructure {
        reason: reason.to_string(),
    }
}

pub(super) fn named_slot_err(
    name: &str,
    e: AssayFrameError,
) -> AssayFrameError {
    match e {
        AssayFrameError::IncompatibleStructure { reason } => {
            AssayFrameError::IncompatibleStructure {
                reason: format!("slot '{}': {}", name, reason),
            }
        },
        other => other,
    }
}

fn preview_names(names: &Option<Vec<String>>) -> String {
    match names {
        None => "unset".to_string(),
        Some(names) if names.len() <= 4 => names.iter().join(", "),
        Some(names) => {
            format!(
                "{}, {}, ..., {}",
                names[0],
                names[1],
                names[names.len() - 1]
            )
        },
    }
}
