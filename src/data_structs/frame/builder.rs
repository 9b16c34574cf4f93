use indexmap::IndexMap;
use itertools::Itertools;
use log::{
    debug,
    warn,
};
use ndarray::Array2;
use serde_json::Value;

use super::base::AssayFrame;
use crate::data_structs::assay::AssayData;
use crate::data_structs::extension::ExtensionSlot;
use crate::data_structs::meta::MetaFrame;
use crate::error::{
    AssayFrameError,
    Result,
};

/// Builder for assembling and validating an [`AssayFrame`].
///
/// Dimensions are inferred from the first assay, the metadata tables or
/// the names when not given explicitly; a container without assays
/// needs [`with_dims`]. [`build`] runs the full validation pass and
/// reports every violation at once.
///
/// [`with_dims`]: AssayFrameBuilder::with_dims
/// [`build`]: AssayFrameBuilder::build
#[derive(Clone, Debug)]
pub struct AssayFrameBuilder<M: AssayData = Array2<f64>> {
    nrows:            Option<usize>,
    ncols:            Option<usize>,
    assays:           IndexMap<String, M>,
    duplicate_assays: Vec<String>,
    row_meta:         Option<MetaFrame>,
    col_meta:         Option<MetaFrame>,
    row_names:        Option<Vec<String>>,
    col_names:        Option<Vec<String>>,
    slots:            IndexMap<String, Box<dyn ExtensionSlot>>,
    metadata:         IndexMap<String, Value>,
    check_valid:      bool,
}

impl<M: AssayData> Default for AssayFrameBuilder<M> {
    fn default() -> Self {
        Self::all_checks()
    }
}

impl<M: AssayData> AssayFrameBuilder<M> {
    /// Creates a builder that validates the assembled container.
    pub fn all_checks() -> Self {
        Self {
            nrows:            None,
            ncols:            None,
            assays:           IndexMap::new(),
            duplicate_assays: Vec::new(),
            row_meta:         None,
            col_meta:         None,
            row_names:        None,
            col_names:        None,
            slots:            IndexMap::new(),
            metadata:         IndexMap::new(),
            check_valid:      true,
        }
    }

    /// Creates a builder that skips validation; the caller guarantees
    /// the parts already fit together.
    pub fn no_checks() -> Self {
        Self {
            check_valid: false,
            ..Self::all_checks()
        }
    }

    /// Sets the container shape explicitly.
    pub fn with_dims(
        mut self,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        self.nrows = Some(nrows);
        self.ncols = Some(ncols);
        self
    }

    /// Adds a named assay. Duplicate names fail the build.
    pub fn with_assay(
        mut self,
        name: impl Into<String>,
        data: M,
    ) -> Self {
        let name = name.into();
        if self.assays.insert(name.clone(), data).is_some() {
            warn!("assay '{}' given more than once", name);
            if !self.duplicate_assays.contains(&name) {
                self.duplicate_assays.push(name);
            }
        }
        self
    }

    /// Sets the row metadata table.
    pub fn with_row_meta(
        mut self,
        meta: impl Into<MetaFrame>,
    ) -> Self {
        self.row_meta = Some(meta.into());
        self
    }

    /// Sets the column metadata table.
    pub fn with_col_meta(
        mut self,
        meta: impl Into<MetaFrame>,
    ) -> Self {
        self.col_meta = Some(meta.into());
        self
    }

    /// Sets the row names; one unique name per row.
    pub fn with_row_names<I, S>(
        mut self,
        names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        self.row_names = Some(names.into_iter().map(Into::into).collect_vec());
        self
    }

    /// Sets the column names; one unique name per column.
    pub fn with_col_names<I, S>(
        mut self,
        names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        self.col_names = Some(names.into_iter().map(Into::into).collect_vec());
        self
    }

    /// Adds an extension slot.
    pub fn with_slot(
        self,
        name: impl Into<String>,
        slot: impl ExtensionSlot + 'static,
    ) -> Self {
        self.with_boxed_slot(name, Box::new(slot))
    }

    /// Adds an already boxed extension slot.
    pub fn with_boxed_slot(
        mut self,
        name: impl Into<String>,
        slot: Box<dyn ExtensionSlot>,
    ) -> Self {
        let name = name.into();
        if self.slots.insert(name.clone(), slot).is_some() {
            warn!("slot '{}' specified twice, keeping the last value", name);
        }
        self
    }

    /// Adds one metadata entry.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole metadata bag.
    pub fn with_metadata_bag(
        mut self,
        metadata: IndexMap<String, Value>,
    ) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets whether [`build`] validates the assembled container.
    ///
    /// [`build`]: AssayFrameBuilder::build
    pub fn with_check_valid(
        mut self,
        check_valid: bool,
    ) -> Self {
        self.check_valid = check_valid;
        self
    }

    /// Assembles the container.
    ///
    /// Missing dimensions are inferred from, in order: the first assay,
    /// the metadata tables, the names. A builder with none of those
    /// produces a `0 x 0` container. Metadata tables without columns
    /// are stretched to the container height. An assay name given more
    /// than once is reported together with the other violations.
    pub fn build(self) -> Result<AssayFrame<M>> {
        let nrows = self
            .nrows
            .or_else(|| self.assays.values().next().map(|data| data.nrows()))
            .or_else(|| self.row_meta.as_ref().map(|meta| meta.height()))
            .or_else(|| self.row_names.as_ref().map(|names| names.len()))
            .unwrap_or(0);
        let ncols = self
            .ncols
            .or_else(|| self.assays.values().next().map(|data| data.ncols()))
            .or_else(|| self.col_meta.as_ref().map(|meta| meta.height()))
            .or_else(|| self.col_names.as_ref().map(|names| names.len()))
            .unwrap_or(0);
        debug!(
            "Assembling a {} x {} container with {} assays",
            nrows,
            ncols,
            self.assays.len()
        );
        let row_meta = match self.row_meta {
            Some(meta) if meta.width() > 0 => meta,
            _ => MetaFrame::empty(nrows),
        };
        let col_meta = match self.col_meta {
            Some(meta) if meta.width() > 0 => meta,
            _ => MetaFrame::empty(ncols),
        };
        let frame = AssayFrame {
            nrows,
            ncols,
            assays: self.assays,
            row_meta,
            col_meta,
            row_names: self.row_names,
            col_names: self.col_names,
            slots: self.slots,
            metadata: self.metadata,
        };
        if self.check_valid {
            let mut violations = Vec::new();
            if !self.duplicate_assays.is_empty() {
                violations.push(format!(
                    "duplicate assay names: {}",
                    self.duplicate_assays.iter().join(", ")
                ));
            }
            violations.extend(frame.violations());
            if !violations.is_empty() {
                return Err(AssayFrameError::InvalidState { violations });
            }
        }
        else {
            debug_assert!(frame.validate().is_ok());
        }
        Ok(frame)
    }
}
