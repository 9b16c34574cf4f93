//! This module contains the core data structures used throughout the
//! `assayframe` crate for representing rectangular experimental data
//! together with the annotations that must stay synchronized with it.
//!
//! Key components of this module include:
//!
//! - [`frame`]: The central [`AssayFrame`] container holding equally
//!   shaped assay matrices, per-axis metadata tables, optional axis
//!   names, extension slots and a metadata bag, along with its builder
//!   and the row/column binding machinery.
//! - [`assay`]: The [`AssayData`] capability trait with a dense
//!   [`ndarray`] implementation; any matrix type that can report its
//!   shape, gather positions, concatenate and write blocks can serve as
//!   assay storage.
//! - [`extension`]: The [`ExtensionSlot`] protocol plus the stock
//!   payloads ([`AxisVector`], [`LinkedMatrix`], [`AxisPairs`]) for
//!   structures that follow one or both container axes.
//! - [`MetaFrame`], a height-aware wrapper around a `polars` DataFrame
//!   used for the per-axis annotation tables.
//! - [`Selector`] and [`resolve_selector`], the pure position
//!   resolution every synchronized operation goes through.
//! - [`Axis`], [`AxisLink`] and [`SlotRole`], the small vocabulary the
//!   container and its slots use to talk about dimensions.
//!
//! [`AssayFrame`]: frame::AssayFrame
//! [`AssayData`]: assay::AssayData
//! [`ExtensionSlot`]: extension::ExtensionSlot
//! [`AxisVector`]: extension::AxisVector
//! [`LinkedMatrix`]: extension::LinkedMatrix
//! [`AxisPairs`]: extension::AxisPairs

pub mod assay;
mod axis;
pub mod extension;
pub mod frame;
mod meta;
mod selector;

pub use axis::{
    Axis,
    AxisLink,
    SlotRole,
};
pub use meta::MetaFrame;
pub use selector::{
    resolve_selector,
    Selector,
};
