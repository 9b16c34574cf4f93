//! # assayframe
//!
//! `assayframe` is a Rust library for keeping rectangular experimental
//! data and its annotations synchronized. The central type is
//! [`AssayFrame`](prelude::AssayFrame): a set of equally shaped assay
//! matrices whose rows are features and whose columns are samples,
//! together with per-axis metadata tables, optional unique axis names,
//! extension slots for linked structures (embeddings, per-axis vectors,
//! neighbour graphs) and a free-form metadata bag.
//!
//! Every operation treats the container as one unit: a subset, a block
//! assignment or a row/column bind first resolves its selections into
//! concrete positions and then applies those positions to every aligned
//! structure, so nothing can drift apart.
//!
//! ## Key Features
//!
//! * **Synchronized subsetting**: Row and column selections given as
//!   ranges, position vectors, boolean masks or name lists are resolved
//!   once and applied to assays, metadata tables, names and extension
//!   slots together. Invalid positions and unknown names are reported
//!   in full, not one at a time.
//! * **Aggregated validation**: `validate()` checks every structural
//!   invariant and returns the complete list of violations in a single
//!   error.
//! * **Block assignment**: A region addressed by two selections can be
//!   replaced from a structurally compatible container; the target is
//!   only modified when the whole assignment succeeds.
//! * **Binding**: Containers sharing one axis stack along the other,
//!   concatenating the linked structures and carrying the fixed ones,
//!   with configurable content-equality checks on the fixed axis.
//! * **Extension slots**: External structures declare which of their
//!   dimensions follow the container through the
//!   [`ExtensionSlot`](prelude::ExtensionSlot) protocol and stay
//!   aligned under every operation.
//! * **Pluggable storage**: Assays are anything implementing
//!   [`AssayData`](prelude::AssayData); dense `ndarray` matrices are
//!   built in, metadata tables ride on `polars`.
//!
//! ## Structure
//!
//! The crate is organized into a few modules:
//!
//! * [`data_structs`]: The fundamental types, including the container
//!   itself ([`frame`](data_structs::frame)), the assay storage trait
//!   ([`assay`](data_structs::assay)) and the extension slot protocol
//!   ([`extension`](data_structs::extension)).
//! * [`error`]: The crate-wide error enum and `Result` alias.
//! * [`prelude`]: One-stop imports for the common types.
//!
//! ## Installation
//!
//! ```bash
//! # Add as a dependency to your Cargo.toml
//! cargo add assayframe
//! ```
//!
//! ## Usage
//!
//! ### Building, subsetting and rebinding a container
//!
//! ```
//! use assayframe::prelude::*;
//! use ndarray::Array2;
//! use polars::df;
//!
//! fn main() -> Result<()> {
//!     let counts = Array2::from_shape_fn((4, 3), |(i, j)| (i * 3 + j) as f64);
//!     let frame = AssayFrame::builder()
//!         .with_assay("counts", counts)
//!         .with_row_meta(df!("gc" => [0.2, 0.4, 0.6, 0.8])?)
//!         .with_row_names(["g1", "g2", "g3", "g4"])
//!         .with_col_names(["s1", "s2", "s3"])
//!         .build()?;
//!
//!     // One resolved selection drives every structure at once.
//!     let first_two = frame.subset(0..2, ..)?;
//!     assert_eq!(first_two.shape(), (2, 3));
//!     assert_eq!(first_two.row_names().unwrap(), ["g1", "g2"]);
//!
//!     // Containers agreeing on their columns stack by rows.
//!     let rest = frame.subset(2..4, ..)?;
//!     let rebuilt = first_two.bind_rows(&[&rest])?;
//!     assert_eq!(rebuilt, frame);
//!     Ok(())
//! }
//! ```
//!
//! ### Extension slots follow the axes
//!
//! ```
//! use assayframe::prelude::*;
//! use ndarray::Array2;
//!
//! fn main() -> Result<()> {
//!     let mut frame =
//!         AssayFrame::from_assay("signal", Array2::<f64>::zeros((3, 2)))?;
//!     frame.set_row_names(["a", "b", "c"])?;
//!     frame.set_slot(
//!         "embedding",
//!         LinkedMatrix::per_row(Array2::<f64>::zeros((3, 5))),
//!     )?;
//!
//!     let picked = frame.subset(vec!["c", "a"], ..)?;
//!     let embedding =
//!         picked.slot_downcast::<LinkedMatrix<Array2<f64>>>("embedding")?;
//!     assert_eq!(embedding.data().nrows(), 2);
//!     Ok(())
//! }
//! ```

pub mod data_structs;
pub mod error;
pub mod prelude;
mod utils;

#[allow(unused_imports)]
use prelude::*;
