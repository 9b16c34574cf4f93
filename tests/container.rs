mod common;

use assayframe::prelude::*;
use common::{
    demo_frame,
    labels,
    named_frame,
    ramp,
    NCOLS,
    NROWS,
};
use polars::prelude::*;
use rstest::rstest;
use serde_json::json;

#[test]
fn test_builder_assembles_container() -> anyhow::Result<()> {
    let frame = demo_frame();
    assert_eq!(frame.shape(), (NROWS, NCOLS));
    assert_eq!(frame.n_assays(), 2);
    assert_eq!(frame.assay_names(), vec!["counts", "lognorm"]);
    assert_eq!(frame.row_meta().width(), 2);
    assert_eq!(frame.col_meta().height(), NCOLS);
    assert!(frame.row_names().is_none());
    assert_eq!(frame.metadata()["study"], json!("demo"));
    frame.validate()?;
    Ok(())
}

#[rstest]
#[case::rows(Axis::Rows, NROWS)]
#[case::cols(Axis::Cols, NCOLS)]
fn axis_len_matches_shape(
    #[case] axis: Axis,
    #[case] expected: usize,
) {
    assert_eq!(demo_frame().axis_len(axis), expected);
}

#[test]
fn test_from_assay_shortcut() -> anyhow::Result<()> {
    let frame = AssayFrame::from_assay("counts", ramp(2, 2))?;
    assert_eq!(frame.shape(), (2, 2));
    assert_eq!(frame.row_meta().width(), 0);
    assert_eq!(frame.row_meta().height(), 2);
    assert!(frame.col_names().is_none());
    Ok(())
}

#[test]
fn test_dimensions_without_assays() -> anyhow::Result<()> {
    let frame: AssayFrame = AssayFrame::builder()
        .with_col_meta(df!("group" => ["a", "b"]).unwrap())
        .build()?;
    assert_eq!(frame.shape(), (0, 2));
    assert_eq!(frame.n_assays(), 0);
    Ok(())
}

#[test]
fn test_assay_round_trip() -> anyhow::Result<()> {
    let mut frame = demo_frame();
    let scaled = frame.assay("counts")? * 2.0;
    frame.set_assay("scaled", scaled)?;
    assert_eq!(frame.n_assays(), 3);
    assert_eq!(frame.assay(2)?, frame.assay("scaled")?);
    assert_eq!(frame.assay("scaled")?[[1, 1]], 16.0);

    let removed = frame.remove_assay("lognorm")?;
    assert_eq!(removed.nrows(), NROWS);
    assert_eq!(frame.assay_names(), vec!["counts", "scaled"]);

    let err = frame.assay("lognorm").unwrap_err();
    assert_eq!(err.to_string(), "assay 'lognorm' not found");
    let err = frame.assay(5).unwrap_err();
    assert_eq!(err.to_string(), "assay #5 not found");
    Ok(())
}

#[test]
fn test_set_assay_guards_shape() {
    let mut frame = demo_frame();
    let err = frame.set_assay("bad", ramp(3, 3)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "assay 'bad' has shape (3, 3), expected (10, 7)"
    );
}

#[test]
fn test_view_pairs_names_with_data() -> anyhow::Result<()> {
    let frame = named_frame();
    let view = frame.assay_view("counts")?;
    assert_eq!(view.name(), "counts");
    assert_eq!(view.data()[[0, 0]], 0.0);
    assert_eq!(view.row_names().map(|names| names.len()), Some(NROWS));
    assert_eq!(view.col_names().map(|names| names.len()), Some(NCOLS));
    Ok(())
}

#[test]
fn test_names_set_and_clear() -> anyhow::Result<()> {
    let mut frame = demo_frame();
    frame.set_row_names(labels("FEATURE", NROWS))?;
    assert_eq!(frame.row_names().unwrap()[0], "FEATURE_1");

    let err = frame.set_row_names(labels("FEATURE", 3)).unwrap_err();
    assert_eq!(err.to_string(), "row names has length 3, expected 10");
    let err = frame
        .set_col_names(["a", "a", "b", "c", "d", "e", "f"])
        .unwrap_err();
    assert_eq!(err.to_string(), "duplicate column names: a");

    frame.clear_row_names();
    assert!(frame.row_names().is_none());
    Ok(())
}

#[test]
fn test_validation_lists_every_violation() {
    let err = AssayFrame::builder()
        .with_dims(4, 3)
        .with_assay("counts", ramp(4, 2))
        .with_row_meta(df!("x" => [1i32, 2]).unwrap())
        .with_row_names(["r1", "r1", "r2", "r3"])
        .with_slot("sizes", AxisVector::cols(vec![1u32, 2]))
        .build()
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("assay 'counts' has shape (4, 2), expected (4, 3)"));
    assert!(msg.contains("row metadata has length 2, expected 4"));
    assert!(msg.contains("duplicate row names: r1"));
    assert!(msg.contains(
        "slot 'sizes': per-column vector has length 2, expected 3"
    ));
}

#[test]
fn test_metadata_bag_round_trip() {
    let mut frame = demo_frame();
    frame
        .metadata_mut()
        .insert("qc".to_string(), json!({"passed": true, "version": 2}));
    assert_eq!(frame.metadata().len(), 2);
    assert_eq!(frame.metadata()["qc"]["version"], json!(2));
}
