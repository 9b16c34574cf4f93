mod common;

use assayframe::prelude::*;
use common::{
    slotted_frame,
    NROWS,
};
use itertools::Itertools;
use ndarray::Array2;
use polars::prelude::*;

#[test]
fn test_assignment_writes_every_structure() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let mut patch = frame.subset(vec![7, 8], vec![1, 2])?;
    patch.set_assay("counts", Array2::zeros((2, 2)))?;
    patch.set_row_meta(
        df!(
            "gene_type" => ["edited", "edited"],
            "length" => [1u32, 2],
        )
        .unwrap(),
    )?;
    patch.set_row_names(["FEATURE_8E", "FEATURE_9E"])?;

    frame.assign_subset(vec![7, 8], vec![1, 2], &patch)?;
    assert_eq!(frame.assay("counts")?[[7, 1]], 0.0);
    assert_eq!(frame.assay("counts")?[[8, 2]], 0.0);
    assert_eq!(frame.assay("counts")?[[7, 0]], 49.0);
    assert_eq!(frame.row_names().unwrap()[7], "FEATURE_8E");
    let gene_type = frame.row_meta().data().column("gene_type")?.str()?;
    assert_eq!(gene_type.get(8), Some("edited"));
    assert_eq!(gene_type.get(6), Some("noncoding"));

    // the 8 -> 9 pair touched a replaced row and is gone
    let neighbors = frame.slot_downcast::<AxisPairs<f64>>("neighbors")?;
    let endpoints = neighbors
        .iter()
        .map(|(from, to, _)| (from, to))
        .collect_vec();
    assert_eq!(endpoints, vec![(0, 1), (1, 2), (2, 3)]);
    frame.validate()?;
    Ok(())
}

#[test]
fn test_region_addressed_by_name() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let mut patch = frame.subset(["FEATURE_2"], ["SAMPLE_5"])?;
    patch.set_assay("lognorm", Array2::from_elem((1, 1), -1.0))?;
    frame.assign_subset(["FEATURE_2"], ["SAMPLE_5"], &patch)?;
    assert_eq!(frame.assay("lognorm")?[[1, 4]], -1.0);
    assert_eq!(frame.assay("counts")?[[1, 4]], 11.0);
    Ok(())
}

#[test]
fn test_full_column_replacement() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let mut patch = frame.subset(.., vec![6])?;
    patch.set_assay("counts", Array2::from_elem((NROWS, 1), 0.5))?;
    patch.set_col_names(["SAMPLE_7B"])?;
    frame.assign_subset(.., vec![6], &patch)?;
    assert_eq!(frame.assay("counts")?[[0, 6]], 0.5);
    assert_eq!(frame.assay("counts")?[[9, 6]], 0.5);
    assert_eq!(frame.col_names().unwrap()[6], "SAMPLE_7B");
    frame.validate()?;
    Ok(())
}

#[test]
fn test_zero_sized_replacement_refused() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let before = frame.clone();
    let empty = frame.subset(Vec::<usize>::new(), Vec::<usize>::new())?;
    let err = frame.assign_subset(vec![0], vec![0], &empty).unwrap_err();
    assert_eq!(err.to_string(), "replacement has length zero, expected 1");
    assert_eq!(frame, before);
    Ok(())
}

#[test]
fn test_replacement_shape_must_match() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let patch = frame.subset(vec![0, 1], vec![0, 1])?;
    let err = frame
        .assign_subset(vec![0, 1, 2], vec![0, 1], &patch)
        .unwrap_err();
    assert_eq!(err.to_string(), "replacement rows has length 2, expected 3");
    let err = frame
        .assign_subset(vec![0, 1], vec![0, 1, 2], &patch)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "replacement columns has length 2, expected 3"
    );
    Ok(())
}

#[test]
fn test_structural_compatibility_required() -> anyhow::Result<()> {
    let mut frame = slotted_frame();

    let mut patch = frame.subset(vec![0], vec![0])?;
    patch.remove_assay("lognorm")?;
    let err = frame.assign_subset(vec![0], vec![0], &patch).unwrap_err();
    assert_eq!(err.to_string(), "assay names are not compatible");

    let mut patch = frame.subset(vec![0], vec![0])?;
    patch.set_col_meta(df!("batch" => [1i32]).unwrap())?;
    let err = frame.assign_subset(vec![0], vec![0], &patch).unwrap_err();
    assert_eq!(
        err.to_string(),
        "per-column metadata columns are not compatible"
    );

    let mut patch = frame.subset(vec![0], vec![0])?;
    patch.remove_slot("neighbors")?;
    let err = frame.assign_subset(vec![0], vec![0], &patch).unwrap_err();
    assert_eq!(err.to_string(), "slot names are not compatible");
    Ok(())
}

#[test]
fn test_failed_assignment_leaves_target_untouched() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let before = frame.clone();
    // the patch keeps the name FEATURE_1, writing it over row 1 would
    // duplicate it
    let mut patch = frame.subset(vec![0], vec![0])?;
    patch.set_assay("counts", Array2::from_elem((1, 1), 999.0))?;
    let err = frame.assign_subset(vec![1], vec![0], &patch).unwrap_err();
    assert!(matches!(err, AssayFrameError::DuplicateNames { .. }));
    assert_eq!(frame, before);
    Ok(())
}

#[test]
fn test_unnamed_patch_keeps_target_names() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let mut patch = frame.subset(vec![3], vec![3])?;
    patch.clear_row_names();
    patch.clear_col_names();
    patch.set_assay("counts", Array2::from_elem((1, 1), -5.0))?;
    frame.assign_subset(vec![3], vec![3], &patch)?;
    assert_eq!(frame.assay("counts")?[[3, 3]], -5.0);
    assert_eq!(frame.row_names().unwrap()[3], "FEATURE_4");
    assert_eq!(frame.col_names().unwrap()[3], "SAMPLE_4");
    Ok(())
}
