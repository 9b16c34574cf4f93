#![allow(dead_code)]

use assayframe::prelude::*;
use ndarray::Array2;
use polars::prelude::*;

pub const NROWS: usize = 10;
pub const NCOLS: usize = 7;

pub fn ramp(
    nrows: usize,
    ncols: usize,
) -> Array2<f64> {
    Array2::from_shape_fn((nrows, ncols), |(i, j)| (i * ncols + j) as f64)
}

pub fn labels(
    prefix: &str,
    count: usize,
) -> Vec<String> {
    (1..=count)
        .map(|i| format!("{}_{}", prefix, i))
        .collect()
}

pub fn demo_frame() -> AssayFrame {
    let counts = ramp(NROWS, NCOLS);
    let lognorm = counts.mapv(f64::ln_1p);
    AssayFrame::builder()
        .with_assay("counts", counts)
        .with_assay("lognorm", lognorm)
        .with_row_meta(
            df!(
                "gene_type" => [
                    "coding", "coding", "coding", "coding", "coding",
                    "noncoding", "noncoding", "noncoding", "noncoding",
                    "noncoding",
                ],
                "length" => [
                    150u32, 900, 1200, 340, 780, 2100, 95, 430, 660, 510,
                ],
            )
            .unwrap(),
        )
        .with_col_meta(
            df!(
                "treatment" => [
                    "control", "control", "control", "drug_a", "drug_a",
                    "drug_b", "drug_b",
                ],
                "dose" => [0.0, 0.0, 0.0, 1.0, 2.0, 1.0, 2.0],
            )
            .unwrap(),
        )
        .with_metadata("study", "demo")
        .build()
        .unwrap()
}

pub fn named_frame() -> AssayFrame {
    let mut frame = demo_frame();
    frame.set_row_names(labels("FEATURE", NROWS)).unwrap();
    frame.set_col_names(labels("SAMPLE", NCOLS)).unwrap();
    frame
}

pub fn slotted_frame() -> AssayFrame {
    let mut frame = named_frame();
    frame
        .set_slot("pca", LinkedMatrix::per_col(ramp(NCOLS, 2)))
        .unwrap();
    frame
        .set_slot(
            "sizes",
            AxisVector::cols(vec![
                1_000u32, 1_250, 980, 1_430, 1_105, 895, 1_220,
            ]),
        )
        .unwrap();
    frame
        .set_slot(
            "neighbors",
            AxisPairs::rows(
                NROWS,
                vec![0, 1, 2, 8],
                vec![1, 2, 3, 9],
                vec![0.9, 0.7, 0.5, 0.3],
            )
            .unwrap(),
        )
        .unwrap();
    frame
}
