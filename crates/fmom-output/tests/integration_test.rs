//! Integration tests for writing alpha tables to disk.

use chrono::NaiveDate;
use fmom_data::schema::{ALPHA, ASSET_ID, BETA, DATE, date_column};
use fmom_output::{
    AlphaRecord, AlphaWriter, ExportFormat, RunSummary, read_alpha_table, records_from_frame,
};
use polars::prelude::*;
use std::path::PathBuf;

fn temp_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fmom-output-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn table() -> DataFrame {
    let d1 = NaiveDate::from_ymd_opt(2010, 1, 5).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2010, 1, 6).unwrap();
    DataFrame::new(vec![
        date_column(DATE, &[d1, d1, d2]).unwrap(),
        Series::new(ASSET_ID.into(), vec!["USA1", "USA2", "USA1"]).into(),
        Series::new(BETA.into(), vec![1.1, 0.7, 1.05]).into(),
        Series::new(ALPHA.into(), vec![0.0003, -0.0001, 0.0002]).into(),
    ])
    .unwrap()
}

#[test]
fn test_parquet_write_and_read_back() {
    let root = temp_root("parquet");
    let writer = AlphaWriter::new(&root, ExportFormat::Parquet);
    let lambda = 0.693 / 63.0;

    let mut df = table();
    let path = writer.write("test", lambda, &mut df).unwrap();

    assert_eq!(
        path,
        root.join("results/test/alphas/factor_momentum_lambda_0.011000.parquet")
    );
    let back = read_alpha_table(&path).unwrap();
    assert!(back.equals(&table()));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_csv_write() {
    let root = temp_root("csv");
    let writer = AlphaWriter::new(&root, ExportFormat::Csv);

    let mut df = table();
    let path = writer.write("train", 0.0275, &mut df).unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("csv"));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<AlphaRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows, records_from_frame(&table()).unwrap());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_json_write() {
    let root = temp_root("json");
    let writer = AlphaWriter::new(&root, ExportFormat::PrettyJson);

    let mut df = table();
    let path = writer.write("train", 0.0275, &mut df).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let rows: Vec<AlphaRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].asset_id, "USA1");

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_write_rejects_incomplete_table() {
    let root = temp_root("incomplete");
    let writer = AlphaWriter::new(&root, ExportFormat::Parquet);
    let mut df = table().drop(BETA).unwrap();
    assert!(writer.write("train", 0.0275, &mut df).is_err());
    assert!(!writer.path_for("train", 0.0275).exists());
}

#[test]
fn test_summary_of_written_table() {
    let summary = RunSummary::from_table(0.693 / 63.0, &table(), vec![2010], vec![]).unwrap();
    assert_eq!(summary.signal, "factor_momentum_lambda_0.011000");
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.dates, 2);
    assert_eq!(summary.assets, 2);
    assert!((summary.half_life - 63.0 * std::f64::consts::LN_2 / 0.693).abs() < 1e-9);
}
