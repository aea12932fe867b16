//! Parquet-backed sources.
//!
//! Factor returns and asset attributes are scanned lazily (glob patterns are
//! allowed). Exposures live in one file per calendar year, located by
//! substituting the year into a path template.

use crate::error::{DataError, Result};
use crate::schema::{ASSET_ID, BETA, DATE, PRICE, require_columns};
use crate::source::{
    AssetAttributeSource, ExposureSource, FactorReturnSource, check_date_range,
    filter_date_range,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder replaced by the calendar year in exposure path templates.
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Reads every pipeline input from Parquet files.
#[derive(Debug, Clone)]
pub struct ParquetStore {
    factors: PathBuf,
    exposures_template: String,
    assets: PathBuf,
}

impl ParquetStore {
    /// Create a store.
    ///
    /// # Arguments
    /// * `factors` - Factor return file or glob, e.g. `data/factors/factors_*.parquet`
    /// * `exposures_template` - Exposure path containing `{year}`, e.g. `data/exposures/exposures_{year}.parquet`
    /// * `assets` - Asset attribute file or glob
    pub fn new(
        factors: impl Into<PathBuf>,
        exposures_template: impl Into<String>,
        assets: impl Into<PathBuf>,
    ) -> Self {
        Self {
            factors: factors.into(),
            exposures_template: exposures_template.into(),
            assets: assets.into(),
        }
    }

    /// Path of the exposure partition for `year`.
    pub fn exposure_path(&self, year: i32) -> PathBuf {
        PathBuf::from(
            self.exposures_template
                .replace(YEAR_PLACEHOLDER, &year.to_string()),
        )
    }

    fn scan(path: &Path, source_name: &str) -> Result<LazyFrame> {
        LazyFrame::scan_parquet(path, ScanArgsParquet::default()).map_err(|e| {
            DataError::MissingData {
                source_name: source_name.to_string(),
                reason: format!("cannot scan {}: {e}", path.display()),
            }
        })
    }
}

impl FactorReturnSource for ParquetStore {
    fn load_factor_returns(&self, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        check_date_range(start, end)?;
        let df = filter_date_range(Self::scan(&self.factors, "factor returns")?, start, end)
            .sort([DATE], SortMultipleOptions::default())
            .collect()?;

        if df.height() == 0 {
            return Err(DataError::MissingData {
                source_name: "factor returns".to_string(),
                reason: format!("no rows between {start} and {end}"),
            });
        }
        require_columns(&df, "factor returns", &[DATE])?;
        debug!(rows = df.height(), "loaded factor returns");
        Ok(df)
    }
}

impl ExposureSource for ParquetStore {
    fn load_year(&self, year: i32) -> Result<Option<DataFrame>> {
        let path = self.exposure_path(year);
        if !path.exists() {
            return Ok(None);
        }

        let df = ParquetReader::new(File::open(&path)?).finish()?;
        require_columns(&df, "exposures", &[DATE, ASSET_ID])?;
        debug!(year, rows = df.height(), path = %path.display(), "loaded exposure partition");
        Ok(Some(df))
    }
}

impl AssetAttributeSource for ParquetStore {
    fn load_attributes(&self, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        check_date_range(start, end)?;
        let df = filter_date_range(Self::scan(&self.assets, "asset attributes")?, start, end)
            .collect()?;
        require_columns(&df, "asset attributes", &[DATE, ASSET_ID, PRICE, BETA])?;

        let df = df
            .lazy()
            .select([col(DATE), col(ASSET_ID), col(PRICE), col(BETA)])
            .collect()?;
        debug!(rows = df.height(), "loaded asset attributes");
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{date_column, read_dates};
    use rstest::rstest;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fmom-data-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_parquet(path: &Path, df: &mut DataFrame) {
        let file = File::create(path).unwrap();
        ParquetWriter::new(file).finish(df).unwrap();
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("/data/exposures_{year}.parquet", 2005, "/data/exposures_2005.parquet")]
    #[case("data/{year}/exposures.parquet", 1995, "data/1995/exposures.parquet")]
    #[case("exposures.parquet", 2010, "exposures.parquet")]
    fn test_exposure_path_template(
        #[case] template: &str,
        #[case] year: i32,
        #[case] expected: &str,
    ) {
        let store = ParquetStore::new("f.parquet", template, "a.parquet");
        assert_eq!(store.exposure_path(year), PathBuf::from(expected));
    }

    #[test]
    fn test_load_year_reads_template_partition() {
        let dir = temp_dir("exposures");
        let dates = [date(2012, 1, 3), date(2012, 1, 3), date(2012, 1, 4)];
        let mut df = DataFrame::new(vec![
            date_column(DATE, &dates).unwrap(),
            Series::new(ASSET_ID.into(), vec!["A", "B", "A"]).into(),
            Series::new("Beta".into(), vec![1.1, 0.9, 1.2]).into(),
            Series::new("Size".into(), vec![-0.5, 0.3, -0.4]).into(),
        ])
        .unwrap();
        write_parquet(&dir.join("exposures_2012.parquet"), &mut df);

        let template = dir.join("exposures_{year}.parquet");
        let store = ParquetStore::new(
            dir.join("factors.parquet"),
            template.to_string_lossy(),
            dir.join("assets.parquet"),
        );

        let loaded = store.load_year(2012).unwrap().unwrap();
        assert_eq!(loaded.height(), 3);
        let names: Vec<&str> = loaded.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec![DATE, ASSET_ID, "Beta", "Size"]);
        assert_eq!(read_dates(&loaded, DATE).unwrap(), dates.to_vec());
        let size: Vec<Option<f64>> = loaded.column("Size").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(size, vec![Some(-0.5), Some(0.3), Some(-0.4)]);

        assert!(store.load_year(2013).unwrap().is_none());
    }

    #[test]
    fn test_missing_exposure_partition_is_none() {
        let dir = temp_dir("missing");
        let template = dir.join("exposures_{year}.parquet");
        let store = ParquetStore::new(
            dir.join("factors.parquet"),
            template.to_string_lossy(),
            dir.join("assets.parquet"),
        );
        assert!(store.load_year(1901).unwrap().is_none());
    }

    #[test]
    fn test_load_factor_returns_filters_and_sorts() {
        let dir = temp_dir("factors");
        let dates = [date(2020, 1, 3), date(2020, 1, 1), date(2020, 1, 2)];
        let mut df = DataFrame::new(vec![
            date_column(DATE, &dates).unwrap(),
            Series::new("Beta".into(), vec![0.03, 0.01, 0.02]).into(),
        ])
        .unwrap();
        let path = dir.join("factors.parquet");
        write_parquet(&path, &mut df);

        let store = ParquetStore::new(&path, "unused_{year}.parquet", dir.join("assets.parquet"));
        let loaded = store
            .load_factor_returns(date(2020, 1, 2), date(2020, 1, 3))
            .unwrap();

        assert_eq!(loaded.height(), 2);
        let values: Vec<Option<f64>> = loaded.column("Beta").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(0.02), Some(0.03)]);
    }

    #[test]
    fn test_missing_factor_returns_is_fatal() {
        let dir = temp_dir("nofactors");
        let store = ParquetStore::new(
            dir.join("does_not_exist.parquet"),
            "unused_{year}.parquet",
            dir.join("assets.parquet"),
        );
        let result = store.load_factor_returns(date(2020, 1, 1), date(2020, 12, 31));
        assert!(result.is_err());
    }

    #[rstest]
    #[case(date(2021, 1, 1), date(2020, 1, 1))]
    #[case(date(2020, 1, 2), date(2020, 1, 1))]
    fn test_invalid_range(#[case] start: NaiveDate, #[case] end: NaiveDate) {
        let store = ParquetStore::new("f.parquet", "e_{year}.parquet", "a.parquet");
        let err = store.load_factor_returns(start, end).unwrap_err();
        assert!(matches!(err, DataError::InvalidDateRange { .. }));
        let err = store.load_attributes(start, end).unwrap_err();
        assert!(matches!(err, DataError::InvalidDateRange { .. }));
    }
}
