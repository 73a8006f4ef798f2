//! CSV Data Loader Module
//! Reads the education CSV with Polars and converts it into a typed dataset.

use super::model::{Dataset, EducationRecord, Metric, INCOME_CLASS_COL, ISSUES_COL, STATE_COL};
use log::{debug, info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Column '{column}' is not numeric: {reason}")]
    InvalidColumn { column: String, reason: String },
}

/// Cell tokens read as missing, the same set pandas treats as NA by default.
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Label used for a missing `State` or `Income Class` cell.
pub const MISSING_LABEL: &str = "nan";

/// Process-wide dataset cache used by the dashboard.
pub static DATASET_CACHE: DatasetCache = DatasetCache::new();

/// Load-once holder for the dataset. The first successful load wins and is
/// shared read-only for the rest of the process.
pub struct DatasetCache {
    cell: OnceLock<Arc<Dataset>>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached dataset, loading it from `path` on first access.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>, DataSourceError> {
        if let Some(dataset) = self.cell.get() {
            debug!("dataset cache hit ({} rows)", dataset.len());
            return Ok(Arc::clone(dataset));
        }

        let loaded = Arc::new(load_dataset(path)?);
        Ok(Arc::clone(self.cell.get_or_init(|| loaded)))
    }

    #[cfg(test)]
    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().cloned()
    }
}

/// Load the dataset from a CSV file.
pub fn load_dataset(path: &Path) -> Result<Dataset, DataSourceError> {
    DataLoader::load_csv(path)
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load and convert a CSV file.
    pub fn load_csv(path: &Path) -> Result<Dataset, DataSourceError> {
        if !path.is_file() {
            return Err(DataSourceError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_null_values(Some(NullValues::AllColumns(
                NA_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect(),
            )))
            .finish()?
            .collect()?;

        let dataset = Self::from_frame(&df)?;
        info!(
            "loaded {} rows, {} states from {}",
            dataset.len(),
            dataset.states().len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Convert a loaded DataFrame into typed records.
    pub fn from_frame(df: &DataFrame) -> Result<Dataset, DataSourceError> {
        let states = Self::text_column(df, STATE_COL)?;
        let classes = Self::text_column(df, INCOME_CLASS_COL)?;
        let issues = Self::text_column(df, ISSUES_COL)?;

        let mut rates: Vec<Vec<f64>> = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            rates.push(Self::rate_column(df, metric.column())?);
        }

        let mut records = Vec::with_capacity(df.height());
        let mut missing_keys = 0usize;
        for row in 0..df.height() {
            let state = Self::key_or_label(&states[row], &mut missing_keys);
            let income_class = Self::key_or_label(&classes[row], &mut missing_keys);

            records.push(EducationRecord {
                state,
                income_class,
                literacy_rate: rates[0][row],
                primary: rates[1][row],
                secondary: rates[2][row],
                higher_secondary: rates[3][row],
                graduation: rates[4][row],
                issues_faced: issues[row].clone().unwrap_or_default(),
            });
        }

        if missing_keys > 0 {
            warn!(
                "{} empty State/Income Class cells labelled '{}'",
                missing_keys, MISSING_LABEL
            );
        }
        Ok(Dataset::from_records(records))
    }

    fn key_or_label(value: &Option<String>, missing: &mut usize) -> String {
        match value {
            Some(v) => v.clone(),
            None => {
                *missing += 1;
                MISSING_LABEL.to_string()
            }
        }
    }

    fn required<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DataSourceError> {
        df.column(name)
            .map_err(|_| DataSourceError::MissingColumn(name.to_string()))
    }

    fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DataSourceError> {
        let column = Self::required(df, name)?.cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();
        Ok(values)
    }

    /// Percentages as f64; nulls become NaN, non-numeric text is an error.
    fn rate_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, DataSourceError> {
        let column = Self::required(df, name)?
            .strict_cast(&DataType::Float64)
            .map_err(|e| DataSourceError::InvalidColumn {
                column: name.to_string(),
                reason: e.to_string(),
            })?;
        let values = column
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "State,Income Class,Literacy Rate (%),Primary (%),Secondary (%),Higher Secondary (%),Graduation (%),Issues Faced";

    fn write_fixture(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "edu_dashboard_{}_{}.csv",
            std::process::id(),
            name
        ));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_typed_records_in_file_order() {
        let path = write_fixture(
            "basic",
            &format!(
                "{HEADER}\n\
                 Kerala,Low,80,70,60,50,40,\"Fees, distance\"\n\
                 Kerala,High,95,90,85,80,75,None\n\
                 Bihar,Low,55,60,40,30,10,Child labour\n"
            ),
        );

        let ds = load_dataset(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.states(), vec!["Kerala", "Bihar"]);
        let first = &ds.records()[0];
        assert_eq!(first.income_class, "Low");
        assert_eq!(first.literacy_rate, 80.0);
        assert_eq!(first.graduation, 40.0);
        assert_eq!(first.issues_faced, "Fees, distance");
    }

    #[test]
    fn empty_rate_cell_becomes_nan() {
        let path = write_fixture(
            "nan",
            &format!("{HEADER}\nGoa,Low,80,,60,50,40,x\nGoa,High,90,70,60,50,40,\n"),
        );

        let ds = load_dataset(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(ds.records()[0].primary.is_nan());
        assert_eq!(ds.records()[1].primary, 70.0);
        assert_eq!(ds.records()[1].issues_faced, "");
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = std::env::temp_dir().join("edu_dashboard_does_not_exist.csv");
        assert!(matches!(
            load_dataset(&path),
            Err(DataSourceError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let path = write_fixture(
            "nocol",
            "State,Income Class,Literacy Rate (%),Primary (%),Secondary (%),Higher Secondary (%),Issues Faced\n\
             Goa,Low,80,70,60,50,x\n",
        );

        let err = load_dataset(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(matches!(err, DataSourceError::MissingColumn(ref c) if c == "Graduation (%)"));
    }

    #[test]
    fn text_in_rate_column_is_rejected() {
        let df = df! {
            STATE_COL => ["Goa"],
            INCOME_CLASS_COL => ["Low"],
            "Literacy Rate (%)" => ["high"],
            "Primary (%)" => [70.0],
            "Secondary (%)" => [60.0],
            "Higher Secondary (%)" => [50.0],
            "Graduation (%)" => [40.0],
            ISSUES_COL => ["x"],
        }
        .unwrap();

        assert!(matches!(
            DataLoader::from_frame(&df),
            Err(DataSourceError::InvalidColumn { ref column, .. }) if column == "Literacy Rate (%)"
        ));
    }

    #[test]
    fn na_tokens_read_as_missing() {
        let path = write_fixture(
            "na_tokens",
            &format!(
                "{HEADER}\n\
                 Goa,Low,NA,70,N/A,null,NaN,NA\n\
                 Goa,,80,60,50,40,30,Fees\n"
            ),
        );

        let ds = load_dataset(&path).unwrap();
        fs::remove_file(&path).ok();

        let first = &ds.records()[0];
        assert!(first.literacy_rate.is_nan());
        assert_eq!(first.primary, 70.0);
        assert!(first.secondary.is_nan());
        assert!(first.higher_secondary.is_nan());
        assert!(first.graduation.is_nan());
        assert_eq!(first.issues_faced, "");

        let second = &ds.records()[1];
        assert_eq!(second.income_class, MISSING_LABEL);
        assert_eq!(second.literacy_rate, 80.0);
    }

    #[test]
    fn integer_rates_and_null_state() {
        let df = df! {
            STATE_COL => [Some("Goa"), None],
            INCOME_CLASS_COL => ["Low", "High"],
            "Literacy Rate (%)" => [80i64, 90],
            "Primary (%)" => [70i64, 80],
            "Secondary (%)" => [60i64, 70],
            "Higher Secondary (%)" => [50i64, 60],
            "Graduation (%)" => [40i64, 50],
            ISSUES_COL => ["x", "y"],
        }
        .unwrap();

        let ds = DataLoader::from_frame(&df).unwrap();
        assert_eq!(ds.states(), vec!["Goa", MISSING_LABEL]);
        assert_eq!(ds.records()[1].literacy_rate, 90.0);
    }

    #[test]
    fn cache_loads_once_and_shares() {
        let path = write_fixture("cache", &format!("{HEADER}\nGoa,Low,80,70,60,50,40,x\n"));
        let cache = DatasetCache::new();
        assert!(cache.get().is_none());

        let first = cache.get_or_load(&path).unwrap();
        fs::remove_file(&path).ok();
        // Served from memory once loaded, even with the file gone.
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn failed_load_leaves_cache_empty() {
        let cache = DatasetCache::new();
        let path = std::env::temp_dir().join("edu_dashboard_cache_missing.csv");
        assert!(cache.get_or_load(&path).is_err());
        assert!(cache.get().is_none());
    }
}
