//! Result tables produced by the search experiments.
//!
//! Three record shapes are read (and written by the experiment driver):
//! the per-algorithm summary, the HC/Beam iteration history and the
//! simulated annealing history. Loading checks the header for the required
//! columns before any row is parsed, so a table is either accepted whole or
//! rejected with [`PlotError::InvalidSchema`].

use crate::error::PlotError;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Required columns of `summary.csv`
pub const SUMMARY_COLUMNS: [&str; 5] = ["algorithm", "accuracy", "f1", "latency", "score"];
/// Required columns of the HC/Beam history files
pub const HISTORY_COLUMNS: [&str; 2] = ["iter", "score"];
/// Required columns of `sa_history.csv`
pub const ANNEALING_COLUMNS: [&str; 3] = ["iter", "T", "score"];

/// Final result of one search algorithm
///
/// Only the required columns must parse; an unreadable cell in an optional
/// column is read as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Algorithm label (HC, Beam, SA)
    pub algorithm: String,
    /// Learning rate of the best configuration
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub lr: Option<f64>,
    /// Tree depth of the best configuration
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub depth: Option<i32>,
    /// Regularisation of the best configuration
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub reg: Option<f64>,
    pub accuracy: f64,
    pub f1: f64,
    pub latency: f64,
    /// Objective value under the algorithm's own objective
    pub score: f64,
}

/// One Hill Climbing or Beam Search step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(deserialize_with = "integral")]
    pub iter: i64,
    pub score: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub accuracy: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub f1: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub latency: Option<f64>,
}

/// One simulated annealing step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingRecord {
    #[serde(deserialize_with = "integral")]
    pub iter: i64,
    /// Temperature at this step
    #[serde(rename = "T")]
    pub temperature: f64,
    pub score: f64,
    /// Whether a worse neighbour was accepted at this step; written as 0/1,
    /// read from 0/1 or true/false
    #[serde(default, deserialize_with = "flag", serialize_with = "flag_as_digit")]
    pub accepted_worse: Option<bool>,
}

impl AnnealingRecord {
    pub fn accepted_worse(&self) -> bool {
        self.accepted_worse.unwrap_or(false)
    }
}

/// Integer column that may be written as `3` or `3.0`
fn integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(de::Error::custom(format!("{} is not an integer", value)));
    }
    Ok(value as i64)
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }))
}

fn flag_as_digit<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(accepted) => serializer.serialize_u8(u8::from(*accepted)),
        None => serializer.serialize_none(),
    }
}

/// Rows of one CSV file, in file order
#[derive(Debug, Clone)]
pub struct Table<T> {
    /// Source file
    pub path: PathBuf,
    pub rows: Vec<T>,
}

impl<T> Table<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extract one numeric column
    pub fn column<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&T) -> f64,
    {
        self.rows.iter().map(f).collect()
    }

    /// Fail with [`PlotError::EmptyInput`] when there are no rows
    pub fn require_rows(self) -> Result<Self, PlotError> {
        if self.rows.is_empty() {
            return Err(PlotError::EmptyInput { path: self.path });
        }
        Ok(self)
    }
}

/// Load a CSV table after checking that every column in `required` is present.
///
/// A missing file is reported as [`PlotError::MissingInput`], missing columns
/// as [`PlotError::InvalidSchema`] and unparsable cells as
/// [`PlotError::MalformedInput`].
pub fn load_table<T, P>(path: P, required: &[&str]) -> Result<Table<T>, PlotError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PlotError::MissingInput(path.to_path_buf()));
    }

    let malformed = |source: csv::Error| PlotError::MalformedInput {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(malformed)?;

    let headers = reader.headers().map_err(malformed)?.clone();
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(PlotError::InvalidSchema {
            path: path.to_path_buf(),
            required: required.iter().map(|c| c.to_string()).collect(),
            missing,
        });
    }

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(malformed)?;

    log::debug!("Loaded {} rows from {}", rows.len(), path.display());

    Ok(Table {
        path: path.to_path_buf(),
        rows,
    })
}

pub fn load_summary<P: AsRef<Path>>(path: P) -> Result<Table<SummaryRecord>, PlotError> {
    load_table(path, &SUMMARY_COLUMNS)
}

pub fn load_history<P: AsRef<Path>>(path: P) -> Result<Table<HistoryRecord>, PlotError> {
    load_table(path, &HISTORY_COLUMNS)
}

pub fn load_annealing<P: AsRef<Path>>(path: P) -> Result<Table<AnnealingRecord>, PlotError> {
    load_table(path, &ANNEALING_COLUMNS)
}

/// `max(latency) - latency` per row, so that lower latency gives a taller bar.
pub fn inverted_latency(rows: &[SummaryRecord]) -> Vec<f64> {
    let max_latency = rows
        .iter()
        .map(|r| r.latency)
        .fold(f64::NEG_INFINITY, f64::max);

    rows.iter().map(|r| max_latency - r.latency).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_summary_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "summary.csv",
            "algorithm,lr,depth,reg,accuracy,f1,latency,score\n\
             HC,0.05,6,0.01,0.8,0.78,1.2,10\n\
             Beam,0.07,8,0.02,0.82,0.80,1.5,12\n",
        );

        let table = load_summary(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].algorithm, "Beam");
        assert_eq!(table.rows[0].depth, Some(6));
        assert!((table.rows[1].score - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_history(dir.path().join("hc_history.csv")).unwrap_err();
        assert!(matches!(err, PlotError::MissingInput(_)));
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "hc_history.csv", "iter,accuracy\n0,0.5\n");

        match load_history(&path).unwrap_err() {
            PlotError::InvalidSchema { missing, required, .. } => {
                assert_eq!(missing, vec!["score".to_string()]);
                assert_eq!(required, vec!["iter".to_string(), "score".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_temperature_column_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "sa_history.csv", "iter,t,score\n0,1.5,0.7\n");
        assert!(matches!(
            load_annealing(&path).unwrap_err(),
            PlotError::InvalidSchema { .. }
        ));
    }

    #[test]
    fn test_annealing_optional_accepted_worse() {
        let dir = tempfile::tempdir().unwrap();
        let with_flag = write_csv(
            dir.path(),
            "a.csv",
            "iter,T,score,accepted_worse\n0,1.5,0.70,0\n1,1.49,0.68,1\n",
        );
        let without_flag = write_csv(dir.path(), "b.csv", "iter,T,score\n0,1.5,0.70\n");

        let table = load_annealing(&with_flag).unwrap();
        assert!(!table.rows[0].accepted_worse());
        assert!(table.rows[1].accepted_worse());

        let table = load_annealing(&without_flag).unwrap();
        assert_eq!(table.rows[0].accepted_worse, None);
        assert!((table.rows[0].temperature - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_accepted_worse_as_booleans() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "sa_history.csv",
            "iter,T,score,accepted_worse\n\
             0,1.5,0.70,false\n\
             1,1.49,0.68,true\n\
             2,1.48,0.69,TRUE\n\
             3,1.47,0.69,maybe\n",
        );

        let table = load_annealing(&path).unwrap();
        assert_eq!(table.len(), 4);
        let flags: Vec<Option<bool>> = table.rows.iter().map(|r| r.accepted_worse).collect();
        assert_eq!(flags, vec![Some(false), Some(true), Some(true), None]);
    }

    #[test]
    fn test_accepted_worse_written_as_digit() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .serialize(AnnealingRecord {
                iter: 1,
                temperature: 1.5,
                score: 0.7,
                accepted_worse: Some(true),
            })
            .unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "iter,T,score,accepted_worse\n1,1.5,0.7,1\n");
    }

    #[test]
    fn test_unreadable_optional_cells_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let history = write_csv(
            dir.path(),
            "hc_history.csv",
            "iter,score,accuracy,f1,latency\n0,0.5,n/a,0.4,1.0\n1,0.6,0.6,,slow\n",
        );
        let summary = write_csv(
            dir.path(),
            "summary.csv",
            "algorithm,lr,depth,reg,accuracy,f1,latency,score\nHC,fast,deep,0.01,0.8,0.78,1.2,10\n",
        );

        let table = load_history(&history).unwrap();
        assert_eq!(table.rows[0].accuracy, None);
        assert_eq!(table.rows[0].f1, Some(0.4));
        assert_eq!(table.rows[1].f1, None);
        assert_eq!(table.rows[1].latency, None);
        assert!((table.rows[1].score - 0.6).abs() < 1e-12);

        let table = load_summary(&summary).unwrap();
        assert_eq!(table.rows[0].lr, None);
        assert_eq!(table.rows[0].depth, None);
        assert_eq!(table.rows[0].reg, Some(0.01));
    }

    #[test]
    fn test_iteration_accepts_integral_floats_and_negatives() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "hc_history.csv",
            "iter,score\n-1,0.4\n0.0,0.5\n1.0,0.6\n",
        );
        let table = load_history(&path).unwrap();
        assert_eq!(table.column(|r| r.iter as f64), vec![-1.0, 0.0, 1.0]);

        let fractional = write_csv(dir.path(), "beam_history.csv", "iter,score\n0.5,0.5\n");
        assert!(matches!(
            load_history(&fractional).unwrap_err(),
            PlotError::MalformedInput { .. }
        ));
    }

    #[test]
    fn test_non_numeric_score_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "hc_history.csv", "iter,score\n0,abc\n");
        assert!(matches!(
            load_history(&path).unwrap_err(),
            PlotError::MalformedInput { .. }
        ));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "hc_history.csv", "iter,score\n");
        let table = load_history(&path).unwrap();
        assert!(table.is_empty());
        assert!(matches!(
            table.require_rows().unwrap_err(),
            PlotError::EmptyInput { .. }
        ));
    }

    #[test]
    fn test_inverted_latency() {
        let rows: Vec<SummaryRecord> = [("HC", 1.2), ("Beam", 1.5), ("SA", 0.9)]
            .iter()
            .map(|&(name, latency)| SummaryRecord {
                algorithm: name.to_string(),
                lr: None,
                depth: None,
                reg: None,
                accuracy: 0.8,
                f1: 0.78,
                latency,
                score: 10.0,
            })
            .collect();

        let inv = inverted_latency(&rows);
        let expected = [0.3, 0.0, 0.6];
        for (got, want) in inv.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9);
            assert!(*got >= 0.0);
        }
    }
}
