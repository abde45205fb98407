//! CSV dataset loading
//!
//! Reads a headered, comma-delimited table. Columns are resolved by name, so
//! their order in the file is free and extra columns are ignored. Every one
//! of the six feature columns and the `Score` target must be present.

use pawtection_model::{FEATURE_COLUMNS, FEATURE_COUNT, TARGET_COLUMN};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{Result, TrainerError};

/// Training rows in [`FEATURE_COLUMNS`] order plus their targets
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub features: Vec<[f64; FEATURE_COUNT]>,
    pub targets: Vec<f64>,
}

/// `describe()`-style summary of the target column
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl Dataset {
    pub fn new(features: Vec<[f64; FEATURE_COUNT]>, targets: Vec<f64>) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(TrainerError::Training(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if features.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }
        Ok(Self { features, targets })
    }

    /// Load dataset from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TrainerError::DataLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Parse CSV from any reader; `source` is only used in error messages.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let data_load = |e: csv::Error| TrainerError::DataLoad {
            path: source.to_string(),
            reason: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(data_load)?.clone();
        let position = |name: &str| headers.iter().position(|h| h == name);

        let required: Vec<&str> = FEATURE_COLUMNS
            .iter()
            .copied()
            .chain(std::iter::once(TARGET_COLUMN))
            .collect();
        let missing: Vec<String> = required
            .iter()
            .filter(|name| position(*name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TrainerError::Schema { missing });
        }

        // Every required column is present past this point.
        let columns: Vec<usize> = required.iter().filter_map(|name| position(*name)).collect();

        let mut features = Vec::new();
        let mut targets = Vec::new();

        for row in reader.records() {
            let row = row.map_err(data_load)?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let mut values = [0.0; FEATURE_COUNT + 1];
            for (slot, (&column, name)) in columns.iter().zip(&required).enumerate() {
                let raw = row.get(column).unwrap_or_default();
                values[slot] = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| TrainerError::InvalidValue {
                        line,
                        column: name.to_string(),
                        value: raw.to_string(),
                    })?;
            }

            let mut row_features = [0.0; FEATURE_COUNT];
            row_features.copy_from_slice(&values[..FEATURE_COUNT]);
            features.push(row_features);
            targets.push(values[FEATURE_COUNT]);
        }

        Self::new(features, targets)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Rows at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i]).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// (min, max) per feature column
    pub fn column_ranges(&self) -> Vec<(f64, f64)> {
        let mut ranges = vec![(f64::INFINITY, f64::NEG_INFINITY); FEATURE_COUNT];

        for row in &self.features {
            for (range, &value) in ranges.iter_mut().zip(row.iter()) {
                range.0 = range.0.min(value);
                range.1 = range.1.max(value);
            }
        }

        ranges
    }

    /// `None` for a dataset without rows.
    pub fn target_summary(&self) -> Option<TargetSummary> {
        if self.targets.is_empty() {
            return None;
        }

        let mut sorted = self.targets.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|t| (t - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(TargetSummary {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.50),
            p75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Breed,Age,Gender,SpayNeuter,Borough,IsBite,Score";

    fn create_test_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv(&format!(
            "{HEADER}\n2,3,1,0,5,1,88.5\n7,10,2,1,1,0,12\n1,4,1,1,6,0,30\n"
        ));
        let dataset = Dataset::from_csv(file.path()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.features[0], [2.0, 3.0, 1.0, 0.0, 5.0, 1.0]);
        assert_eq!(dataset.targets, vec![88.5, 12.0, 30.0]);
    }

    #[test]
    fn columns_resolved_by_name() {
        let file = create_test_csv(
            "Score,IsBite,Borough,Extra,SpayNeuter,Gender,Age,Breed\n55,1,5,x,0,1,3,2\n",
        );
        let dataset = Dataset::from_csv(file.path()).unwrap();

        assert_eq!(dataset.features[0], [2.0, 3.0, 1.0, 0.0, 5.0, 1.0]);
        assert_eq!(dataset.targets[0], 55.0);
    }

    #[test]
    fn missing_file_is_data_load_error() {
        let result = Dataset::from_csv("/definitely/not/here.csv");
        assert!(matches!(result, Err(TrainerError::DataLoad { .. })));
    }

    #[test]
    fn every_required_column_is_checked() {
        let required: Vec<&str> = HEADER.split(',').collect();
        for dropped in &required {
            let header: Vec<&str> = required.iter().copied().filter(|c| c != dropped).collect();
            let row = vec!["1"; header.len()].join(",");
            let file = create_test_csv(&format!("{}\n{row}\n", header.join(",")));

            match Dataset::from_csv(file.path()) {
                Err(TrainerError::Schema { missing }) => assert_eq!(missing, vec![dropped.to_string()]),
                other => panic!("dropping {dropped}: expected schema error, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_numeric_cell_is_rejected() {
        let file = create_test_csv(&format!("{HEADER}\n2,three,1,0,5,1,88\n"));
        match Dataset::from_csv(file.path()) {
            Err(TrainerError::InvalidValue { column, value, .. }) => {
                assert_eq!(column, "Age");
                assert_eq!(value, "three");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn header_only_is_empty() {
        let file = create_test_csv(&format!("{HEADER}\n"));
        assert!(matches!(
            Dataset::from_csv(file.path()),
            Err(TrainerError::EmptyDataset)
        ));
    }

    #[test]
    fn test_column_ranges() {
        let dataset = Dataset::new(
            vec![[1.0, 3.0, 1.0, 0.0, 5.0, 1.0], [7.0, 12.0, 2.0, 1.0, 1.0, 0.0]],
            vec![10.0, 20.0],
        )
        .unwrap();

        let ranges = dataset.column_ranges();
        assert_eq!(ranges[0], (1.0, 7.0));
        assert_eq!(ranges[1], (3.0, 12.0));
    }

    #[test]
    fn test_target_summary() {
        let dataset = Dataset::new(vec![[0.0; FEATURE_COUNT]; 4], vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        let summary = dataset.target_summary().unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.p25, 1.75);
        assert_eq!(summary.p50, 2.5);
        assert_eq!(summary.p75, 3.25);
        assert!((summary.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_subset_has_no_summary() {
        let dataset = Dataset::new(vec![[1.0; FEATURE_COUNT]; 3], vec![1.0, 2.0, 3.0]).unwrap();
        let empty = dataset.subset(&[]);

        assert!(empty.is_empty());
        assert_eq!(empty.target_summary(), None);
        assert_eq!(dataset.subset(&[2]).target_summary().unwrap().max, 3.0);
    }
}
