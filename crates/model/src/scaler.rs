//! Standard scaling for the `Age` column.
//!
//! Only `Age` is centred and scaled; every other column passes through
//! untouched.

use serde::{Deserialize, Serialize};

use crate::record::{AGE_INDEX, FEATURE_COUNT};

/// Zero-mean / unit-variance transform fitted on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Index of the scaled column in the feature vector
    pub column: usize,
    pub mean: f64,
    /// Population standard deviation; 1.0 when the column is constant
    pub scale: f64,
}

impl StandardScaler {
    /// Fit on the `Age` column of the given rows.
    pub fn fit_age(rows: &[[f64; FEATURE_COUNT]]) -> Self {
        Self::fit(rows, AGE_INDEX)
    }

    pub fn fit(rows: &[[f64; FEATURE_COUNT]], column: usize) -> Self {
        if rows.is_empty() {
            return Self::identity(column);
        }

        let n = rows.len() as f64;
        let mean = rows.iter().map(|row| row[column]).sum::<f64>() / n;
        let variance = rows
            .iter()
            .map(|row| {
                let d = row[column] - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let std = variance.sqrt();

        Self {
            column,
            mean,
            scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
        }
    }

    pub fn identity(column: usize) -> Self {
        Self {
            column,
            mean: 0.0,
            scale: 1.0,
        }
    }

    pub fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = *features;
        out[self.column] = (out[self.column] - self.mean) / self.scale;
        out
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.column >= FEATURE_COUNT {
            return Err(format!("scaled column {} out of range", self.column));
        }
        if !self.mean.is_finite() {
            return Err("scaler mean is not finite".to_string());
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(format!("invalid scaler scale: {}", self.scale));
        }
        Ok(())
    }
}
