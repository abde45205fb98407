//! Feature record and column layout shared by training and prediction.

use serde::{Deserialize, Serialize};

/// Feature columns in the order the pipeline consumes them
pub const FEATURE_COLUMNS: [&str; 6] = ["Breed", "Age", "Gender", "SpayNeuter", "Borough", "IsBite"];

/// Regression target column
pub const TARGET_COLUMN: &str = "Score";

/// Number of model features
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Position of `Age` inside a feature vector
pub const AGE_INDEX: usize = 1;

/// One encoded pet observation.
///
/// Categorical fields hold the integer codes produced by the
/// [`EncodingSchema`](crate::schema::EncodingSchema); `age` is in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub breed: f64,
    pub age: f64,
    pub gender: f64,
    pub spay_neuter: f64,
    pub borough: f64,
    pub is_bite: f64,
}

impl Record {
    pub fn new(breed: i64, age: i64, gender: i64, spay_neuter: i64, borough: i64, is_bite: i64) -> Self {
        Self {
            breed: breed as f64,
            age: age as f64,
            gender: gender as f64,
            spay_neuter: spay_neuter as f64,
            borough: borough as f64,
            is_bite: is_bite as f64,
        }
    }

    /// Features in [`FEATURE_COLUMNS`] order
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.breed,
            self.age,
            self.gender,
            self.spay_neuter,
            self.borough,
            self.is_bite,
        ]
    }

    pub fn from_features(features: &[f64; FEATURE_COUNT]) -> Self {
        Self {
            breed: features[0],
            age: features[1],
            gender: features[2],
            spay_neuter: features[3],
            borough: features[4],
            is_bite: features[5],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_order_matches_columns() {
        let record = Record::new(2, 3, 1, 0, 5, 1);
        let features = record.to_features();
        assert_eq!(features, [2.0, 3.0, 1.0, 0.0, 5.0, 1.0]);
        assert_eq!(FEATURE_COLUMNS[AGE_INDEX], "Age");
        assert_eq!(Record::from_features(&features), record);
    }
}
