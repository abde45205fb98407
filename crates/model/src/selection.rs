//! Raw form selections and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::EncodingSchema;

/// Dropdown value meaning "nothing chosen yet"
pub const PLACEHOLDER: &str = "Please Select..";

/// Human-readable values as submitted by the quote form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub is_bite: String,
    pub breed: String,
    pub age: u8,
    pub gender: String,
    pub spay_neuter: String,
    pub borough: String,
}

/// Recoverable input problems: the user can fix them and resubmit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please make sure all dropdown fields are selected before estimating the premium.")]
    Unselected(Vec<&'static str>),

    #[error("Please choose an age between {min} and {max} years.")]
    AgeOutOfRange { age: u8, min: u8, max: u8 },
}

impl Selection {
    /// Every categorical dropdown must be moved off the placeholder and the
    /// age must lie in the schema's offered range.
    pub fn validate(&self, schema: &EncodingSchema) -> Result<(), FormError> {
        let fields: [(&'static str, &str); 5] = [
            ("Bite History", &self.is_bite),
            ("Breed", &self.breed),
            ("Gender", &self.gender),
            ("Spay/Neuter", &self.spay_neuter),
            ("Borough", &self.borough),
        ];

        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty() || *value == PLACEHOLDER)
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(FormError::Unselected(missing));
        }

        if !(schema.min_age..=schema.max_age).contains(&self.age) {
            return Err(FormError::AgeOutOfRange {
                age: self.age,
                min: schema.min_age,
                max: schema.max_age,
            });
        }

        Ok(())
    }
}
