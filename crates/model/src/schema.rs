//! Versioned category encoding schema.
//!
//! The label→code maps used to build the training CSV and the ones used to
//! encode form selections must agree. Both sides go through
//! [`EncodingSchema::builtin`]; its version and fingerprint are recorded in
//! every artifact and checked again at load time.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::errors::{ModelError, Result};

/// Bump whenever a code assignment changes
pub const SCHEMA_VERSION: u32 = 1;

/// Label→code map for one categorical field, with a fallback for labels
/// the map does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMap {
    pub field: String,
    /// (label, code) pairs in dropdown order
    pub entries: Vec<(String, i64)>,
    pub fallback: i64,
}

impl CategoryMap {
    fn new(field: &str, entries: &[(&str, i64)], fallback: i64) -> Self {
        Self {
            field: field.to_string(),
            entries: entries
                .iter()
                .map(|(label, code)| (label.to_string(), *code))
                .collect(),
            fallback,
        }
    }

    /// Exact label lookup
    pub fn lookup(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, code)| *code)
    }

    /// Code for `label`, or the fallback code when the label is unknown
    pub fn encode(&self, label: &str) -> i64 {
        self.lookup(label).unwrap_or(self.fallback)
    }

    /// First label mapped to `code`
    pub fn label_for(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, known)| *known == code)
            .map(|(label, _)| label.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }
}

/// All category maps plus the accepted age range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingSchema {
    pub version: u32,
    pub bite_history: CategoryMap,
    pub breed: CategoryMap,
    pub gender: CategoryMap,
    pub spay_neuter: CategoryMap,
    pub borough: CategoryMap,
    /// Inclusive age range offered to users, in years
    pub min_age: u8,
    pub max_age: u8,
}

static BUILTIN: Lazy<EncodingSchema> = Lazy::new(|| EncodingSchema {
    version: SCHEMA_VERSION,
    bite_history: CategoryMap::new("Bite History", &[("Yes", 1), ("No", 0)], 1),
    breed: CategoryMap::new(
        "Breed",
        &[
            ("German Shepherd", 1),
            ("Pit Bull", 2),
            ("Rottweiler", 3),
            ("Bulldog", 4),
            ("Siberian Husky", 5),
            ("Mixed Breed", 6),
            ("Others", 7),
        ],
        7,
    ),
    gender: CategoryMap::new("Gender", &[("Male", 1), ("Female", 2)], 1),
    spay_neuter: CategoryMap::new("Spay/Neuter", &[("Yes", 1), ("No", 0)], 0),
    borough: CategoryMap::new(
        "Borough",
        &[
            ("Manhattan", 1),
            ("Brooklyn", 6),
            ("Queens", 4),
            ("Bronx", 3),
            ("Staten Island", 5),
            ("Others", 2),
        ],
        1,
    ),
    min_age: 1,
    max_age: 19,
});

impl EncodingSchema {
    /// The schema compiled into this build
    pub fn builtin() -> &'static EncodingSchema {
        &BUILTIN
    }

    /// BLAKE3 hex digest over the canonical JSON form of the schema
    pub fn fingerprint(&self) -> String {
        // Plain strings and integers always serialize.
        canonical_hash_hex(self).unwrap_or_default()
    }

    /// Fail fast when an artifact was produced under a different schema.
    pub fn ensure_compatible(&self, version: u32, fingerprint: &str) -> Result<()> {
        let expected = self.fingerprint();
        if version != self.version || fingerprint != expected {
            return Err(ModelError::SchemaMismatch {
                artifact: format!("v{version} ({})", short(fingerprint)),
                runtime: format!("v{} ({})", self.version, short(&expected)),
            });
        }
        Ok(())
    }

    pub fn ages(&self) -> impl Iterator<Item = u8> {
        self.min_age..=self.max_age
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}
