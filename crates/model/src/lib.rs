//! Pawtection risk model
//!
//! Shared building blocks for the dog bite risk pipeline:
//!
//! - `schema`: versioned label→code maps used by both training and prediction
//! - `record`: the six-feature record and column names
//! - `scaler`: standard scaling applied to the `Age` column
//! - `tree` / `forest`: regression trees and their averaged ensemble
//! - `pipeline`: scaler + forest, the unit that gets persisted
//! - `artifact`: atomic binary persistence and validated reload
//! - `predictor`: encode → predict → clip → premium
//! - `config`: TOML configuration helpers

pub mod artifact;
pub mod canonical;
pub mod config;
pub mod errors;
pub mod forest;
pub mod pipeline;
pub mod predictor;
pub mod record;
pub mod scaler;
pub mod schema;
pub mod selection;
pub mod tree;

pub use artifact::{load_pipeline, persist, PipelineArtifact, ARTIFACT_FORMAT_VERSION};
pub use config::{read_toml, PawtectionConfig, QuoteConfig};
pub use errors::ModelError;
pub use forest::RandomForest;
pub use pipeline::{Pipeline, PipelineMetadata};
pub use predictor::{clip, quote_premium, Predictor, Quote, RiskBand, MAX_SCORE, MIN_SCORE};
pub use record::{Record, FEATURE_COLUMNS, FEATURE_COUNT, TARGET_COLUMN};
pub use scaler::StandardScaler;
pub use schema::{CategoryMap, EncodingSchema, SCHEMA_VERSION};
pub use selection::{FormError, Selection, PLACEHOLDER};
pub use tree::{Node, Tree};

/// Crate version string recorded in artifacts and health reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
