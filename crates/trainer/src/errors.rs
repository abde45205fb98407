use pawtection_model::ModelError;
use thiserror::Error;

/// Errors returned by the trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("failed to load dataset {path}: {reason}")]
    DataLoad { path: String, reason: String },

    #[error("missing columns in dataset: {missing:?}")]
    Schema { missing: Vec<String> },

    #[error("line {line}, column {column}: invalid value {value:?}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
