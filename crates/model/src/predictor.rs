//! Single-record prediction and premium quoting.
//!
//! A [`Predictor`] owns a loaded pipeline and never mutates it, so one
//! instance can be shared behind an `Arc` by any number of readers.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::artifact::load_pipeline_with_schema;
use crate::config::QuoteConfig;
use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::record::Record;
use crate::schema::{CategoryMap, EncodingSchema};
use crate::selection::{FormError, Selection};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Clamp a raw model output into `[MIN_SCORE, MAX_SCORE]`. NaN maps to the
/// lower bound.
pub fn clip(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Monthly premium: `ceil(base_price * (1 + score / 100))`.
///
/// Expects a clipped score; the result is never below `base_price`.
pub fn quote_premium(clipped_score: f64, base_price: u32) -> u32 {
    let premium = f64::from(base_price) * (1.0 + clipped_score / MAX_SCORE);
    premium.ceil() as u32
}

/// Colour-coded risk bucket shown next to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn classify(score: f64) -> Self {
        if score <= 30.0 {
            RiskBand::Low
        } else if score <= 70.0 {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }

    pub fn colour(&self) -> &'static str {
        match self {
            RiskBand::Low => "#27ae60",
            RiskBand::Moderate => "#f39c12",
            RiskBand::High => "#e74c3c",
        }
    }
}

/// Result of one quote request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub record: Record,
    pub raw_score: f64,
    /// Clipped score, used for the premium
    pub score: f64,
    /// `score` rounded to a whole point; the band is classified from this
    pub display_score: u32,
    pub band: RiskBand,
    pub premium: u32,
}

pub struct Predictor {
    pipeline: Pipeline,
    schema: EncodingSchema,
    config: QuoteConfig,
}

impl Predictor {
    pub fn new(pipeline: Pipeline, config: QuoteConfig) -> Self {
        Self::with_schema(pipeline, EncodingSchema::builtin().clone(), config)
    }

    pub fn with_schema(pipeline: Pipeline, schema: EncodingSchema, config: QuoteConfig) -> Self {
        Self {
            pipeline,
            schema,
            config,
        }
    }

    /// Load the artifact at `path` under the builtin schema.
    pub fn load<P: AsRef<Path>>(path: P, config: QuoteConfig) -> Result<Self> {
        config.validate()?;
        let schema = EncodingSchema::builtin().clone();
        let pipeline = load_pipeline_with_schema(path, &schema)?;
        Ok(Self::with_schema(pipeline, schema, config))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn schema(&self) -> &EncodingSchema {
        &self.schema
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Map dropdown labels to model codes. Unknown labels take the
    /// category's fallback code.
    pub fn encode(&self, selection: &Selection) -> Record {
        Record::new(
            encode_field(&self.schema.breed, &selection.breed),
            i64::from(selection.age),
            encode_field(&self.schema.gender, &selection.gender),
            encode_field(&self.schema.spay_neuter, &selection.spay_neuter),
            encode_field(&self.schema.borough, &selection.borough),
            encode_field(&self.schema.bite_history, &selection.is_bite),
        )
    }

    /// Raw, unbounded model output
    pub fn predict(&self, record: &Record) -> f64 {
        self.pipeline.predict(record)
    }

    pub fn quote_record(&self, record: Record) -> Quote {
        let raw_score = self.predict(&record);
        let score = clip(raw_score);
        let display_score = score.round() as u32;
        let quote = Quote {
            record,
            raw_score,
            score,
            display_score,
            band: RiskBand::classify(f64::from(display_score)),
            premium: quote_premium(score, self.config.base_price),
        };
        debug!(
            raw = quote.raw_score,
            clipped = quote.score,
            premium = quote.premium,
            "quoted record"
        );
        quote
    }

    /// Validate, encode and price one form submission.
    pub fn quote(&self, selection: &Selection) -> std::result::Result<Quote, FormError> {
        selection.validate(&self.schema)?;
        Ok(self.quote_record(self.encode(selection)))
    }
}

fn encode_field(map: &CategoryMap, label: &str) -> i64 {
    match map.lookup(label) {
        Some(code) => code,
        None => {
            warn!(
                field = %map.field,
                label,
                fallback = map.fallback,
                "unknown label, using fallback code"
            );
            map.fallback
        }
    }
}
