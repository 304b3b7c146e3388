//! Errors raised while configuring a pipeline.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PipelineError {
    /// Weights scale scores, so they must be positive and finite
    #[error("Strategy weight must be positive, got {weight} for {strategy}")]
    InvalidWeight { strategy: String, weight: f32 },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
