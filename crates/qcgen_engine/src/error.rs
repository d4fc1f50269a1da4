//! Engine errors
//!
//! Gantree: L6_Engine → EngineError
//!
//! Intent resolution and assembly degrade instead of failing; what remains
//! are caller mistakes (bad circuit-type token, unreadable upload) and
//! runtime setup.

use qcgen_core::QcgenError;
use qcgen_suggest::SuggestError;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid intent or circuit-type token
    #[error("Core error: {0}")]
    Core(#[from] QcgenError),

    /// Upload could not be read by any suggester
    #[error("Suggester error: {0}")]
    Suggest(#[from] SuggestError),

    /// Configuration rejected by `EngineConfig::validate`
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stage output missing after its stage ran
    #[error("Pipeline stage '{0}' produced no output")]
    MissingStage(&'static str),

    /// Tokio runtime could not be created
    #[error("Async runtime error: {0}")]
    Runtime(String),
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
