//! Error types for QCGen
//!
//! Gantree: L0_Foundation → Errors
//!
//! Two layers: [`QcgenError`] for failures that reach a caller, and
//! [`SkipReason`] for per-instruction degradation that the assembler
//! records and moves past.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QCGen
/// Gantree: QcgenError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QcgenError {
    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// Circuit-type token not in the known vocabulary
    #[error("Invalid circuit type '{0}'")]
    InvalidCircuitType(String),

    /// Invalid bitstring format
    #[error("Invalid bitstring '{0}': must contain only '0' and '1'")]
    InvalidBitstring(String),

    /// Invalid parameter value in an intent
    #[error("Invalid parameter '{key}': {message}")]
    InvalidParameter { key: String, message: String },

    // ========================================================================
    // Circuit Errors
    // ========================================================================
    /// Gate on non-existent qubit
    #[error("Gate references qubit {qubit} but circuit has only {num_qubits} qubits")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    /// Measurement or condition on non-existent classical bit
    #[error("Operation references clbit {clbit} but circuit has only {num_clbits} clbits")]
    ClbitOutOfRange { clbit: usize, num_clbits: usize },

    /// Duplicate qubit in a multi-qubit gate
    #[error("Gate uses qubit {0} more than once")]
    DuplicateQubit(usize),

    /// Invalid angle
    #[error("Invalid angle {0}: must be finite")]
    InvalidAngle(f64),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for QCGen operations
/// Gantree: QcgenResult<T> // type alias
pub type QcgenResult<T> = Result<T, QcgenError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QcgenError {
    fn from(err: serde_json::Error) -> Self {
        QcgenError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QcgenError {
    fn from(err: std::io::Error) -> Self {
        QcgenError::FileError(err.to_string())
    }
}

impl QcgenError {
    /// Check if error is a caller error (rejected request)
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            QcgenError::InvalidCircuitType(_)
                | QcgenError::InvalidBitstring(_)
                | QcgenError::InvalidParameter { .. }
        )
    }

    /// Check if error is a circuit error
    pub fn is_circuit_error(&self) -> bool {
        matches!(
            self,
            QcgenError::QubitOutOfRange { .. }
                | QcgenError::ClbitOutOfRange { .. }
                | QcgenError::DuplicateQubit(_)
                | QcgenError::InvalidAngle(_)
        )
    }
}

// ============================================================================
// Per-instruction Degradation
// ============================================================================

/// Why an instruction was skipped during assembly
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Blank instruction
    #[error("empty instruction")]
    Empty,

    /// Mnemonic outside the fixed vocabulary
    #[error("unrecognized gate '{0}'")]
    UnknownGate(String),

    /// Not enough arguments for the mnemonic
    #[error("'{gate}' expects {expected} argument(s), found {found}")]
    InsufficientArguments {
        /// Mnemonic as written
        gate: String,
        /// Arguments the mnemonic takes
        expected: usize,
        /// Arguments supplied
        found: usize,
    },

    /// Index token that is not a non-negative integer
    #[error("invalid index '{0}'")]
    InvalidIndex(String),

    /// Angle token that is not a decimal number
    #[error("invalid angle '{0}'")]
    InvalidAngle(String),

    /// Arrow measurement with too few tokens
    #[error("invalid measurement format")]
    InvalidMeasurement,

    /// Conditional that does not follow `if(c[i]==v) gate q`
    #[error("invalid conditional: {0}")]
    InvalidConditional(String),

    /// Conditional wrapping a gate that cannot be conditioned
    #[error("unsupported conditional gate '{0}'")]
    UnsupportedConditionalGate(String),

    /// Circuit rejected the operation (index out of range, ...)
    #[error("{0}")]
    Circuit(#[from] QcgenError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QcgenError::InvalidCircuitType("teleport_me".into());
        assert!(err.to_string().contains("teleport_me"));
    }

    #[test]
    fn test_qubit_out_of_range() {
        let err = QcgenError::QubitOutOfRange {
            qubit: 10,
            num_qubits: 7,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("7"));
    }

    #[test]
    fn test_classification() {
        assert!(QcgenError::InvalidCircuitType("x".into()).is_caller_error());
        assert!(!QcgenError::DuplicateQubit(1).is_caller_error());
        assert!(QcgenError::DuplicateQubit(1).is_circuit_error());
    }

    #[test]
    fn test_skip_reason_from_circuit_error() {
        let reason: SkipReason = QcgenError::ClbitOutOfRange {
            clbit: 4,
            num_clbits: 2,
        }
        .into();
        assert!(reason.to_string().contains("clbit 4"));
    }
}
