//! Constants for QCGen
//!
//! Gantree: L0_Foundation → Constants
//!
//! Qubit ceilings, assembly defaults and suggester retry bounds.

// ============================================================================
// Limits
// Gantree: limits // 큐비트 상한
// ============================================================================

pub mod limits {
    //! Qubit ceilings enforced by clamping, never by rejection

    /// Maximum qubits accepted when assembling a circuit
    /// Gantree: MAX_ASSEMBLY_QUBITS: usize = 50
    pub const MAX_ASSEMBLY_QUBITS: usize = 50;

    /// Maximum qubits accepted at the intent-parsing boundary
    /// Gantree: MAX_INTENT_QUBITS: usize = 10
    pub const MAX_INTENT_QUBITS: usize = 10;

    /// Smallest register produced by qubit-count inference
    pub const MIN_INFERRED_QUBITS: usize = 2;

    /// Clamp an explicit qubit count into `1..=max`
    #[inline]
    pub fn clamp_qubits(n: usize, max: usize) -> usize {
        n.clamp(1, max.max(1))
    }
}

// ============================================================================
// Assembly Defaults
// Gantree: assembly // 조립 기본값
// ============================================================================

pub mod assembly {
    //! Defaults used while assembling custom circuits

    /// Instructions used for a custom intent that carries no gates
    pub const DEFAULT_CUSTOM_GATES: &[&str] = &["h 0", "cx 0 1"];

    /// Substring that marks a source sequence as already measured
    pub const MEASURE_MARKER: &str = "measure";

    /// Name of the single classical register
    pub const CLASSICAL_REGISTER: &str = "c";

    /// Name of the single quantum register
    pub const QUANTUM_REGISTER: &str = "q";

    /// Deepest nesting of parentheses and unary signs in one angle expression
    pub const MAX_ANGLE_DEPTH: usize = 64;

    /// Default instruction list as owned strings
    pub fn default_custom_gates() -> Vec<String> {
        DEFAULT_CUSTOM_GATES.iter().map(|s| s.to_string()).collect()
    }
}

// ============================================================================
// Suggester Defaults
// ============================================================================

pub mod suggest {
    //! Retry bounds for external instruction suggesters

    /// Attempts made to obtain a flat instruction list from a source interpreter
    pub const MAX_SHAPE_ATTEMPTS: usize = 3;

    /// Retries on rate limiting or service unavailability at the HTTP layer
    pub const MAX_HTTP_RETRIES: usize = 3;
}

// ============================================================================
// Tests
// ============================================================================
