//! Engine configuration for QCGen
//!
//! Gantree: L6_Engine → EngineConfig
//!
//! Read-only settings shared by every request: qubit ceilings, how intents
//! are resolved, and which exports are produced.

use qcgen_core::constants::assembly::default_custom_gates;
use qcgen_core::constants::limits::{MAX_ASSEMBLY_QUBITS, MAX_INTENT_QUBITS};
use qcgen_core::CircuitAssembler;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which encodings the export stage produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSwitches {
    /// OpenQASM 2.0 text
    pub qasm: bool,
    /// JSON circuit document
    pub json: bool,
    /// Qiskit Python listing
    pub qiskit: bool,
}

impl Default for ExportSwitches {
    fn default() -> Self {
        Self::all()
    }
}

impl ExportSwitches {
    /// Every encoding
    pub fn all() -> Self {
        Self {
            qasm: true,
            json: true,
            qiskit: true,
        }
    }

    /// No encodings
    pub fn none() -> Self {
        Self {
            qasm: false,
            json: false,
            qiskit: false,
        }
    }

    /// Check if at least one encoding is enabled
    pub fn any(&self) -> bool {
        self.qasm || self.json || self.qiskit
    }
}

/// Engine configuration
/// Gantree: EngineConfig // 엔진 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // ========================================================================
    // Qubit Ceilings
    // ========================================================================
    /// Ceiling applied when a circuit is assembled
    pub max_assembly_qubits: usize,

    /// Ceiling applied to interpreted intents
    pub max_intent_qubits: usize,

    // ========================================================================
    // Resolution
    // ========================================================================
    /// Families with a built-in generator never reach the suggester
    pub prefer_templates: bool,

    /// Append one measurement per qubit when the source has none
    pub append_measurements: bool,

    /// Instructions for a custom intent that carries none
    pub default_instructions: Vec<String>,

    // ========================================================================
    // Exports
    // ========================================================================
    /// Encodings produced by the export stage
    pub exports: ExportSwitches,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_assembly_qubits: MAX_ASSEMBLY_QUBITS,
            max_intent_qubits: MAX_INTENT_QUBITS,
            prefer_templates: false,
            append_measurements: true,
            default_instructions: default_custom_gates(),
            exports: ExportSwitches::all(),
        }
    }
}

impl EngineConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in generators first, no exports
    ///
    /// Deterministic and network-free for every family that has a
    /// generator.
    pub fn templates_only() -> Self {
        Self {
            prefer_templates: true,
            exports: ExportSwitches::none(),
            ..Self::default()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set the assembly ceiling
    pub fn with_max_assembly_qubits(mut self, n: usize) -> Self {
        self.max_assembly_qubits = n;
        self
    }

    /// Set the intent ceiling
    pub fn with_max_intent_qubits(mut self, n: usize) -> Self {
        self.max_intent_qubits = n;
        self
    }

    /// Prefer built-in generators over the suggester
    pub fn with_prefer_templates(mut self, prefer: bool) -> Self {
        self.prefer_templates = prefer;
        self
    }

    /// Enable or disable terminal measurements
    pub fn with_append_measurements(mut self, append: bool) -> Self {
        self.append_measurements = append;
        self
    }

    /// Replace the default custom instructions
    pub fn with_default_instructions<S: Into<String>>(
        mut self,
        instructions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.default_instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    /// Select export encodings
    pub fn with_exports(mut self, exports: ExportSwitches) -> Self {
        self.exports = exports;
        self
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Assembler honouring this configuration
    pub fn to_assembler(&self) -> CircuitAssembler {
        CircuitAssembler::new()
            .with_max_qubits(self.max_assembly_qubits)
            .with_append_measurements(self.append_measurements)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_assembly_qubits == 0 {
            return Err("max_assembly_qubits must be > 0".to_string());
        }

        if self.max_intent_qubits == 0 {
            return Err("max_intent_qubits must be > 0".to_string());
        }

        if self.max_intent_qubits > self.max_assembly_qubits {
            return Err(format!(
                "max_intent_qubits ({}) must be <= max_assembly_qubits ({})",
                self.max_intent_qubits, self.max_assembly_qubits
            ));
        }

        if self.default_instructions.iter().all(|s| s.trim().is_empty()) {
            return Err("default_instructions must not be empty".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineConfig(max={}Q/{}Q, templates={}, measure={})",
            self.max_intent_qubits,
            self.max_assembly_qubits,
            self.prefer_templates,
            self.append_measurements
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = EngineConfig::default();
        assert_eq!(config.max_assembly_qubits, 50);
        assert_eq!(config.max_intent_qubits, 10);
        assert_eq!(config.default_instructions, vec!["h 0", "cx 0 1"]);
        assert!(config.exports.any());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_templates_only() {
        let config = EngineConfig::templates_only();
        assert!(config.prefer_templates);
        assert!(!config.exports.any());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_max_assembly_qubits(20)
            .with_append_measurements(false)
            .with_default_instructions(["x 0"]);
        assert_eq!(config.max_assembly_qubits, 20);
        assert!(!config.append_measurements);
        assert_eq!(config.default_instructions, vec!["x 0"]);
        assert_eq!(config.to_assembler().max_qubits(), 20);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::new()
            .with_prefer_templates(true)
            .with_exports(ExportSwitches {
                qasm: true,
                json: false,
                qiskit: false,
            });
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"prefer_templates": true}"#).unwrap();
        assert!(config.prefer_templates);
        assert_eq!(config.max_assembly_qubits, 50);
    }

    #[test]
    fn test_validation() {
        assert!(EngineConfig::new().with_max_assembly_qubits(0).validate().is_err());
        assert!(EngineConfig::new().with_max_intent_qubits(60).validate().is_err());
        assert!(EngineConfig::new()
            .with_default_instructions(Vec::<String>::new())
            .validate()
            .is_err());
    }
}
