//! Circuit intents
//!
//! Gantree: L4_Intent → CircuitIntent
//!
//! What a caller asked for: an algorithm family, its parameters, and an
//! optional structured explanation.

use crate::constants::limits::{clamp_qubits, MAX_INTENT_QUBITS};
use crate::error::{QcgenError, QcgenResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Circuit Type
// ============================================================================

/// Algorithm family requested by a caller
/// Gantree: CircuitType // 회로 종류 enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitType {
    /// Two-qubit Bell pair
    BellState,
    /// n-qubit GHZ state
    GhzState,
    /// n-qubit W state
    WState,
    /// Three-qubit teleportation
    Teleportation,
    /// Two bits over one shared pair
    SuperdenseCoding,
    /// Deutsch-Jozsa oracle test
    DeutschJozsa,
    /// Hidden bitstring recovery
    BernsteinVazirani,
    /// Simon's period finding
    Simon,
    /// Quantum Fourier transform
    Qft,
    /// Quantum phase estimation
    Qpe,
    /// Shor's factoring
    Shor,
    /// Grover's search
    Grovers,
    /// QAOA ansatz
    Qaoa,
    /// VQE ansatz
    Vqe,
    /// Quantum counting
    QuantumCounting,
    /// Quantum walk
    QuantumWalk,
    /// HHL linear-system solver
    Hhl,
    /// Instructions supplied directly in `custom_gates`
    Custom,
    /// No family recognized
    Unknown,
}

impl CircuitType {
    /// The named algorithm families
    pub const ALGORITHMS: [CircuitType; 17] = [
        CircuitType::BellState,
        CircuitType::GhzState,
        CircuitType::WState,
        CircuitType::Teleportation,
        CircuitType::SuperdenseCoding,
        CircuitType::DeutschJozsa,
        CircuitType::BernsteinVazirani,
        CircuitType::Simon,
        CircuitType::Qft,
        CircuitType::Qpe,
        CircuitType::Shor,
        CircuitType::Grovers,
        CircuitType::Qaoa,
        CircuitType::Vqe,
        CircuitType::QuantumCounting,
        CircuitType::QuantumWalk,
        CircuitType::Hhl,
    ];

    /// Wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitType::BellState => "bell_state",
            CircuitType::GhzState => "ghz_state",
            CircuitType::WState => "w_state",
            CircuitType::Teleportation => "teleportation",
            CircuitType::SuperdenseCoding => "superdense_coding",
            CircuitType::DeutschJozsa => "deutsch_jozsa",
            CircuitType::BernsteinVazirani => "bernstein_vazirani",
            CircuitType::Simon => "simon",
            CircuitType::Qft => "qft",
            CircuitType::Qpe => "qpe",
            CircuitType::Shor => "shor",
            CircuitType::Grovers => "grovers",
            CircuitType::Qaoa => "qaoa",
            CircuitType::Vqe => "vqe",
            CircuitType::QuantumCounting => "quantum_counting",
            CircuitType::QuantumWalk => "quantum_walk",
            CircuitType::Hhl => "hhl",
            CircuitType::Custom => "custom",
            CircuitType::Unknown => "unknown",
        }
    }

    /// Human-readable algorithm name
    pub fn title(&self) -> &'static str {
        match self {
            CircuitType::BellState => "Bell State",
            CircuitType::GhzState => "GHZ State",
            CircuitType::WState => "W State",
            CircuitType::Teleportation => "Quantum Teleportation",
            CircuitType::SuperdenseCoding => "Superdense Coding",
            CircuitType::DeutschJozsa => "Deutsch-Jozsa Algorithm",
            CircuitType::BernsteinVazirani => "Bernstein-Vazirani Algorithm",
            CircuitType::Simon => "Simon's Algorithm",
            CircuitType::Qft => "Quantum Fourier Transform",
            CircuitType::Qpe => "Quantum Phase Estimation",
            CircuitType::Shor => "Shor's Algorithm",
            CircuitType::Grovers => "Grover's Search Algorithm",
            CircuitType::Qaoa => "Quantum Approximate Optimization Algorithm",
            CircuitType::Vqe => "Variational Quantum Eigensolver",
            CircuitType::QuantumCounting => "Quantum Counting",
            CircuitType::QuantumWalk => "Quantum Walk",
            CircuitType::Hhl => "HHL Linear Systems Algorithm",
            CircuitType::Custom => "Custom Circuit",
            CircuitType::Unknown => "Unknown Circuit",
        }
    }

    /// Qubit count used when the intent does not name one
    /// Gantree: default_qubits(&self) -> usize // 기본 큐비트 수
    pub fn default_qubits(&self) -> usize {
        match self {
            CircuitType::BellState => 2,
            CircuitType::GhzState => 3,
            CircuitType::WState => 3,
            CircuitType::Teleportation => 3,
            CircuitType::SuperdenseCoding => 2,
            CircuitType::DeutschJozsa => 3,
            CircuitType::BernsteinVazirani => 4,
            CircuitType::Simon => 6,
            CircuitType::Qft => 3,
            CircuitType::Qpe => 5,
            CircuitType::Shor => 6,
            CircuitType::Grovers => 3,
            CircuitType::Qaoa => 4,
            CircuitType::Vqe => 4,
            CircuitType::QuantumCounting => 5,
            CircuitType::QuantumWalk => 4,
            CircuitType::Hhl => 5,
            CircuitType::Custom | CircuitType::Unknown => 3,
        }
    }

    /// Check if this names one of the algorithm families
    pub fn is_algorithm(&self) -> bool {
        !matches!(self, CircuitType::Custom | CircuitType::Unknown)
    }
}

impl FromStr for CircuitType {
    type Err = QcgenError;

    /// Case-insensitive; `-` and spaces are read as `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        Self::ALGORITHMS
            .iter()
            .chain([CircuitType::Custom, CircuitType::Unknown].iter())
            .find(|t| t.as_str() == token)
            .copied()
            .ok_or_else(|| QcgenError::InvalidCircuitType(s.to_string()))
    }
}

impl fmt::Display for CircuitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Parameter bag of an intent
///
/// Recognized keys are typed; anything else is kept in `extra` in the
/// order it arrived.
/// Gantree: IntentParams // 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentParams {
    /// Requested register size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_qubits: Option<usize>,

    /// Instructions for a custom circuit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_gates: Option<Vec<String>>,

    /// Free-text description of a custom circuit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_description: Option<String>,

    /// `balanced` or `constant`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_type: Option<String>,

    /// Hidden bitstring for Bernstein-Vazirani and Simon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_string: Option<String>,

    /// Bitstring Grover search marks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_state: Option<String>,

    /// Counting register size for phase estimation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_qubits: Option<usize>,

    /// Unrecognized keys, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IntentParams {
    /// Empty parameter bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the qubit count
    pub fn with_num_qubits(mut self, n: usize) -> Self {
        self.num_qubits = Some(n);
        self
    }

    /// Set the custom instruction list
    pub fn with_custom_gates<S: Into<String>>(mut self, gates: impl IntoIterator<Item = S>) -> Self {
        self.custom_gates = Some(gates.into_iter().map(Into::into).collect());
        self
    }

    /// Set the free-text description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.custom_description = Some(description.into());
        self
    }

    /// Set an unrecognized key
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Read a loosely-typed JSON object
    ///
    /// Numbers may arrive as numeric strings, non-string gate entries are
    /// dropped, and `num_qubits` is clamped to the intent-boundary ceiling.
    /// Non-object input yields an empty bag.
    /// Gantree: from_value(&Value) -> IntentParams // 관대한 파싱
    pub fn from_value(value: &Value) -> Self {
        let mut params = Self::default();
        let Some(object) = value.as_object() else {
            return params;
        };

        for (key, v) in object {
            match key.as_str() {
                "num_qubits" => params.num_qubits = as_count(v),
                "precision_qubits" => params.precision_qubits = as_count(v),
                "custom_gates" => {
                    params.custom_gates = v.as_array().map(|items| {
                        items
                            .iter()
                            .filter_map(|g| g.as_str().map(str::to_string))
                            .collect()
                    })
                }
                "custom_description" => params.custom_description = as_text(v),
                "oracle_type" => params.oracle_type = as_text(v),
                "secret_string" => params.secret_string = as_text(v),
                "marked_state" => params.marked_state = as_text(v),
                _ => {
                    params.extra.insert(key.clone(), v.clone());
                }
            }
        }

        params.clamp_num_qubits(MAX_INTENT_QUBITS);
        params
    }

    /// Clamp `num_qubits` into `1..=max` when present
    pub fn clamp_num_qubits(&mut self, max: usize) {
        if let Some(n) = self.num_qubits {
            let clamped = clamp_qubits(n, max);
            if clamped != n {
                log::debug!("clamping num_qubits {} to {}", n, clamped);
            }
            self.num_qubits = Some(clamped);
        }
    }

    /// JSON object with recognized keys first, then extras in order
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

fn as_count(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Explanation
// ============================================================================

/// Note on one gate of an explained circuit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateNote {
    /// Gate mnemonic
    #[serde(default)]
    pub gate: String,
    /// What the gate does here
    #[serde(default)]
    pub explanation: String,
    /// Everyday comparison, when one helps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analogy: Option<String>,
}

/// Structured, educational explanation of a circuit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Heading
    #[serde(default)]
    pub title: String,
    /// What the circuit does overall
    #[serde(default)]
    pub summary: String,
    /// One note per notable gate
    #[serde(default)]
    pub gates: Vec<GateNote>,
    /// Where circuits like this are used
    #[serde(default)]
    pub applications: Vec<String>,
    /// What building it teaches
    #[serde(default)]
    pub educational_value: String,
}

// ============================================================================
// Intent
// ============================================================================

/// Unit of work requested of the assembler
/// Gantree: CircuitIntent // 의도
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitIntent {
    /// Requested family
    pub circuit_type: CircuitType,
    /// Family parameters
    #[serde(default)]
    pub params: IntentParams,
    /// Explanation returned alongside the intent, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

impl CircuitIntent {
    /// Create an intent with empty parameters
    pub fn new(circuit_type: CircuitType) -> Self {
        Self {
            circuit_type,
            params: IntentParams::default(),
            explanation: None,
        }
    }

    /// Custom intent over the given instructions
    pub fn custom<S: Into<String>>(gates: impl IntoIterator<Item = S>) -> Self {
        Self::new(CircuitType::Custom).with_params(IntentParams::new().with_custom_gates(gates))
    }

    /// Parse the circuit-type token; an unknown token is an error
    pub fn parse(circuit_type: &str, params: IntentParams) -> QcgenResult<Self> {
        Ok(Self::new(circuit_type.parse()?).with_params(params))
    }

    /// Replace the parameters
    pub fn with_params(mut self, params: IntentParams) -> Self {
        self.params = params;
        self
    }

    /// Attach an explanation
    pub fn with_explanation(mut self, explanation: Explanation) -> Self {
        self.explanation = Some(explanation);
        self
    }

    /// Qubit count from the params, else the family default
    pub fn num_qubits_or_default(&self) -> usize {
        self.params
            .num_qubits
            .unwrap_or_else(|| self.circuit_type.default_qubits())
    }
}

// ============================================================================
// Tests
// ============================================================================
