//! Gate vocabulary for QCGen
//!
//! Gantree: L1_Circuit → Gate
//!
//! [`GateKind`] is the closed set of mnemonics the assembler understands.
//! [`Gate`] is a concrete operation with its indices and angles resolved.

use crate::types::{Angle, ClbitId, Condition, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Gate Kind
// ============================================================================

/// Closed gate vocabulary
/// Gantree: GateKind // 니모닉 enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Hadamard
    H,
    /// Pauli-X
    X,
    /// Pauli-Y
    Y,
    /// Pauli-Z
    Z,
    /// Identity
    Id,
    /// Phase (√Z)
    S,
    /// π/8 gate
    T,
    /// Rotation about X
    Rx,
    /// Rotation about Y
    Ry,
    /// Rotation about Z
    Rz,
    /// Phase rotation, applied as `rz`
    U1,
    /// Two-angle single-qubit unitary
    U2,
    /// General single-qubit unitary
    U3,
    /// Controlled-X
    Cx,
    /// Controlled-Z
    Cz,
    /// Exchange two qubits
    Swap,
    /// Controlled phase
    Cp,
    /// Toffoli
    Ccx,
    /// Measurement into a classical bit
    Measure,
    /// Reset to |0⟩
    Reset,
    /// Scheduling barrier
    Barrier,
    /// `if` and `conditional` share one kind
    Conditional,
}

impl GateKind {
    /// Every kind, in vocabulary order
    pub const ALL: [GateKind; 22] = [
        GateKind::H,
        GateKind::X,
        GateKind::Y,
        GateKind::Z,
        GateKind::Id,
        GateKind::S,
        GateKind::T,
        GateKind::Rx,
        GateKind::Ry,
        GateKind::Rz,
        GateKind::U1,
        GateKind::U2,
        GateKind::U3,
        GateKind::Cx,
        GateKind::Cz,
        GateKind::Swap,
        GateKind::Cp,
        GateKind::Ccx,
        GateKind::Measure,
        GateKind::Reset,
        GateKind::Barrier,
        GateKind::Conditional,
    ];

    /// Look up a mnemonic (case-insensitive)
    /// Gantree: from_mnemonic(s) -> Option<GateKind> // 어휘 조회
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "h" => GateKind::H,
            "x" => GateKind::X,
            "y" => GateKind::Y,
            "z" => GateKind::Z,
            "id" => GateKind::Id,
            "s" => GateKind::S,
            "t" => GateKind::T,
            "rx" => GateKind::Rx,
            "ry" => GateKind::Ry,
            "rz" => GateKind::Rz,
            "u1" => GateKind::U1,
            "u2" => GateKind::U2,
            "u3" => GateKind::U3,
            "cx" => GateKind::Cx,
            "cz" => GateKind::Cz,
            "swap" => GateKind::Swap,
            "cp" => GateKind::Cp,
            "ccx" => GateKind::Ccx,
            "measure" => GateKind::Measure,
            "reset" => GateKind::Reset,
            "barrier" => GateKind::Barrier,
            "if" | "conditional" => GateKind::Conditional,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical mnemonic
    pub fn mnemonic(&self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::Id => "id",
            GateKind::S => "s",
            GateKind::T => "t",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::U1 => "u1",
            GateKind::U2 => "u2",
            GateKind::U3 => "u3",
            GateKind::Cx => "cx",
            GateKind::Cz => "cz",
            GateKind::Swap => "swap",
            GateKind::Cp => "cp",
            GateKind::Ccx => "ccx",
            GateKind::Measure => "measure",
            GateKind::Reset => "reset",
            GateKind::Barrier => "barrier",
            GateKind::Conditional => "if",
        }
    }

    /// Number of qubit indices the mnemonic takes
    ///
    /// `measure` counts its qubit only; its clbit is extra. `barrier` takes
    /// any number. `conditional` depends on its inner gate.
    pub fn qubit_arity(&self) -> usize {
        match self {
            GateKind::H
            | GateKind::X
            | GateKind::Y
            | GateKind::Z
            | GateKind::Id
            | GateKind::S
            | GateKind::T
            | GateKind::Rx
            | GateKind::Ry
            | GateKind::Rz
            | GateKind::U1
            | GateKind::U2
            | GateKind::U3
            | GateKind::Measure
            | GateKind::Reset => 1,
            GateKind::Cx | GateKind::Cz | GateKind::Swap | GateKind::Cp => 2,
            GateKind::Ccx => 3,
            GateKind::Barrier | GateKind::Conditional => 0,
        }
    }

    /// Number of angle arguments following the qubit indices
    pub fn angle_arity(&self) -> usize {
        match self {
            GateKind::Rx | GateKind::Ry | GateKind::Rz | GateKind::U1 | GateKind::Cp => 1,
            GateKind::U2 => 2,
            GateKind::U3 => 3,
            _ => 0,
        }
    }

    /// Check if the mnemonic takes angles
    pub fn is_parameterized(&self) -> bool {
        self.angle_arity() > 0
    }

    /// Check if the kind may appear inside a conditional
    pub fn is_conditionable(&self) -> bool {
        matches!(
            self,
            GateKind::H
                | GateKind::X
                | GateKind::Y
                | GateKind::Z
                | GateKind::Id
                | GateKind::S
                | GateKind::T
                | GateKind::Rx
                | GateKind::Ry
                | GateKind::Rz
                | GateKind::U1
        )
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

// ============================================================================
// Gate
// ============================================================================

/// Quantum operation with resolved arguments
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================
    /// Hadamard gate
    /// Gantree: H(QubitId) // 하다마드
    H(QubitId),

    /// Pauli-X gate (NOT)
    X(QubitId),

    /// Pauli-Y gate
    Y(QubitId),

    /// Pauli-Z gate
    Z(QubitId),

    /// Identity gate
    Id(QubitId),

    /// S gate (sqrt(Z))
    S(QubitId),

    /// T gate (fourth root of Z)
    T(QubitId),

    // ========================================================================
    // Single-Qubit Rotations
    // ========================================================================
    /// Rotation around X-axis
    /// Gantree: Rx(QubitId, Angle) // X 회전
    Rx(QubitId, Angle),

    /// Rotation around Y-axis
    Ry(QubitId, Angle),

    /// Rotation around Z-axis (also produced by `u1`)
    Rz(QubitId, Angle),

    /// U2(φ, λ)
    U2(QubitId, Angle, Angle),

    /// U3(θ, φ, λ)
    U3(QubitId, Angle, Angle, Angle),

    // ========================================================================
    // Multi-Qubit Gates
    // ========================================================================
    /// Controlled-NOT, control first
    /// Gantree: Cx(QubitId, QubitId) // ctrl, tgt
    Cx(QubitId, QubitId),

    /// Controlled-Z
    Cz(QubitId, QubitId),

    /// SWAP gate
    Swap(QubitId, QubitId),

    /// Controlled phase
    Cp(QubitId, QubitId, Angle),

    /// Toffoli (CCX)
    Ccx(QubitId, QubitId, QubitId),

    // ========================================================================
    // Measurement and Control
    // ========================================================================
    /// Measure a qubit into a classical bit
    Measure(QubitId, ClbitId),

    /// Reset qubit to |0⟩
    Reset(QubitId),

    /// Barrier over the listed qubits (empty means every qubit)
    Barrier(Vec<QubitId>),

    /// Single-qubit gate applied only when register `c` equals the condition value
    Conditional {
        /// Register comparison guarding the gate
        condition: Condition,
        /// Gate applied when the comparison holds
        gate: Box<Gate>,
    },
}

impl Gate {
    // ========================================================================
    // Gate Properties
    // ========================================================================

    /// Get qubits involved in this gate
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::H(q)
            | Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::Id(q)
            | Gate::S(q)
            | Gate::T(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::U2(q, _, _)
            | Gate::U3(q, _, _, _)
            | Gate::Measure(q, _)
            | Gate::Reset(q) => vec![*q],

            Gate::Cx(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) | Gate::Cp(a, b, _) => {
                vec![*a, *b]
            }

            Gate::Ccx(c1, c2, t) => vec![*c1, *c2, *t],

            Gate::Barrier(qs) => qs.clone(),
            Gate::Conditional { gate, .. } => gate.qubits(),
        }
    }

    /// Get classical bits read or written by this gate
    pub fn clbits(&self) -> Vec<ClbitId> {
        match self {
            Gate::Measure(_, c) => vec![*c],
            Gate::Conditional { condition, .. } => vec![condition.index],
            _ => vec![],
        }
    }

    /// Get angle parameters in declaration order
    pub fn params(&self) -> Vec<Angle> {
        match self {
            Gate::Rx(_, a) | Gate::Ry(_, a) | Gate::Rz(_, a) | Gate::Cp(_, _, a) => vec![*a],
            Gate::U2(_, phi, lambda) => vec![*phi, *lambda],
            Gate::U3(_, theta, phi, lambda) => vec![*theta, *phi, *lambda],
            Gate::Conditional { gate, .. } => gate.params(),
            _ => vec![],
        }
    }

    /// Check if gate is single-qubit
    /// Gantree: is_single_qubit(&self) -> bool // 1Q 판별
    pub fn is_single_qubit(&self) -> bool {
        match self {
            Gate::H(_)
            | Gate::X(_)
            | Gate::Y(_)
            | Gate::Z(_)
            | Gate::Id(_)
            | Gate::S(_)
            | Gate::T(_)
            | Gate::Rx(_, _)
            | Gate::Ry(_, _)
            | Gate::Rz(_, _)
            | Gate::U2(_, _, _)
            | Gate::U3(_, _, _, _) => true,
            Gate::Conditional { gate, .. } => gate.is_single_qubit(),
            _ => false,
        }
    }

    /// Check if gate is two-qubit
    pub fn is_two_qubit(&self) -> bool {
        matches!(
            self,
            Gate::Cx(_, _) | Gate::Cz(_, _) | Gate::Swap(_, _) | Gate::Cp(_, _, _)
        )
    }

    /// Check if gate is three-qubit
    pub fn is_three_qubit(&self) -> bool {
        matches!(self, Gate::Ccx(_, _, _))
    }

    /// Check if gate is parameterized
    pub fn is_parameterized(&self) -> bool {
        !self.params().is_empty()
    }

    /// Check if gate is measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure(_, _))
    }

    /// Check if gate is a barrier
    pub fn is_barrier(&self) -> bool {
        matches!(self, Gate::Barrier(_))
    }

    /// Check if gate is classically conditioned
    pub fn is_conditional(&self) -> bool {
        matches!(self, Gate::Conditional { .. })
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::Id(_) => "id",
            Gate::S(_) => "s",
            Gate::T(_) => "t",
            Gate::Rx(_, _) => "rx",
            Gate::Ry(_, _) => "ry",
            Gate::Rz(_, _) => "rz",
            Gate::U2(_, _, _) => "u2",
            Gate::U3(_, _, _, _) => "u3",
            Gate::Cx(_, _) => "cx",
            Gate::Cz(_, _) => "cz",
            Gate::Swap(_, _) => "swap",
            Gate::Cp(_, _, _) => "cp",
            Gate::Ccx(_, _, _) => "ccx",
            Gate::Measure(_, _) => "measure",
            Gate::Reset(_) => "reset",
            Gate::Barrier(_) => "barrier",
            Gate::Conditional { gate, .. } => gate.name(),
        }
    }

    /// Name shown by renderers; conditionals are tagged `<gate>_if_<value>`
    pub fn display_name(&self) -> String {
        match self {
            Gate::Conditional { condition, gate } => {
                format!("{}_if_{}", gate.name(), condition.value)
            }
            other => other.name().to_string(),
        }
    }

    /// Convert to OpenQASM 2.0 string
    /// Gantree: to_qasm(&self) -> String // QASM 변환
    pub fn to_qasm(&self) -> String {
        match self {
            Gate::H(q) => format!("h q[{}];", q),
            Gate::X(q) => format!("x q[{}];", q),
            Gate::Y(q) => format!("y q[{}];", q),
            Gate::Z(q) => format!("z q[{}];", q),
            Gate::Id(q) => format!("id q[{}];", q),
            Gate::S(q) => format!("s q[{}];", q),
            Gate::T(q) => format!("t q[{}];", q),

            Gate::Rx(q, theta) => format!("rx({}) q[{}];", theta, q),
            Gate::Ry(q, theta) => format!("ry({}) q[{}];", theta, q),
            Gate::Rz(q, theta) => format!("rz({}) q[{}];", theta, q),
            Gate::U2(q, phi, lambda) => format!("u2({},{}) q[{}];", phi, lambda, q),
            Gate::U3(q, theta, phi, lambda) => {
                format!("u3({},{},{}) q[{}];", theta, phi, lambda, q)
            }

            Gate::Cx(c, t) => format!("cx q[{}],q[{}];", c, t),
            Gate::Cz(c, t) => format!("cz q[{}],q[{}];", c, t),
            Gate::Swap(a, b) => format!("swap q[{}],q[{}];", a, b),
            Gate::Cp(c, t, lambda) => format!("cp({}) q[{}],q[{}];", lambda, c, t),
            Gate::Ccx(c1, c2, t) => format!("ccx q[{}],q[{}],q[{}];", c1, c2, t),

            Gate::Measure(q, c) => format!("measure q[{}] -> c[{}];", q, c),
            Gate::Reset(q) => format!("reset q[{}];", q),
            Gate::Barrier(qs) => {
                if qs.is_empty() {
                    "barrier q;".to_string()
                } else {
                    let qubits: Vec<String> = qs.iter().map(|q| format!("q[{}]", q)).collect();
                    format!("barrier {};", qubits.join(","))
                }
            }
            Gate::Conditional { condition, gate } => {
                format!("if(c=={}) {}", condition.value, gate.to_qasm())
            }
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_qasm())
    }
}

// ============================================================================
// Tests
// ============================================================================
