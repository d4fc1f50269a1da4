//! Quantum circuit structure for QCGen
//!
//! Gantree: L1_Circuit → Circuit
//!
//! Append-only operation list over one quantum register `q` and one
//! classical register `c`. Every index is checked on insertion.

use crate::error::{QcgenError, QcgenResult};
use crate::gate::Gate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operations applied so far, with register sizes
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Size of register `q`
    /// Gantree: num_qubits: usize // 큐비트 수
    num_qubits: usize,

    /// Size of register `c`
    num_clbits: usize,

    /// Operations in insertion order
    /// Gantree: gates: Vec<Gate> // 연산 목록
    gates: Vec<Gate>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Empty circuit; `c` gets one bit per qubit
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            num_clbits: num_qubits,
            gates: Vec::new(),
        }
    }

    // ========================================================================
    // Appending
    // ========================================================================

    /// Append one operation
    ///
    /// Rejects out-of-range qubits or clbits, repeated qubits in one
    /// multi-qubit gate, and non-finite angles. A rejected gate leaves the
    /// circuit unchanged.
    /// Gantree: add_gate(&mut, Gate) -> Result // 연산 추가
    pub fn add_gate(&mut self, gate: Gate) -> QcgenResult<()> {
        self.validate_gate(&gate)?;
        self.gates.push(gate);
        Ok(())
    }

    /// Append `measure i i` for every qubit that has a matching clbit
    pub fn measure_all(&mut self) {
        for q in 0..self.num_qubits.min(self.num_clbits) {
            self.gates.push(Gate::Measure(q, q));
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Size of register `q`
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Size of register `c`
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Operations in order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// No operation applied yet
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Number of operations
    /// Gantree: gate_count(&self) -> usize // 연산 수
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Layers on the busiest qubit; barriers align qubits without adding a layer
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits];

        for gate in &self.gates {
            let touched = match gate {
                Gate::Barrier(qs) if qs.is_empty() => (0..self.num_qubits).collect(),
                other => other.qubits(),
            };
            let front = touched
                .iter()
                .filter_map(|&q| layer.get(q))
                .max()
                .copied()
                .unwrap_or(0);
            let next = if gate.is_barrier() { front } else { front + 1 };

            for &q in &touched {
                if let Some(slot) = layer.get_mut(q) {
                    *slot = next;
                }
            }
        }

        layer.into_iter().max().unwrap_or(0)
    }

    /// Measurements, explicit or appended
    pub fn count_measurements(&self) -> usize {
        self.gates.iter().filter(|g| g.is_measurement()).count()
    }

    /// Operations guarded by `if(c==v)`
    pub fn count_conditional(&self) -> usize {
        self.gates.iter().filter(|g| g.is_conditional()).count()
    }

    /// Operations touching two or three qubits
    pub fn count_entangling(&self) -> usize {
        self.gates
            .iter()
            .filter(|g| g.is_two_qubit() || g.is_three_qubit())
            .count()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn validate_gate(&self, gate: &Gate) -> QcgenResult<()> {
        let qubits = gate.qubits();
        for (i, &qubit) in qubits.iter().enumerate() {
            if qubit >= self.num_qubits {
                return Err(QcgenError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
            if qubits[..i].contains(&qubit) {
                return Err(QcgenError::DuplicateQubit(qubit));
            }
        }

        for clbit in gate.clbits() {
            if clbit >= self.num_clbits {
                return Err(QcgenError::ClbitOutOfRange {
                    clbit,
                    num_clbits: self.num_clbits,
                });
            }
        }

        if let Some(&bad) = gate.params().iter().find(|a| !a.is_finite()) {
            return Err(QcgenError::InvalidAngle(bad));
        }

        Ok(())
    }

    // ========================================================================
    // OpenQASM
    // ========================================================================

    /// OpenQASM 2.0 program: header, `qreg q`, `creg c`, one line per operation
    /// Gantree: to_qasm(&self) -> String // QASM2 출력
    pub fn to_qasm(&self) -> String {
        let mut lines = vec![
            "OPENQASM 2.0;".to_string(),
            "include \"qelib1.inc\";".to_string(),
            String::new(),
            format!("qreg q[{}];", self.num_qubits),
            format!("creg c[{}];", self.num_clbits),
            String::new(),
        ];

        lines.extend(self.gates.iter().map(Gate::to_qasm));
        lines.join("\n")
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "q[{}] c[{}]: {} op(s), depth {}, {} entangling, {} measure, {} conditional",
            self.num_qubits,
            self.num_clbits,
            self.gates.len(),
            self.depth(),
            self.count_entangling(),
            self.count_measurements(),
            self.count_conditional()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Condition;

    fn bell() -> Circuit {
        let mut circuit = Circuit::new(2);
        circuit.add_gate(Gate::H(0)).unwrap();
        circuit.add_gate(Gate::Cx(0, 1)).unwrap();
        circuit
    }

    #[test]
    fn test_registers_match() {
        let circuit = Circuit::new(4);
        assert_eq!((circuit.num_qubits(), circuit.num_clbits()), (4, 4));
        assert!(circuit.is_empty());
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_rejected_gate_leaves_circuit_untouched() {
        let mut circuit = bell();
        assert!(matches!(
            circuit.add_gate(Gate::Ry(7, 0.5)),
            Err(QcgenError::QubitOutOfRange { qubit: 7, num_qubits: 2 })
        ));
        assert!(matches!(
            circuit.add_gate(Gate::Measure(1, 2)),
            Err(QcgenError::ClbitOutOfRange { clbit: 2, .. })
        ));
        assert_eq!(
            circuit.add_gate(Gate::Swap(0, 0)),
            Err(QcgenError::DuplicateQubit(0))
        );
        assert!(circuit.add_gate(Gate::Rz(1, f64::INFINITY)).is_err());
        assert_eq!(circuit.gate_count(), 2);
    }

    #[test]
    fn test_condition_index_checked() {
        let mut circuit = Circuit::new(2);
        let gate = Gate::Conditional {
            condition: Condition::new(4, 1),
            gate: Box::new(Gate::X(0)),
        };
        assert!(circuit.add_gate(gate).is_err());
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_measure_all_pairs_indices() {
        let mut circuit = Circuit::new(3);
        circuit.add_gate(Gate::X(1)).unwrap();
        circuit.measure_all();
        assert_eq!(
            circuit.gates()[1..],
            [Gate::Measure(0, 0), Gate::Measure(1, 1), Gate::Measure(2, 2)]
        );
    }

    #[test]
    fn test_depth_and_barriers() {
        let mut circuit = bell();
        circuit.add_gate(Gate::Barrier(vec![])).unwrap();
        circuit.add_gate(Gate::X(0)).unwrap();
        assert_eq!(circuit.depth(), 3);

        let mut parallel = Circuit::new(3);
        for q in 0..3 {
            parallel.add_gate(Gate::H(q)).unwrap();
        }
        assert_eq!(parallel.depth(), 1);
    }

    #[test]
    fn test_counts_and_display() {
        let mut circuit = bell();
        circuit.add_gate(Gate::Ccx(0, 1, 2)).unwrap_err();
        circuit.measure_all();
        assert_eq!(circuit.count_entangling(), 1);
        assert_eq!(circuit.count_measurements(), 2);
        assert_eq!(
            circuit.to_string(),
            "q[2] c[2]: 4 op(s), depth 3, 1 entangling, 2 measure, 0 conditional"
        );
    }

    #[test]
    fn test_qasm_program() {
        let qasm = bell().to_qasm();
        let lines: Vec<&str> = qasm.lines().collect();
        assert_eq!(lines[0], "OPENQASM 2.0;");
        assert!(lines.contains(&"qreg q[2];"));
        assert!(lines.contains(&"creg c[2];"));
        assert_eq!(lines[lines.len() - 2..], ["h q[0];", "cx q[0],q[1];"]);
    }
}
