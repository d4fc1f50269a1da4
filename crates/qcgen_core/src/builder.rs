//! Instruction builder for QCGen
//!
//! Gantree: L1_Circuit → InstructionBuilder
//!
//! Fluent builder that writes canonical instruction strings, so generated
//! sequences go through the same assembler as suggested or uploaded ones.

use crate::assembler::{Assembly, CircuitAssembler};
use crate::normalize::format_angle;
use crate::types::{Angle, Bitstring, ClbitId, QubitId};

/// Fluent instruction builder (consuming self pattern)
/// Gantree: InstructionBuilder // 빌더 패턴
#[derive(Debug, Clone, Default)]
pub struct InstructionBuilder {
    instructions: Vec<String>,
}

impl InstructionBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create an empty builder
    /// Gantree: new() -> Self // 생성자
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, instruction: String) -> Self {
        self.instructions.push(instruction);
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Add Hadamard gate
    /// Gantree: h(self, q) -> Self // H 추가
    pub fn h(self, qubit: QubitId) -> Self {
        self.push(format!("h {}", qubit))
    }

    /// Add Pauli-X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.push(format!("x {}", qubit))
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.push(format!("y {}", qubit))
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.push(format!("z {}", qubit))
    }

    /// Add S gate
    pub fn s(self, qubit: QubitId) -> Self {
        self.push(format!("s {}", qubit))
    }

    /// Add T gate
    pub fn t(self, qubit: QubitId) -> Self {
        self.push(format!("t {}", qubit))
    }

    /// Add Rx rotation
    /// Gantree: rx(self, q, a) -> Self // Rx 추가
    pub fn rx(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(format!("rx {} {}", qubit, format_angle(angle)))
    }

    /// Add Ry rotation
    pub fn ry(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(format!("ry {} {}", qubit, format_angle(angle)))
    }

    /// Add Rz rotation
    pub fn rz(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(format!("rz {} {}", qubit, format_angle(angle)))
    }

    // ========================================================================
    // Multi-Qubit Gates
    // ========================================================================

    /// Add CNOT gate
    /// Gantree: cx(self, c, t) -> Self // CX 추가
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.push(format!("cx {} {}", control, target))
    }

    /// Add CZ gate
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.push(format!("cz {} {}", control, target))
    }

    /// Add SWAP gate
    pub fn swap(self, a: QubitId, b: QubitId) -> Self {
        self.push(format!("swap {} {}", a, b))
    }

    /// Add controlled phase
    pub fn cp(self, control: QubitId, target: QubitId, angle: Angle) -> Self {
        self.push(format!("cp {} {} {}", control, target, format_angle(angle)))
    }

    /// Add Toffoli gate
    pub fn ccx(self, c1: QubitId, c2: QubitId, target: QubitId) -> Self {
        self.push(format!("ccx {} {} {}", c1, c2, target))
    }

    // ========================================================================
    // Measurement and Control
    // ========================================================================

    /// Add measurement
    pub fn measure(self, qubit: QubitId, clbit: ClbitId) -> Self {
        self.push(format!("measure {} {}", qubit, clbit))
    }

    /// Add full barrier
    pub fn barrier(self) -> Self {
        self.push("barrier".to_string())
    }

    /// Add reset
    pub fn reset(self, qubit: QubitId) -> Self {
        self.push(format!("reset {}", qubit))
    }

    /// Add `<gate> <qubit>` conditioned on `c[index] == value`
    pub fn conditional(self, index: ClbitId, value: u64, gate: &str, qubit: QubitId) -> Self {
        self.push(format!("if c {} {} {} {}", index, value, gate, qubit))
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Hadamard on qubits `0..n`
    pub fn h_layer(self, n: usize) -> Self {
        (0..n).fold(self, |b, q| b.h(q))
    }

    /// Pauli-X on qubits `0..n`
    pub fn x_layer(self, n: usize) -> Self {
        (0..n).fold(self, |b, q| b.x(q))
    }

    /// CNOT chain `0→1→...→n-1`
    /// Gantree: cx_chain(self, n) -> Self // CX 체인
    pub fn cx_chain(self, n: usize) -> Self {
        (1..n).fold(self, |b, q| b.cx(q - 1, q))
    }

    /// X on every qubit whose bit is 1 (leftmost bit is qubit 0)
    pub fn x_mask(self, bits: &Bitstring) -> Self {
        bits.iter()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .fold(self, |b, (q, _)| b.x(q))
    }

    /// Measure qubits `0..n` into the same-indexed clbits
    pub fn measure_range(self, n: usize) -> Self {
        (0..n).fold(self, |b, q| b.measure(q, q))
    }

    /// Append raw instructions verbatim
    pub fn raw<S: Into<String>>(mut self, instructions: impl IntoIterator<Item = S>) -> Self {
        self.instructions
            .extend(instructions.into_iter().map(Into::into));
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Number of instructions so far
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Finish the instruction list
    /// Gantree: build(self) -> Vec<String> // 빌드
    pub fn build(self) -> Vec<String> {
        self.instructions
    }

    /// Assemble the instructions with the default assembler
    pub fn assemble(self, num_qubits: usize) -> Assembly {
        CircuitAssembler::new().assemble(Some(num_qubits), &self.instructions)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Gate;
    use std::f64::consts::PI;

    #[test]
    fn test_builder_strings() {
        let gates = InstructionBuilder::new()
            .h(0)
            .cx(0, 1)
            .rx(1, PI / 2.0)
            .conditional(0, 1, "x", 2)
            .barrier()
            .build();
        assert_eq!(
            gates,
            vec![
                "h 0",
                "cx 0 1",
                "rx 1 1.5707963267948966",
                "if c 0 1 x 2",
                "barrier"
            ]
        );
    }

    #[test]
    fn test_layers() {
        let gates = InstructionBuilder::new().h_layer(3).cx_chain(3).build();
        assert_eq!(gates, vec!["h 0", "h 1", "h 2", "cx 0 1", "cx 1 2"]);

        let flips = InstructionBuilder::new().x_layer(2).build();
        assert_eq!(flips, vec!["x 0", "x 1"]);
    }

    #[test]
    fn test_x_mask() {
        let bits = Bitstring::parse("101").unwrap();
        let gates = InstructionBuilder::new().x_mask(&bits).build();
        assert_eq!(gates, vec!["x 0", "x 2"]);
    }

    #[test]
    fn test_builder_assembles_cleanly() {
        let assembly = InstructionBuilder::new()
            .h(0)
            .cx(0, 1)
            .cp(0, 1, 0.5)
            .measure_range(2)
            .assemble(2);
        assert!(assembly.is_clean());
        assert!(!assembly.measurements_appended);
        assert_eq!(assembly.circuit.gates()[2], Gate::Cp(0, 1, 0.5));
    }
}
