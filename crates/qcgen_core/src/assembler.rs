//! Circuit assembly
//!
//! Gantree: L3_Assemble → CircuitAssembler
//!
//! Drives normalize + dispatch over an ordered instruction list.
//!
//! ```text
//! CircuitAssembler::begin(n) ──> AssemblySession (ASSEMBLING)
//!                                  │ apply(raw) ... append-only
//!                                  ▼
//!                                finish() ──> Assembly (DONE)
//! ```
//!
//! A failing instruction is recorded as a [`SkippedInstruction`] and the
//! loop moves on; nothing is rolled back.

use crate::circuit::Circuit;
use crate::constants::assembly::MEASURE_MARKER;
use crate::constants::limits::{clamp_qubits, MAX_ASSEMBLY_QUBITS, MIN_INFERRED_QUBITS};
use crate::dispatch;
use crate::error::SkipReason;
use crate::normalize::{normalize, CanonicalInstruction};

// ============================================================================
// Assembler
// ============================================================================

/// Circuit assembler configuration
/// Gantree: CircuitAssembler // 조립기
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitAssembler {
    max_qubits: usize,
    append_measurements: bool,
}

impl Default for CircuitAssembler {
    fn default() -> Self {
        Self {
            max_qubits: MAX_ASSEMBLY_QUBITS,
            append_measurements: true,
        }
    }
}

impl CircuitAssembler {
    /// Create with the default ceiling of 50 qubits
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the qubit ceiling
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits.max(1);
        self
    }

    /// Enable or disable the terminal measure-all stage
    pub fn with_append_measurements(mut self, append: bool) -> Self {
        self.append_measurements = append;
        self
    }

    /// Qubit ceiling
    pub fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    /// Use the requested count, or infer one, then clamp to `1..=max_qubits`
    /// Gantree: resolve_num_qubits(Option<usize>, &[S]) -> usize // 큐비트 수 결정
    pub fn resolve_num_qubits<S: AsRef<str>>(
        &self,
        requested: Option<usize>,
        instructions: &[S],
    ) -> usize {
        let n = requested.unwrap_or_else(|| infer_num_qubits(instructions));
        clamp_qubits(n, self.max_qubits)
    }

    /// Start a session over a circuit of `num_qubits` qubits and clbits
    pub fn begin(&self, num_qubits: usize) -> AssemblySession {
        let n = clamp_qubits(num_qubits, self.max_qubits);
        log::debug!("assembling circuit with {} qubits", n);
        AssemblySession {
            circuit: Circuit::new(n),
            applied: Vec::new(),
            skipped: Vec::new(),
            next_index: 0,
            saw_measure: false,
            append_measurements: self.append_measurements,
        }
    }

    /// Assemble a whole instruction list in one call
    /// Gantree: assemble(Option<usize>, &[S]) -> Assembly // 회로 조립
    pub fn assemble<S: AsRef<str>>(&self, num_qubits: Option<usize>, instructions: &[S]) -> Assembly {
        let n = self.resolve_num_qubits(num_qubits, instructions);
        let mut session = self.begin(n);
        for raw in instructions {
            // Failures are recorded on the session
            let _ = session.apply(raw.as_ref());
        }
        session.finish()
    }
}

/// `max(2, highest integer token + 1)` over every token after the mnemonic
///
/// The result is not clamped.
pub fn infer_num_qubits<S: AsRef<str>>(instructions: &[S]) -> usize {
    let highest = instructions
        .iter()
        .flat_map(|s| s.as_ref().split_whitespace().skip(1))
        .filter_map(|token| token.parse::<i64>().ok())
        .max()
        .unwrap_or(-1);

    let needed = usize::try_from(highest.saturating_add(1)).unwrap_or(0);
    needed.max(MIN_INFERRED_QUBITS)
}

// ============================================================================
// Session (ASSEMBLING)
// ============================================================================

/// A circuit under construction
/// Gantree: AssemblySession // 조립 중 상태
#[derive(Debug)]
pub struct AssemblySession {
    circuit: Circuit,
    applied: Vec<CanonicalInstruction>,
    skipped: Vec<SkippedInstruction>,
    next_index: usize,
    saw_measure: bool,
    append_measurements: bool,
}

impl AssemblySession {
    /// Normalize and apply one raw instruction
    ///
    /// On failure the instruction is recorded as skipped and the circuit is
    /// left as it was.
    pub fn apply(&mut self, raw: &str) -> Result<(), SkipReason> {
        let index = self.next_index;
        self.next_index += 1;
        if raw.contains(MEASURE_MARKER) {
            self.saw_measure = true;
        }

        let result = normalize(raw).and_then(|canonical| {
            dispatch::apply(&mut self.circuit, &canonical)?;
            Ok(canonical)
        });

        match result {
            Ok(canonical) => {
                log::debug!("applied [{}] {}", index, canonical);
                self.applied.push(canonical);
                Ok(())
            }
            Err(reason) => {
                log::warn!("skipping instruction [{}] '{}': {}", index, raw, reason);
                self.skipped.push(SkippedInstruction {
                    index,
                    raw: raw.to_string(),
                    reason: reason.clone(),
                });
                Err(reason)
            }
        }
    }

    /// Circuit built so far
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Instructions skipped so far
    pub fn skipped(&self) -> &[SkippedInstruction] {
        &self.skipped
    }

    /// Close the session, appending terminal measurements when no raw
    /// instruction mentioned `measure`
    /// Gantree: finish(self) -> Assembly // 조립 완료
    pub fn finish(mut self) -> Assembly {
        let measurements_appended = self.append_measurements && !self.saw_measure;
        if measurements_appended {
            self.circuit.measure_all();
        }

        if !self.skipped.is_empty() {
            log::warn!(
                "assembly finished with {} skipped instruction(s)",
                self.skipped.len()
            );
        }

        Assembly {
            circuit: self.circuit,
            applied: self.applied,
            skipped: self.skipped,
            measurements_appended,
        }
    }
}

// ============================================================================
// Result (DONE)
// ============================================================================

/// One instruction that contributed nothing to the circuit
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedInstruction {
    /// Position in the source sequence
    pub index: usize,
    /// Instruction as received
    pub raw: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Finished circuit plus the record of how it was built
/// Gantree: Assembly // 조립 결과
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Circuit holding every applied instruction
    pub circuit: Circuit,
    /// Canonical form of every applied instruction, in order
    pub applied: Vec<CanonicalInstruction>,
    /// Instructions that contributed nothing, in source order
    pub skipped: Vec<SkippedInstruction>,
    /// Whether the measure-all stage ran
    pub measurements_appended: bool,
}

impl Assembly {
    /// Check if every instruction was applied
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Canonical instructions as strings
    pub fn canonical_strings(&self) -> Vec<String> {
        self.applied.iter().map(|c| c.to_string()).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Gate;

    #[test]
    fn test_infer_num_qubits() {
        assert_eq!(infer_num_qubits(&["h 0", "cx 2 4"]), 5);
        assert_eq!(infer_num_qubits(&["h 0"]), 2);
        assert_eq!(infer_num_qubits::<&str>(&[]), 2);
        assert_eq!(infer_num_qubits(&["barrier", "h x"]), 2);
        // Angle tokens count too
        assert_eq!(infer_num_qubits(&["rx 0 3"]), 4);
    }

    #[test]
    fn test_resolve_clamps() {
        let assembler = CircuitAssembler::new();
        assert_eq!(assembler.resolve_num_qubits(Some(80), &["h 0"]), 50);
        assert_eq!(assembler.resolve_num_qubits(Some(0), &["h 0"]), 1);
        assert_eq!(assembler.resolve_num_qubits(None, &["h 99"]), 50);
        assert_eq!(assembler.resolve_num_qubits(Some(3), &["h 9"]), 3);
    }

    #[test]
    fn test_assemble_appends_measurements() {
        let assembly = CircuitAssembler::new().assemble(Some(2), &["h 0", "cx 0 1"]);
        assert!(assembly.measurements_appended);
        assert_eq!(assembly.circuit.gate_count(), 4);
        assert_eq!(assembly.circuit.gates()[2], Gate::Measure(0, 0));
        assert_eq!(assembly.circuit.gates()[3], Gate::Measure(1, 1));
    }

    #[test]
    fn test_existing_measure_suppresses_append() {
        let assembly = CircuitAssembler::new().assemble(Some(2), &["h 0", "measure 0 0"]);
        assert!(!assembly.measurements_appended);
        assert_eq!(assembly.circuit.count_measurements(), 1);
    }

    #[test]
    fn test_skipped_measure_still_suppresses_append() {
        // Substring check runs on the raw text, even when the instruction fails
        let assembly = CircuitAssembler::new().assemble(Some(2), &["h 0", "measure 0"]);
        assert!(!assembly.measurements_appended);
        assert_eq!(assembly.skipped.len(), 1);
        assert_eq!(assembly.circuit.gate_count(), 1);
    }

    #[test]
    fn test_skip_report() {
        let assembly = CircuitAssembler::new().assemble(Some(2), &["h 0", "foo 1", "cx 0 7", "x 1"]);
        assert_eq!(assembly.applied.len(), 2);
        assert_eq!(assembly.skipped.len(), 2);
        assert_eq!(assembly.skipped[0].index, 1);
        assert_eq!(assembly.skipped[0].reason, SkipReason::UnknownGate("foo".into()));
        assert_eq!(assembly.skipped[1].index, 2);
        assert_eq!(assembly.skipped[1].raw, "cx 0 7");
        assert!(matches!(assembly.skipped[1].reason, SkipReason::Circuit(_)));
        assert_eq!(assembly.circuit.gate_count(), 4);
    }

    #[test]
    fn test_session_is_append_only() {
        let mut session = CircuitAssembler::new().begin(2);
        assert!(session.apply("h 0").is_ok());
        assert!(session.apply("h 9").is_err());
        assert_eq!(session.circuit().gate_count(), 1);
        assert_eq!(session.skipped().len(), 1);
        let assembly = session.finish();
        assert_eq!(assembly.circuit.gate_count(), 3);
    }

    #[test]
    fn test_measurements_can_be_disabled() {
        let assembly = CircuitAssembler::new()
            .with_append_measurements(false)
            .assemble(Some(2), &["h 0"]);
        assert!(!assembly.measurements_appended);
        assert_eq!(assembly.circuit.gate_count(), 1);
    }
}
