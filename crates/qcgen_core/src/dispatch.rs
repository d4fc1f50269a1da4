//! Gate dispatch
//!
//! Gantree: L3_Assemble → GateDispatch
//!
//! Turns a [`CanonicalInstruction`] into a [`Gate`] by exhaustive match on
//! [`GateKind`] and appends it to a circuit. Extra trailing arguments are
//! ignored.

use crate::circuit::Circuit;
use crate::error::SkipReason;
use crate::gate::{Gate, GateKind};
use crate::normalize::CanonicalInstruction;
use crate::types::{Angle, Condition, QubitId};

/// Apply one canonical instruction to the circuit
/// Gantree: apply(&mut Circuit, &CanonicalInstruction) -> Result<Gate> // 적용
pub fn apply(circuit: &mut Circuit, instruction: &CanonicalInstruction) -> Result<Gate, SkipReason> {
    let gate = build_gate(instruction)?;
    circuit.add_gate(gate.clone())?;
    Ok(gate)
}

/// Resolve the arguments of a canonical instruction into a gate
pub fn build_gate(instruction: &CanonicalInstruction) -> Result<Gate, SkipReason> {
    let kind = instruction.kind();
    let args = Args {
        gate: instruction.mnemonic(),
        tokens: instruction.args(),
    };

    let gate = match kind {
        GateKind::H => Gate::H(args.index(0, 1)?),
        GateKind::X => Gate::X(args.index(0, 1)?),
        GateKind::Y => Gate::Y(args.index(0, 1)?),
        GateKind::Z => Gate::Z(args.index(0, 1)?),
        GateKind::Id => Gate::Id(args.index(0, 1)?),
        GateKind::S => Gate::S(args.index(0, 1)?),
        GateKind::T => Gate::T(args.index(0, 1)?),

        GateKind::Rx => Gate::Rx(args.index(0, 2)?, args.angle(1, 2)?),
        GateKind::Ry => Gate::Ry(args.index(0, 2)?, args.angle(1, 2)?),
        GateKind::Rz | GateKind::U1 => Gate::Rz(args.index(0, 2)?, args.angle(1, 2)?),
        GateKind::U2 => Gate::U2(args.index(0, 3)?, args.angle(1, 3)?, args.angle(2, 3)?),
        GateKind::U3 => Gate::U3(
            args.index(0, 4)?,
            args.angle(1, 4)?,
            args.angle(2, 4)?,
            args.angle(3, 4)?,
        ),

        GateKind::Cx => Gate::Cx(args.index(0, 2)?, args.index(1, 2)?),
        GateKind::Cz => Gate::Cz(args.index(0, 2)?, args.index(1, 2)?),
        GateKind::Swap => Gate::Swap(args.index(0, 2)?, args.index(1, 2)?),
        GateKind::Cp => Gate::Cp(args.index(0, 3)?, args.index(1, 3)?, args.angle(2, 3)?),
        GateKind::Ccx => Gate::Ccx(args.index(0, 3)?, args.index(1, 3)?, args.index(2, 3)?),

        GateKind::Measure => Gate::Measure(args.index(0, 2)?, args.index(1, 2)?),
        GateKind::Reset => Gate::Reset(args.index(0, 1)?),
        GateKind::Barrier => Gate::Barrier(
            (0..args.tokens.len())
                .map(|i| args.index(i, 0))
                .collect::<Result<Vec<_>, _>>()?,
        ),

        GateKind::Conditional => build_conditional(&args)?,
    };

    Ok(gate)
}

/// `<reg> <index> <value> <gate> <qubit> [angle]`
///
/// Only register `c` exists, so the register token is read but not used.
fn build_conditional(args: &Args<'_>) -> Result<Gate, SkipReason> {
    args.require(5)?;

    let index = args.index(1, 5)?;
    let value: u64 = args.tokens[2].parse().map_err(|_| {
        SkipReason::InvalidConditional(format!("comparison value '{}'", args.tokens[2]))
    })?;

    let inner_name = args.tokens[3].to_ascii_lowercase();
    match GateKind::from_mnemonic(&inner_name) {
        Some(kind) if kind.is_conditionable() => {}
        _ => return Err(SkipReason::UnsupportedConditionalGate(inner_name)),
    }

    let inner = CanonicalInstruction::from_tokens(args.tokens[3..].to_vec())?;
    let gate = build_gate(&inner)?;

    Ok(Gate::Conditional {
        condition: Condition::new(index, value),
        gate: Box::new(gate),
    })
}

// ============================================================================
// Argument Access
// ============================================================================

struct Args<'a> {
    gate: &'a str,
    tokens: &'a [String],
}

impl Args<'_> {
    fn require(&self, expected: usize) -> Result<(), SkipReason> {
        if self.tokens.len() < expected {
            return Err(SkipReason::InsufficientArguments {
                gate: self.gate.to_string(),
                expected,
                found: self.tokens.len(),
            });
        }
        Ok(())
    }

    /// Index argument at `pos`, requiring `expected` arguments overall
    fn index(&self, pos: usize, expected: usize) -> Result<QubitId, SkipReason> {
        self.require(expected.max(pos + 1))?;
        let token = &self.tokens[pos];
        token
            .parse::<QubitId>()
            .map_err(|_| SkipReason::InvalidIndex(token.clone()))
    }

    fn angle(&self, pos: usize, expected: usize) -> Result<Angle, SkipReason> {
        self.require(expected.max(pos + 1))?;
        let token = &self.tokens[pos];
        token
            .parse::<Angle>()
            .map_err(|_| SkipReason::InvalidAngle(token.clone()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QcgenError;
    use crate::normalize::normalize;

    fn gate(raw: &str) -> Result<Gate, SkipReason> {
        build_gate(&normalize(raw)?)
    }

    #[test]
    fn test_single_and_multi_qubit() {
        assert_eq!(gate("h 0"), Ok(Gate::H(0)));
        assert_eq!(gate("id 1"), Ok(Gate::Id(1)));
        assert_eq!(gate("cx 0 1"), Ok(Gate::Cx(0, 1)));
        assert_eq!(gate("ccx 0 1 2"), Ok(Gate::Ccx(0, 1, 2)));
        assert_eq!(gate("swap 2 0"), Ok(Gate::Swap(2, 0)));
    }

    #[test]
    fn test_parameterized() {
        assert_eq!(gate("rx 0 0.5"), Ok(Gate::Rx(0, 0.5)));
        assert_eq!(gate("u1 1 0.25"), Ok(Gate::Rz(1, 0.25)));
        assert_eq!(gate("u2 0 0.1 0.2"), Ok(Gate::U2(0, 0.1, 0.2)));
        assert_eq!(gate("u3 0 0.1 0.2 0.3"), Ok(Gate::U3(0, 0.1, 0.2, 0.3)));
        assert_eq!(gate("cp 0 1 0.5"), Ok(Gate::Cp(0, 1, 0.5)));
    }

    #[test]
    fn test_measure_reset_barrier() {
        assert_eq!(gate("measure 1 0"), Ok(Gate::Measure(1, 0)));
        assert_eq!(gate("reset 2"), Ok(Gate::Reset(2)));
        assert_eq!(gate("barrier"), Ok(Gate::Barrier(vec![])));
        assert_eq!(gate("barrier 0 2"), Ok(Gate::Barrier(vec![0, 2])));
    }

    #[test]
    fn test_extra_arguments_ignored() {
        assert_eq!(gate("h 0 7 9"), Ok(Gate::H(0)));
    }

    #[test]
    fn test_insufficient_arguments() {
        assert_eq!(
            gate("cx 0"),
            Err(SkipReason::InsufficientArguments {
                gate: "cx".into(),
                expected: 2,
                found: 1
            })
        );
        assert!(matches!(
            gate("rx 0"),
            Err(SkipReason::InsufficientArguments { expected: 2, .. })
        ));
        assert!(matches!(
            gate("measure 0"),
            Err(SkipReason::InsufficientArguments { .. })
        ));
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(gate("h -1"), Err(SkipReason::InvalidIndex("-1".into())));
        assert_eq!(gate("rx 0 pi/2"), Err(SkipReason::InvalidAngle("pi/2".into())));
    }

    #[test]
    fn test_conditional() {
        let expected = Gate::Conditional {
            condition: Condition::new(0, 1),
            gate: Box::new(Gate::X(2)),
        };
        assert_eq!(gate("if c 0 1 x 2"), Ok(expected.clone()));
        assert_eq!(gate("if(c[0]==1) x 2"), Ok(expected.clone()));
        assert_eq!(gate("conditional: c 0 1 x 2"), Ok(expected));

        let rotated = gate("if c 1 3 rx 0 0.5").unwrap();
        assert_eq!(rotated.display_name(), "rx_if_3");
        assert_eq!(rotated.params(), vec![0.5]);
    }

    #[test]
    fn test_conditional_rejections() {
        assert_eq!(
            gate("if c 0 1 cx 0"),
            Err(SkipReason::UnsupportedConditionalGate("cx".into()))
        );
        assert!(matches!(
            gate("if c 0 1 x"),
            Err(SkipReason::InsufficientArguments { .. })
        ));
        assert!(matches!(
            gate("if c 0 1 rx 0"),
            Err(SkipReason::InsufficientArguments { .. })
        ));
        assert!(matches!(
            gate("if c 0 one x 0"),
            Err(SkipReason::InvalidConditional(_))
        ));
    }

    #[test]
    fn test_apply_range_checked() {
        let mut circuit = Circuit::new(2);
        assert!(apply(&mut circuit, &normalize("h 1").unwrap()).is_ok());
        assert_eq!(
            apply(&mut circuit, &normalize("h 5").unwrap()),
            Err(SkipReason::Circuit(QcgenError::QubitOutOfRange {
                qubit: 5,
                num_qubits: 2
            }))
        );
        assert_eq!(circuit.gate_count(), 1);
    }
}
