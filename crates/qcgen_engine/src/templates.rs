//! Built-in instruction generators
//!
//! Gantree: L6_Engine → Templates
//!
//! Deterministic instruction lists used when no suggester is configured, the
//! suggester fails, or `prefer_templates` is set. Every generator writes
//! canonical strings through [`InstructionBuilder`] so the output takes the
//! same assembly path as suggested instructions.

use qcgen_core::{Bitstring, CircuitType, InstructionBuilder, IntentParams};

/// Families that have a dedicated generator
pub const TEMPLATE_FAMILIES: &[CircuitType] = &[
    CircuitType::BellState,
    CircuitType::GhzState,
    CircuitType::Teleportation,
    CircuitType::Qft,
    CircuitType::DeutschJozsa,
    CircuitType::BernsteinVazirani,
    CircuitType::SuperdenseCoding,
    CircuitType::Grovers,
];

/// Check if `circuit_type` has a dedicated generator
///
/// A listed family can still decline a size it does not cover; Grover's
/// search only has a generator for two and three qubits.
pub fn has_template(circuit_type: CircuitType) -> bool {
    TEMPLATE_FAMILIES.contains(&circuit_type)
}

/// Dedicated generator output for `circuit_type` over `n` qubits
/// Gantree: generate(CircuitType, &IntentParams, n) -> Option<Vec<String>> // 템플릿 생성
pub fn generate(circuit_type: CircuitType, params: &IntentParams, n: usize) -> Option<Vec<String>> {
    let instructions = match circuit_type {
        CircuitType::BellState => bell(),
        CircuitType::GhzState => ghz(n),
        CircuitType::Teleportation => teleportation(),
        CircuitType::Qft => qft3(),
        CircuitType::DeutschJozsa => deutsch_jozsa(n, params.oracle_type.as_deref()),
        CircuitType::BernsteinVazirani => bernstein_vazirani(n, params.secret_string.as_deref()),
        CircuitType::SuperdenseCoding => superdense(params.secret_string.as_deref()),
        CircuitType::Grovers => grovers(n, params.marked_state.as_deref())?,
        _ => return None,
    };
    Some(instructions)
}

/// `h 0` followed by a CNOT chain over `min(3, n)` qubits
/// Gantree: skeleton(n) -> Vec<String> // 최소 얽힘 골격
pub fn skeleton(n: usize) -> Vec<String> {
    InstructionBuilder::new().h(0).cx_chain(n.min(3)).build()
}

// ============================================================================
// Generators
// ============================================================================

/// (|00> + |11>)/sqrt(2)
pub fn bell() -> Vec<String> {
    InstructionBuilder::new().h(0).cx(0, 1).build()
}

/// Hadamard on qubit 0 then a CNOT chain over `n` qubits
pub fn ghz(n: usize) -> Vec<String> {
    InstructionBuilder::new().h(0).cx_chain(n.max(2)).build()
}

/// Three-qubit teleportation of qubit 0 onto qubit 2
///
/// Corrections are written as controlled gates from the measured qubits.
pub fn teleportation() -> Vec<String> {
    InstructionBuilder::new()
        .h(1)
        .cx(1, 2)
        .cx(0, 1)
        .h(0)
        .measure(0, 0)
        .measure(1, 1)
        .cx(1, 2)
        .cz(0, 2)
        .build()
}

/// Three-qubit QFT skeleton with the final qubit reversal
pub fn qft3() -> Vec<String> {
    InstructionBuilder::new()
        .h(0)
        .cp(0, 1, 1.5708)
        .cp(0, 2, 0.7854)
        .h(1)
        .cp(1, 2, 1.5708)
        .h(2)
        .swap(0, 2)
        .build()
}

/// Deutsch-Jozsa over `n - 1` inputs and one ancilla (the last qubit)
///
/// `constant` (or `constant_0`) leaves the ancilla alone, `constant_1` flips
/// it, anything else builds the balanced parity oracle.
pub fn deutsch_jozsa(n: usize, oracle: Option<&str>) -> Vec<String> {
    let n = n.max(2);
    let ancilla = n - 1;
    let oracle = oracle.map(|o| o.trim().to_ascii_lowercase());

    let prepared = InstructionBuilder::new().x(ancilla).h_layer(n);
    let with_oracle = match oracle.as_deref() {
        Some("constant") | Some("constant_0") => prepared,
        Some("constant_1") => prepared.x(ancilla),
        _ => (0..ancilla).fold(prepared, |b, q| b.cx(q, ancilla)),
    };

    with_oracle.h_layer(ancilla).measure_range(ancilla).build()
}

/// Bernstein-Vazirani recovering `secret` on `n - 1` inputs
///
/// A missing or malformed secret falls back to the alternating `101...`
/// pattern.
pub fn bernstein_vazirani(n: usize, secret: Option<&str>) -> Vec<String> {
    let n = n.max(2);
    let ancilla = n - 1;
    let secret = secret
        .and_then(|s| match Bitstring::parse(s) {
            Ok(bits) if !bits.is_empty() => Some(bits),
            Ok(_) => None,
            Err(e) => {
                log::warn!("{}, using the alternating secret", e);
                None
            }
        })
        .unwrap_or_else(|| Bitstring::alternating(ancilla))
        .fit(ancilla);

    let prepared = InstructionBuilder::new().x(ancilla).h_layer(n);
    let with_oracle = secret
        .iter()
        .enumerate()
        .filter(|(_, bit)| *bit)
        .fold(prepared, |b, (q, _)| b.cx(q, ancilla));

    with_oracle.h_layer(ancilla).measure_range(ancilla).build()
}

/// Superdense coding of a two-bit message (default `11`)
pub fn superdense(message: Option<&str>) -> Vec<String> {
    let bits = message
        .and_then(|m| Bitstring::parse(m).ok())
        .filter(|b| b.len() == 2)
        .unwrap_or_else(|| Bitstring::new(vec![true, true]));

    let mut builder = InstructionBuilder::new().h(0).cx(0, 1);
    if bits.get(1) == Some(true) {
        builder = builder.x(0);
    }
    if bits.get(0) == Some(true) {
        builder = builder.z(0);
    }
    builder.cx(0, 1).h(0).measure_range(2).build()
}

/// Grover search for `marked` over two or three qubits (default all ones)
///
/// Runs `floor(pi/4 * sqrt(2^n))` rounds of oracle plus diffusion, then
/// measures. Larger registers need a multi-controlled Z wider than `ccx`
/// and return `None`.
pub fn grovers(n: usize, marked: Option<&str>) -> Option<Vec<String>> {
    let n = n.max(2);
    if n > 3 {
        log::debug!("no grover generator for {} qubits", n);
        return None;
    }

    let marked = marked
        .and_then(|m| match Bitstring::parse(m) {
            Ok(bits) if !bits.is_empty() => Some(bits),
            Ok(_) => None,
            Err(e) => {
                log::warn!("{}, marking the all-ones state", e);
                None
            }
        })
        .unwrap_or_else(|| Bitstring::new(vec![true; n]))
        .fit(n);
    let zeros = marked.complement();
    let rounds = (std::f64::consts::FRAC_PI_4 * ((1usize << n) as f64).sqrt()).floor() as usize;

    let builder = InstructionBuilder::new().h_layer(n);
    let builder = (0..rounds).fold(builder, |b, _| {
        let oracle = controlled_z(b.barrier().x_mask(&zeros), n).x_mask(&zeros);
        let flipped = oracle.barrier().h_layer(n).x_layer(n);
        controlled_z(flipped, n).x_layer(n).h_layer(n).barrier()
    });

    Some(builder.measure_range(n).build())
}

/// Z controlled on every other qubit, targeting the last one
fn controlled_z(builder: InstructionBuilder, n: usize) -> InstructionBuilder {
    if n == 2 {
        builder.cz(0, 1)
    } else {
        builder.h(2).ccx(0, 1, 2).h(2)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qcgen_core::{CircuitAssembler, Gate};

    #[test]
    fn test_bell() {
        assert_eq!(bell(), vec!["h 0", "cx 0 1"]);
    }

    #[test]
    fn test_ghz_chain() {
        assert_eq!(ghz(4), vec!["h 0", "cx 0 1", "cx 1 2", "cx 2 3"]);
    }

    #[test]
    fn test_skeleton_caps_chain() {
        assert_eq!(skeleton(6), vec!["h 0", "cx 0 1", "cx 1 2"]);
        assert_eq!(skeleton(2), vec!["h 0", "cx 0 1"]);
    }

    #[test]
    fn test_teleportation_measures_itself() {
        let instructions = teleportation();
        assert_eq!(instructions.len(), 8);

        let assembly = CircuitAssembler::new().assemble(Some(3), &instructions);
        assert!(assembly.is_clean());
        assert!(!assembly.measurements_appended);
        assert_eq!(assembly.circuit.count_measurements(), 2);
    }

    #[test]
    fn test_qft3() {
        assert_eq!(
            qft3(),
            vec![
                "h 0",
                "cp 0 1 1.5708",
                "cp 0 2 0.7854",
                "h 1",
                "cp 1 2 1.5708",
                "h 2",
                "swap 0 2"
            ]
        );
    }

    #[test]
    fn test_deutsch_jozsa_oracles() {
        let balanced = deutsch_jozsa(3, None);
        assert!(balanced.contains(&"cx 0 2".to_string()));
        assert!(balanced.contains(&"cx 1 2".to_string()));
        assert_eq!(balanced.last().map(String::as_str), Some("measure 1 1"));

        let constant = deutsch_jozsa(3, Some("constant"));
        assert!(!constant.iter().any(|i| i.starts_with("cx")));
    }

    #[test]
    fn test_bernstein_vazirani_secret() {
        let instructions = bernstein_vazirani(4, Some("011"));
        let oracle: Vec<&String> = instructions.iter().filter(|i| i.starts_with("cx")).collect();
        assert_eq!(oracle, vec!["cx 1 3", "cx 2 3"]);

        // Default secret is 101 on three inputs
        let default = bernstein_vazirani(4, Some("abc"));
        let oracle: Vec<&String> = default.iter().filter(|i| i.starts_with("cx")).collect();
        assert_eq!(oracle, vec!["cx 0 3", "cx 2 3"]);
    }

    #[test]
    fn test_superdense_message() {
        let assembly = CircuitAssembler::new().assemble(Some(2), &superdense(Some("10")));
        assert!(assembly.is_clean());
        assert!(assembly.circuit.gates().contains(&Gate::Z(0)));
        assert!(!assembly.circuit.gates().contains(&Gate::X(0)));
    }

    #[test]
    fn test_generate_dispatch() {
        let params = IntentParams::new();
        assert!(generate(CircuitType::BellState, &params, 2).is_some());
        assert!(generate(CircuitType::Grovers, &params, 3).is_some());
        assert!(generate(CircuitType::Grovers, &params, 5).is_none());
        assert!(generate(CircuitType::Simon, &params, 6).is_none());
        assert!(has_template(CircuitType::Qft));
        assert!(!has_template(CircuitType::Custom));
    }


    #[test]
    fn test_grovers_marks_requested_state() {
        let instructions = grovers(3, Some("101")).unwrap();
        // Two rounds on three qubits, each flipping the 0 bit around the oracle
        assert_eq!(instructions.iter().filter(|i| *i == "ccx 0 1 2").count(), 4);
        assert_eq!(
            instructions[3..10],
            ["barrier", "x 1", "h 2", "ccx 0 1 2", "h 2", "x 1", "barrier"]
        );

        let assembly = CircuitAssembler::new().assemble(Some(3), &instructions);
        assert!(assembly.is_clean());
        assert!(!assembly.measurements_appended);
        assert_eq!(assembly.circuit.count_measurements(), 3);
    }

    #[test]
    fn test_grovers_two_qubits_and_defaults() {
        let instructions = grovers(2, None).unwrap();
        assert!(!instructions.iter().any(|i| i.starts_with("ccx")));
        assert_eq!(instructions.iter().filter(|i| *i == "cz 0 1").count(), 2);
        // All-ones target needs no oracle flips
        assert!(!instructions[..6].iter().any(|i| i.starts_with("x ")));

        assert_eq!(grovers(3, Some("1x1")), grovers(3, None));
        assert!(grovers(4, Some("1010")).is_none());
    }
}
