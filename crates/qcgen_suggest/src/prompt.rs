//! Prompt text for the chat-completions suggester
//!
//! Gantree: L5_Suggest → Prompt

use crate::suggester::SourceFormat;
use qcgen_core::{CircuitType, IntentParams};

/// Instruction formats every prompt teaches
const GATE_FORMATS: &str = "\
Gate formats to use:
- Simple gates: \"h 0\"
- Rotation gates: \"rx(pi/3) 0\", \"ry(pi/3) 0\", \"rz(pi/6) 1\" (keep pi notation)
- Parametric gates: \"u1 0 0.5\", \"u2 0 0.5 1.2\", \"u3 0 0.5 1.2 0.7\"
- Two-qubit gates: \"cx 0 1\", \"cz 0 1\", \"cp 0 1 0.5\", \"swap 0 1\"
- Multi-control gates: \"ccx 0 1 2\"
- Measurement: \"measure 0 -> 0\"
- Reset: \"reset 0\"
- Barrier: \"barrier 0 1 2\"
- Conditional: \"if(c[2]==1) x 2\"
";

const FLAT_LIST_RULE: &str = "\
Return every gate operation as a separate string, in circuit order.
Do not group gates by type or category.
";

/// System prompt for algorithm requests
pub fn suggest_system() -> String {
    format!(
        "You are a quantum computing expert. Generate the gate sequence that implements the \
requested algorithm.\n\n{}\nUse only: h, x, y, z, s, t, rx, ry, rz, u1, u2, u3, cx, cz, swap, cp, ccx, \
measure, reset, barrier.\n\n{}\nRespond with a JSON object: {{\"gates\": [\"h 0\", \"cx 0 1\", ...]}}\n",
        GATE_FORMATS, FLAT_LIST_RULE
    )
}

/// System prompt for free-text interpretation
pub fn interpret_system() -> String {
    let families: Vec<&str> = CircuitType::ALGORITHMS.iter().map(|t| t.as_str()).collect();
    format!(
        "You are a quantum computing expert assistant. Analyze the user's request and extract the \
circuit type ({}, or custom), the number of qubits (2 to 10), any parameters, and for custom circuits \
the gate sequence.\n\n{}\n{}\nRespond with a JSON object:\n{{\n  \"circuit_type\": \"custom\",\n  \
\"num_qubits\": 3,\n  \"params\": {{}},\n  \"custom_gates\": [\"h 0\", \"cx 0 1\"],\n  \
\"custom_description\": \"...\"\n}}\n",
        families.join(", "),
        GATE_FORMATS,
        FLAT_LIST_RULE
    )
}

/// System prompt for uploaded source files
pub fn source_system(format: &SourceFormat, description: Option<&str>) -> String {
    let what = match format {
        SourceFormat::Qasm => "OpenQASM",
        SourceFormat::Qiskit => "Qiskit Python code",
        SourceFormat::Json => "a JSON circuit description",
        SourceFormat::Image(_) => "a circuit diagram",
    };
    let mut prompt = format!(
        "You are a quantum computing expert. Analyze and clean {}. Extract the cleaned source, the \
number of qubits, a description, and the gates as a flat array.\n\n{}\n{}\nPreserve angle notation \
such as pi/3.\n\nRespond with a JSON object:\n{{\n  \"{}\": \"...\",\n  \"num_qubits\": 3,\n  \
\"description\": \"...\",\n  \"gates\": [\"h 0\", \"ry(pi/3) 0\", \"cx 0 1\"]\n}}\n",
        what,
        GATE_FORMATS,
        FLAT_LIST_RULE,
        format.cleaned_key()
    );
    if let Some(d) = description {
        prompt.push_str(&format!("\nUser description: {}\n", d));
    }
    prompt
}

/// System prompt for circuit diagram images
pub fn image_system(description: Option<&str>) -> String {
    let families: Vec<&str> = CircuitType::ALGORITHMS.iter().map(|t| t.as_str()).collect();
    let mut prompt = format!(
        "You are a quantum computing expert who reads circuit diagrams. Count the qubit lines, \
identify every gate and control connection, and note measurements.\n\nThe diagram may show one of: {}, \
or a custom circuit.\n\n{}\n{}\nKeep rotation angles as expressions (\"rx(3*pi/4) 0\").\n\n\
Respond with a JSON object with: circuit_type, num_qubits (at most 10), custom_description (what the \
circuit does and why), and custom_gates as a flat array of strings.\n",
        families.join(", "),
        GATE_FORMATS,
        FLAT_LIST_RULE
    );
    if let Some(d) = description {
        prompt.push_str(&format!("\nUser description: {}\n", d));
    }
    prompt
}

/// User message for image requests
pub const IMAGE_USER_TEXT: &str = "Analyze this quantum circuit diagram. Return a JSON object with \
circuit_type, num_qubits, custom_description, and custom_gates as a flat array of strings.";

/// Appended to the system prompt after a grouped reply
pub const GROUPED_CORRECTION: &str = "\nCRITICAL CORRECTION: do not return gates as an object. \
The \"gates\" field must be a flat array of strings.\nWRONG: \"gates\": {\"single_qubit\": [\"h 0\"], \
\"two_qubit\": [\"cx 0 1\"]}\nCORRECT: \"gates\": [\"h 0\", \"cx 0 1\", \"measure 0 -> 0\"]\n";

/// Appended to the system prompt after any other unusable reply
pub const SHAPE_CORRECTION: &str = "\nCRITICAL CORRECTION: the \"gates\" field must be a flat \
array of individual gate strings, in the order they appear in the circuit.\n";

/// Structured description of an algorithm request
/// Gantree: describe_request(CircuitType, &IntentParams) -> String // 요청 기술
pub fn describe_request(circuit_type: CircuitType, params: &IntentParams) -> String {
    let n = params
        .num_qubits
        .unwrap_or_else(|| circuit_type.default_qubits());
    let mut text = format!(
        "Circuit type: {}\nNumber of qubits: {}\n\n",
        circuit_type.as_str(),
        n
    );

    let detail = match circuit_type {
        CircuitType::BellState => {
            "Create a maximally entangled Bell pair with final state (|00> + |11>)/sqrt(2).".to_string()
        }
        CircuitType::GhzState => format!(
            "Create a GHZ state over {} qubits: (|{}> + |{}>)/sqrt(2).",
            n,
            "0".repeat(n),
            "1".repeat(n)
        ),
        CircuitType::WState => format!(
            "Create a W state over {} qubits: the equal superposition of all basis states with \
exactly one qubit in |1>.",
            n
        ),
        CircuitType::Teleportation => "Teleport the state of qubit 0 to qubit 2: prepare a state on \
qubit 0, entangle qubits 1 and 2, Bell-measure qubits 0 and 1, then apply conditional corrections on \
qubit 2."
            .to_string(),
        CircuitType::SuperdenseCoding => "Superdense coding: create a Bell pair, encode two classical \
bits on one qubit, then decode by measuring both qubits."
            .to_string(),
        CircuitType::DeutschJozsa => {
            let oracle = params.oracle_type.as_deref().unwrap_or("balanced");
            format!(
                "Deutsch-Jozsa with a {} oracle: initialize, apply Hadamards, apply the oracle, \
apply Hadamards again, and measure every qubit except the ancilla.",
                oracle
            )
        }
        CircuitType::BernsteinVazirani => {
            let secret = non_empty(params.secret_string.as_deref()).unwrap_or("101");
            format!(
                "Bernstein-Vazirani recovering the secret string \"{}\": Hadamards, an oracle \
encoding the secret, Hadamards again, and measurement of the input register.",
                secret
            )
        }
        CircuitType::Simon => "Simon's algorithm: Hadamards on the first register, an oracle with a \
hidden period, Hadamards on the first register again, then measure it."
            .to_string(),
        CircuitType::Qft => format!(
            "Quantum Fourier Transform on {} qubits using Hadamards and controlled phase rotations.",
            n
        ),
        CircuitType::Qpe => {
            let precision = params
                .precision_qubits
                .map(|p| format!(" with {} precision qubits", p))
                .unwrap_or_default();
            format!(
                "Quantum Phase Estimation{}: superpose the register, apply controlled unitaries, \
apply the inverse QFT, and measure the register.",
                precision
            )
        }
        CircuitType::Shor => "A simplified Shor's algorithm showing QFT, inverse QFT and modular \
exponentiation."
            .to_string(),
        CircuitType::Grovers => {
            let marked = non_empty(params.marked_state.as_deref()).unwrap_or("101");
            format!(
                "Grover's search for the marked state \"{}\": uniform superposition, oracle marking \
the state, diffusion operator, repeated as appropriate, then measure all qubits.",
                marked
            )
        }
        CircuitType::Qaoa => "A basic QAOA circuit: initial state, alternating problem and mixer \
unitaries, then measure all qubits."
            .to_string(),
        CircuitType::Vqe => "A basic VQE ansatz with concrete rotation angles for a small molecular \
Hamiltonian."
            .to_string(),
        CircuitType::QuantumCounting => "Quantum counting: QPE over controlled Grover operators, \
inverse QFT on the counting register, then measure it."
            .to_string(),
        CircuitType::QuantumWalk => "A quantum walk: coin (Hadamard) and conditional shift operators \
repeated a few times, then measure all qubits."
            .to_string(),
        CircuitType::Hhl => "A simplified HHL linear-system solver: QPE for eigenvalues, controlled \
rotations, and inverse QPE."
            .to_string(),
        CircuitType::Custom | CircuitType::Unknown => params
            .custom_description
            .clone()
            .unwrap_or_else(|| {
                "A general circuit demonstrating superposition and entanglement.".to_string()
            }),
    };
    text.push_str(&detail);

    if !params.extra.is_empty() {
        text.push_str("\n\nAdditional parameters:");
        for (key, value) in &params.extra {
            text.push_str(&format!("\n- {}: {}", key, value));
        }
    }
    text
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_request_defaults() {
        let text = describe_request(CircuitType::GhzState, &IntentParams::new());
        assert!(text.starts_with("Circuit type: ghz_state\nNumber of qubits: 3"));
        assert!(text.contains("|000>"));
    }

    #[test]
    fn test_describe_request_params() {
        let params = IntentParams::new()
            .with_num_qubits(5)
            .with_extra("iterations", 2);
        let text = describe_request(CircuitType::Grovers, &params);
        assert!(text.contains("Number of qubits: 5"));
        assert!(text.contains("\"101\""));
        assert!(text.contains("- iterations: 2"));

        let mut params = IntentParams::new();
        params.secret_string = Some("1101".into());
        let text = describe_request(CircuitType::BernsteinVazirani, &params);
        assert!(text.contains("\"1101\""));
    }

    #[test]
    fn test_source_prompt_mentions_key() {
        let prompt = source_system(&SourceFormat::Qiskit, Some("a bell pair"));
        assert!(prompt.contains("cleaned_code"));
        assert!(prompt.ends_with("User description: a bell pair\n"));
    }

    #[test]
    fn test_interpret_prompt_lists_families() {
        let prompt = interpret_system();
        assert!(prompt.contains("bernstein_vazirani"));
        assert!(prompt.contains("if(c[2]==1) x 2"));
    }
}
