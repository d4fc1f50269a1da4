//! Circuit exports
//!
//! Gantree: L6_Engine → Export
//!
//! Three consumers of a finished [`Circuit`]: OpenQASM 2.0 text with a
//! comment header, a JSON document, and a Qiskit Python listing. The JSON
//! and Qiskit outputs read back through the local source scanners.

use crate::config::ExportSwitches;
use chrono::{DateTime, SecondsFormat, Utc};
use qcgen_core::normalize::format_angle;
use qcgen_core::{Circuit, CircuitType, Gate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Value of the `format` field in JSON documents
pub const JSON_FORMAT: &str = "qcgen-circuit";

/// Descriptive data written alongside a circuit
/// Gantree: ExportMeta // 내보내기 메타데이터
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMeta {
    /// Requested family
    pub circuit_type: CircuitType,
    /// Free-text description
    pub description: Option<String>,
    /// Time written into headers
    pub generated_at: DateTime<Utc>,
}

impl ExportMeta {
    /// Metadata stamped with the current time
    pub fn new(circuit_type: CircuitType) -> Self {
        Self {
            circuit_type,
            description: None,
            generated_at: Utc::now(),
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Fix the timestamp
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    fn timestamp(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Encodings produced for one circuit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exports {
    /// OpenQASM 2.0 text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qasm: Option<String>,
    /// JSON circuit document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    /// Qiskit Python listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qiskit: Option<String>,
}

impl Exports {
    /// Run every enabled exporter
    /// Gantree: render(&Circuit, &ExportMeta, ExportSwitches) -> Exports // 내보내기
    pub fn render(circuit: &Circuit, meta: &ExportMeta, switches: ExportSwitches) -> Self {
        Self {
            qasm: switches.qasm.then(|| to_qasm(circuit, meta)),
            json: switches.json.then(|| to_json(circuit, meta)),
            qiskit: switches.qiskit.then(|| to_qiskit(circuit, meta)),
        }
    }

    /// Check if nothing was rendered
    pub fn is_empty(&self) -> bool {
        self.qasm.is_none() && self.json.is_none() && self.qiskit.is_none()
    }
}

// ============================================================================
// OpenQASM
// ============================================================================

/// OpenQASM 2.0 with a comment header
pub fn to_qasm(circuit: &Circuit, meta: &ExportMeta) -> String {
    let mut header = vec![
        format!("// Generated by QCGen {}", crate::VERSION),
        format!("// Circuit type: {}", meta.circuit_type),
        format!("// Generated at: {}", meta.timestamp()),
        format!(
            "// Registers: q[{}], c[{}]",
            circuit.num_qubits(),
            circuit.num_clbits()
        ),
    ];
    if let Some(description) = &meta.description {
        header.extend(description.lines().map(|l| format!("// Description: {}", l)));
    }

    format!("{}\n{}\n", header.join("\n"), circuit.to_qasm())
}

// ============================================================================
// JSON
// ============================================================================

/// JSON document with metadata, registers and ordered operations
pub fn to_json(circuit: &Circuit, meta: &ExportMeta) -> Value {
    let operations: Vec<Value> = circuit.gates().iter().map(operation_json).collect();

    let mut metadata = Map::new();
    metadata.insert("circuit_type".into(), json!(meta.circuit_type.as_str()));
    metadata.insert("title".into(), json!(meta.circuit_type.title()));
    if let Some(description) = &meta.description {
        metadata.insert("description".into(), json!(description));
    }
    metadata.insert("generated_at".into(), json!(meta.timestamp()));
    metadata.insert("generator".into(), json!(format!("QCGen {}", crate::VERSION)));
    metadata.insert("depth".into(), json!(circuit.depth()));
    metadata.insert("gate_count".into(), json!(circuit.gate_count()));

    json!({
        "format": JSON_FORMAT,
        "metadata": metadata,
        "registers": {
            "qubits": circuit.num_qubits(),
            "clbits": circuit.num_clbits(),
        },
        "operations": operations,
    })
}

fn operation_json(gate: &Gate) -> Value {
    let mut op = Map::new();
    op.insert("gate".into(), json!(gate.name()));
    op.insert("qubits".into(), json!(gate.qubits()));
    op.insert("clbits".into(), json!(gate.clbits()));
    op.insert("params".into(), json!(gate.params()));
    if let Gate::Conditional { condition, .. } = gate {
        op.insert(
            "condition".into(),
            json!({ "clbit": condition.index, "value": condition.value }),
        );
        op.insert("label".into(), json!(gate.display_name()));
    }
    Value::Object(op)
}

// ============================================================================
// Qiskit
// ============================================================================

/// Python listing that rebuilds the circuit with Qiskit
pub fn to_qiskit(circuit: &Circuit, meta: &ExportMeta) -> String {
    let mut lines = vec![
        format!("# Generated by QCGen {}", crate::VERSION),
        format!("# Circuit type: {}", meta.circuit_type),
        format!("# Generated at: {}", meta.timestamp()),
    ];
    if let Some(description) = &meta.description {
        lines.extend(description.lines().map(|l| format!("# {}", l)));
    }
    lines.extend([
        "from qiskit import ClassicalRegister, QuantumCircuit, QuantumRegister".to_string(),
        String::new(),
        format!("q = QuantumRegister({}, \"q\")", circuit.num_qubits()),
        format!("c = ClassicalRegister({}, \"c\")", circuit.num_clbits()),
        "qc = QuantumCircuit(q, c)".to_string(),
        String::new(),
    ]);
    lines.extend(circuit.gates().iter().map(qiskit_call));

    let mut listing = lines.join("\n");
    listing.push('\n');
    listing
}

fn qiskit_call(gate: &Gate) -> String {
    let a = |angle: &f64| format_angle(*angle);
    match gate {
        Gate::H(q) => format!("qc.h({})", q),
        Gate::X(q) => format!("qc.x({})", q),
        Gate::Y(q) => format!("qc.y({})", q),
        Gate::Z(q) => format!("qc.z({})", q),
        Gate::Id(q) => format!("qc.id({})", q),
        Gate::S(q) => format!("qc.s({})", q),
        Gate::T(q) => format!("qc.t({})", q),
        Gate::Rx(q, theta) => format!("qc.rx({}, {})", a(theta), q),
        Gate::Ry(q, theta) => format!("qc.ry({}, {})", a(theta), q),
        Gate::Rz(q, theta) => format!("qc.rz({}, {})", a(theta), q),
        Gate::U2(q, phi, lambda) => {
            format!("qc.u({}, {}, {}, {})", a(&std::f64::consts::FRAC_PI_2), a(phi), a(lambda), q)
        }
        Gate::U3(q, theta, phi, lambda) => {
            format!("qc.u({}, {}, {}, {})", a(theta), a(phi), a(lambda), q)
        }
        Gate::Cx(c, t) => format!("qc.cx({}, {})", c, t),
        Gate::Cz(c, t) => format!("qc.cz({}, {})", c, t),
        Gate::Swap(x, y) => format!("qc.swap({}, {})", x, y),
        Gate::Cp(c, t, lambda) => format!("qc.cp({}, {}, {})", a(lambda), c, t),
        Gate::Ccx(c1, c2, t) => format!("qc.ccx({}, {}, {})", c1, c2, t),
        Gate::Measure(q, c) => format!("qc.measure({}, {})", q, c),
        Gate::Reset(q) => format!("qc.reset({})", q),
        Gate::Barrier(qs) if qs.is_empty() => "qc.barrier()".to_string(),
        Gate::Barrier(qs) => {
            let list: Vec<String> = qs.iter().map(|q| q.to_string()).collect();
            format!("qc.barrier({})", list.join(", "))
        }
        Gate::Conditional { condition, gate } => {
            format!("{}.c_if(c, {})", qiskit_call(gate), condition.value)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qcgen_core::{CircuitAssembler, Condition};

    fn meta() -> ExportMeta {
        ExportMeta::new(CircuitType::BellState)
            .with_description("Bell pair")
            .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn bell_circuit() -> Circuit {
        CircuitAssembler::new()
            .assemble(Some(2), &["h 0", "cx 0 1"])
            .circuit
    }

    #[test]
    fn test_qasm_header() {
        let qasm = to_qasm(&bell_circuit(), &meta());
        assert!(qasm.starts_with("// Generated by QCGen"));
        assert!(qasm.contains("// Circuit type: bell_state"));
        assert!(qasm.contains("// Generated at: 2024-05-01T12:00:00Z"));
        assert!(qasm.contains("// Description: Bell pair"));
        assert!(qasm.contains("OPENQASM 2.0;"));
        assert!(qasm.contains("measure q[1] -> c[1];"));
    }

    #[test]
    fn test_json_document() {
        let doc = to_json(&bell_circuit(), &meta());
        assert_eq!(doc["format"], JSON_FORMAT);
        assert_eq!(doc["registers"]["qubits"], 2);
        assert_eq!(doc["metadata"]["title"], "Bell State");

        let ops = doc["operations"].as_array().unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[1]["gate"], "cx");
        assert_eq!(ops[1]["qubits"], json!([0, 1]));
        assert_eq!(ops[3]["clbits"], json!([1]));
    }

    #[test]
    fn test_conditional_exports() {
        let mut circuit = Circuit::new(3);
        circuit
            .add_gate(Gate::Conditional {
                condition: Condition::new(2, 1),
                gate: Box::new(Gate::X(2)),
            })
            .unwrap();

        let op = &to_json(&circuit, &meta())["operations"][0];
        assert_eq!(op["gate"], "x");
        assert_eq!(op["condition"], json!({"clbit": 2, "value": 1}));
        assert_eq!(op["label"], "x_if_1");

        assert!(to_qasm(&circuit, &meta()).contains("if(c==1) x q[2];"));
        assert!(to_qiskit(&circuit, &meta()).contains("qc.x(2).c_if(c, 1)"));
    }

    #[test]
    fn test_qiskit_listing() {
        let circuit = CircuitAssembler::new()
            .assemble(Some(2), &["rx(pi/2) 0", "cp 0 1 0.5", "barrier"])
            .circuit;
        let listing = to_qiskit(&circuit, &meta());
        assert!(listing.contains("q = QuantumRegister(2, \"q\")"));
        assert!(listing.contains("qc.rx(1.5707963267948966, 0)"));
        assert!(listing.contains("qc.cp(0.5, 0, 1)"));
        assert!(listing.contains("qc.barrier()"));
        assert!(listing.contains("qc.measure(1, 1)"));
    }

    #[test]
    fn test_render_switches() {
        let switches = ExportSwitches {
            qasm: true,
            json: false,
            qiskit: false,
        };
        let exports = Exports::render(&bell_circuit(), &meta(), switches);
        assert!(exports.qasm.is_some());
        assert!(exports.json.is_none());
        assert!(Exports::render(&bell_circuit(), &meta(), ExportSwitches::none()).is_empty());
    }
}
