//! Rule-based suggester
//!
//! Gantree: L5_Suggest → RuleBasedSuggester
//!
//! Works without credentials. Text is classified by keyword counts and
//! scanned for explicit gate phrases ("hadamard on qubit 0",
//! "cnot from qubit 0 to qubit 1", "rx(pi/2) on qubit 1"); uploads are read
//! by the scanners in [`crate::scan`].

use crate::scan::{scan_json, scan_qasm, scan_qiskit, ScannedSource};
use crate::suggester::{
    InstructionSuggester, SourceFormat, SourceSuggestion, SuggestError, SuggestResult,
};
use async_trait::async_trait;
use qcgen_core::constants::limits::{clamp_qubits, MAX_ASSEMBLY_QUBITS, MAX_INTENT_QUBITS};
use qcgen_core::normalize::format_angle;
use qcgen_core::{
    evaluate_angle, infer_num_qubits, prepare_suggested, CircuitIntent, CircuitType, IntentParams,
};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Description attached to intents built from gate phrases
pub const CUSTOM_DESCRIPTION: &str = "Custom quantum circuit with specified gates";

/// Keywords per family; the family with the most hits wins
const KEYWORDS: &[(CircuitType, &[&str])] = &[
    (CircuitType::BellState, &["bell", "bell state", "entangle", "entangled pair"]),
    (CircuitType::GhzState, &["ghz", "greenberger", "horne", "zeilinger", "ghz state"]),
    (CircuitType::WState, &["w state", "w-state"]),
    (
        CircuitType::Teleportation,
        &["teleport", "teleportation", "transfer", "quantum teleportation"],
    ),
    (
        CircuitType::SuperdenseCoding,
        &["superdense", "dense coding", "superdense coding"],
    ),
    (
        CircuitType::DeutschJozsa,
        &["deutsch", "jozsa", "deutsch-jozsa", "deutsch jozsa"],
    ),
    (
        CircuitType::BernsteinVazirani,
        &["bernstein", "vazirani", "bernstein-vazirani"],
    ),
    (CircuitType::Simon, &["simon", "simon's algorithm", "simons algorithm"]),
    (
        CircuitType::Qft,
        &["qft", "fourier", "quantum fourier", "quantum fourier transform"],
    ),
    (
        CircuitType::Qpe,
        &["qpe", "phase estimation", "quantum phase estimation"],
    ),
    (CircuitType::Shor, &["shor", "shor's", "factoring", "factorization"]),
    (
        CircuitType::Grovers,
        &["grover", "search", "grovers algorithm", "database search"],
    ),
    (
        CircuitType::Qaoa,
        &["qaoa", "quantum approximate optimization", "approximate optimization"],
    ),
    (
        CircuitType::Vqe,
        &["vqe", "variational", "eigensolver", "variational quantum eigensolver"],
    ),
    (
        CircuitType::QuantumCounting,
        &["quantum counting", "counting algorithm"],
    ),
    (
        CircuitType::QuantumWalk,
        &["quantum walk", "quantum random walk"],
    ),
    (
        CircuitType::Hhl,
        &["hhl", "linear system", "linear equations", "harrow hassidim lloyd"],
    ),
];

/// Suggester that needs no network access
/// Gantree: RuleBasedSuggester // 규칙 기반 제안자
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSuggester;

impl RuleBasedSuggester {
    /// Create the suggester
    pub fn new() -> Self {
        Self
    }

    /// Read a free-text request (synchronous form of `interpret`)
    /// Gantree: parse_text(&str) -> CircuitIntent // 규칙 해석
    pub fn parse_text(&self, text: &str) -> CircuitIntent {
        let text = text.to_lowercase();
        let gates = scan_gate_phrases(&text);

        let mut params = IntentParams::new();
        if let Some(n) = first_qubit_count(&text) {
            params.num_qubits = Some(clamp_qubits(n, MAX_INTENT_QUBITS));
        }

        let circuit_type = if gates.is_empty() {
            classify(&text)
        } else {
            params.custom_gates = Some(gates);
            params.custom_description = Some(CUSTOM_DESCRIPTION.to_string());
            CircuitType::Custom
        };

        log::debug!("rule-based interpretation: {}", circuit_type);
        CircuitIntent::new(circuit_type).with_params(params)
    }

    /// Read an upload (synchronous form of `suggest_from_source`)
    pub fn read_source(
        &self,
        source: &[u8],
        format: &SourceFormat,
        description: Option<&str>,
    ) -> SuggestResult<SourceSuggestion> {
        let scanner: fn(&str) -> SuggestResult<ScannedSource> = match format {
            SourceFormat::Qasm => |text| Ok(scan_qasm(text)),
            SourceFormat::Qiskit => |text| Ok(scan_qiskit(text)),
            SourceFormat::Json => scan_json,
            SourceFormat::Image(mime) => {
                return Err(SuggestError::UnsupportedFormat(format!(
                    "{} (diagrams need a language-model suggester)",
                    mime
                )))
            }
        };

        let text = std::str::from_utf8(source)
            .map_err(|e| SuggestError::InvalidSource(e.to_string()))?;
        let scanned = scanner(text)?;

        if scanned.instructions.is_empty() {
            return Err(SuggestError::EmptySuggestion);
        }
        log::info!(
            "scanned {} instruction(s) from {} source",
            scanned.instructions.len(),
            format.label()
        );

        let num_qubits = scanned
            .num_qubits
            .unwrap_or_else(|| infer_num_qubits(&scanned.instructions));

        Ok(SourceSuggestion {
            cleaned_source: scanned.cleaned,
            num_qubits: clamp_qubits(num_qubits, MAX_ASSEMBLY_QUBITS),
            description: description
                .map(str::to_string)
                .unwrap_or_else(|| format!("Imported {} circuit", format.label())),
            instructions: scanned.instructions,
        })
    }
}

#[async_trait]
impl InstructionSuggester for RuleBasedSuggester {
    fn name(&self) -> &str {
        "rules"
    }

    /// Only custom gate lists can be suggested; every family is left to the
    /// caller's generators
    async fn suggest(
        &self,
        circuit_type: CircuitType,
        params: &IntentParams,
    ) -> SuggestResult<Vec<String>> {
        let gates = params
            .custom_gates
            .as_deref()
            .map(prepare_suggested)
            .unwrap_or_default();
        if gates.is_empty() {
            log::debug!("no rule-based instructions for {}", circuit_type);
            return Err(SuggestError::EmptySuggestion);
        }
        Ok(gates)
    }

    async fn interpret(&self, text: &str) -> SuggestResult<CircuitIntent> {
        Ok(self.parse_text(text))
    }

    async fn suggest_from_source(
        &self,
        source: &[u8],
        format: &SourceFormat,
        description: Option<&str>,
    ) -> SuggestResult<SourceSuggestion> {
        self.read_source(source, format, description)
    }
}

// ============================================================================
// Text Rules
// ============================================================================

/// Family with the most keyword hits, `unknown` when none hit
pub fn classify(text: &str) -> CircuitType {
    let text = text.to_lowercase();
    let mut best = (CircuitType::Unknown, 0usize);
    for (circuit_type, keywords) in KEYWORDS {
        let score = keywords.iter().filter(|k| text.contains(*k)).count();
        if score > best.1 {
            best = (*circuit_type, score);
        }
    }
    best.0
}

/// Number before the first `qubit` mention that has one (`3 qubits`, `5qubit`)
pub fn first_qubit_count(text: &str) -> Option<usize> {
    let text = text.to_lowercase();
    qubit_count_re()?
        .captures_iter(&text)
        .find_map(|caps| caps[1].parse().ok())
}

/// Gate phrases in the order they appear in `text`
/// Gantree: scan_gate_phrases(&str) -> Vec<String> // 게이트 구절 추출
pub fn scan_gate_phrases(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let Some(re) = gate_phrase_re() else {
        return Vec::new();
    };
    re.captures_iter(&text).filter_map(|caps| phrase_gate(&caps)).collect()
}

/// Canonical instruction for one matched phrase
fn phrase_gate(caps: &Captures<'_>) -> Option<String> {
    if let Some(name) = caps.name("rot") {
        let angle = format_angle(evaluate_angle(caps.name("angle")?.as_str()));
        return Some(format!("{} {} {}", name.as_str(), &caps["rq"], angle));
    }
    if let Some(name) = caps.name("two") {
        let mnemonic = if name.as_str().ends_with('z') { "cz" } else { "cx" };
        return Some(format!("{} {} {}", mnemonic, &caps["c"], &caps["t"]));
    }
    let name = caps.name("one")?.as_str();
    let mnemonic = if name == "hadamard" { "h" } else { name };
    Some(format!("{} {}", mnemonic, &caps["q"]))
}

fn qubit_count_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+)\s*qubit").ok()).as_ref()
}

/// One alternative per phrase shape, tried in this order at each position:
///
/// - `rx(<angle>) [on|to] qubit N`, likewise `ry` and `rz`
/// - `cnot|cx|controlled-x [from|with] qubit A [to|and|controlling] qubit B`, likewise cz
/// - `hadamard|h|x|y|z [gate] [on|to] qubit N`
fn gate_phrase_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let rotation = r"(?P<rot>r[xyz])\s*\(\s*(?P<angle>[^)\s][^)]*?)\s*\)\s*(?:(?:on|to)\b\s*)?qubit\s*(?P<rq>[0-9]+)";
        let two = r"(?P<two>cnot|cx|controlled[- ]?x|cz|controlled[- ]?z)\b\s*(?:(?:from|with)\b\s*)?qubit\s*(?P<c>[0-9]+)\s*(?:(?:to|and|controlling)\b\s*)?qubit\s*(?P<t>[0-9]+)";
        let one = r"(?P<one>hadamard|h|x|y|z)\b\s*(?:gate\b\s*)?(?:(?:on|to)\b\s*)?qubit\s*(?P<q>[0-9]+)";
        Regex::new(&format!(r"\b(?:{}|{}|{})", rotation, two, one)).ok()
    })
    .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Create a Bell state"), CircuitType::BellState);
        assert_eq!(classify("GHZ state on 4 qubits"), CircuitType::GhzState);
        assert_eq!(
            classify("quantum fourier transform please"),
            CircuitType::Qft
        );
        assert_eq!(classify("make me a sandwich"), CircuitType::Unknown);
    }

    #[test]
    fn test_first_qubit_count() {
        assert_eq!(first_qubit_count("a 3 qubit ghz"), Some(3));
        assert_eq!(first_qubit_count("use 12qubits"), Some(12));
        assert_eq!(first_qubit_count("qubit 0 then 4 qubits"), Some(4));
        assert_eq!(first_qubit_count("no count"), None);
    }

    #[test]
    fn test_gate_phrases_in_text_order() {
        let gates = scan_gate_phrases(
            "Apply CNOT from qubit 0 to qubit 1, then a Hadamard gate on qubit 0, then x on qubit 2",
        );
        assert_eq!(gates, vec!["cx 0 1", "h 0", "x 2"]);
    }

    #[test]
    fn test_rotation_phrase() {
        let gates = scan_gate_phrases("rx(pi/2) on qubit 1 and rz( pi ) qubit 0");
        assert_eq!(
            gates,
            vec!["rx 1 1.5707963267948966", "rz 0 3.141592653589793"]
        );
    }

    #[test]
    fn test_word_boundaries() {
        // "with qubit" must not read as an h gate, nor "cx qubit" as an x gate
        assert_eq!(
            scan_gate_phrases("cx with qubit 0 and qubit 2"),
            vec!["cx 0 2"]
        );
        assert_eq!(scan_gate_phrases("a box qubit 3"), Vec::<String>::new());
        assert_eq!(
            scan_gate_phrases("controlled-z from qubit 1 to qubit 0"),
            vec!["cz 1 0"]
        );
        assert_eq!(
            scan_gate_phrases("the rx() on qubit 1 is empty, z on qubit 1 is not"),
            vec!["z 1"]
        );
    }

    #[test]
    fn test_parse_text_custom() {
        let intent = RuleBasedSuggester::new()
            .parse_text("On 3 qubits: hadamard on qubit 0 then cnot from qubit 0 to qubit 1");
        assert_eq!(intent.circuit_type, CircuitType::Custom);
        assert_eq!(intent.params.num_qubits, Some(3));
        assert_eq!(
            intent.params.custom_gates,
            Some(vec!["h 0".to_string(), "cx 0 1".to_string()])
        );
        assert_eq!(
            intent.params.custom_description.as_deref(),
            Some(CUSTOM_DESCRIPTION)
        );
    }

    #[test]
    fn test_parse_text_family() {
        let intent = RuleBasedSuggester::new().parse_text("Teleportation with 25 qubits");
        assert_eq!(intent.circuit_type, CircuitType::Teleportation);
        assert_eq!(intent.params.num_qubits, Some(10));
        assert!(intent.params.custom_gates.is_none());
    }

    #[tokio::test]
    async fn test_suggest_only_custom_gates() {
        let rules = RuleBasedSuggester::new();
        let params = IntentParams::new().with_custom_gates(["rx 0 pi", "measure 0 -> 0"]);
        let gates = rules.suggest(CircuitType::Custom, &params).await.unwrap();
        assert_eq!(gates, vec!["rx 0 3.141592653589793", "measure 0 0"]);

        let result = rules.suggest(CircuitType::Grovers, &IntentParams::new()).await;
        assert!(matches!(result, Err(SuggestError::EmptySuggestion)));
    }

    #[tokio::test]
    async fn test_source_reading() {
        let rules = RuleBasedSuggester::new();
        let suggestion = rules
            .suggest_from_source(b"qreg q[3];\nh q[0];\ncx q[0],q[2];", &SourceFormat::Qasm, None)
            .await
            .unwrap();
        assert_eq!(suggestion.num_qubits, 3);
        assert_eq!(suggestion.instructions, vec!["h 0", "cx 0 2"]);
        assert_eq!(suggestion.description, "Imported QASM circuit");

        // No declaration: inferred from indices
        let suggestion = rules
            .read_source(b"[\"h 0\", \"cx 0 4\"]", &SourceFormat::Json, Some("mine"))
            .unwrap();
        assert_eq!(suggestion.num_qubits, 5);
        assert_eq!(suggestion.description, "mine");
    }

    #[test]
    fn test_source_rejections() {
        let rules = RuleBasedSuggester::new();
        assert!(matches!(
            rules.read_source(b"\x89PNG", &SourceFormat::Image("image/png".into()), None),
            Err(SuggestError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            rules.read_source(b"OPENQASM 2.0;", &SourceFormat::Qasm, None),
            Err(SuggestError::EmptySuggestion)
        ));
        assert!(matches!(
            rules.read_source(&[0xff], &SourceFormat::Qiskit, None),
            Err(SuggestError::InvalidSource(_))
        ));
    }
}
