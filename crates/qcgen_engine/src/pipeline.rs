//! Pipeline for staged circuit generation
//!
//! Gantree: L6_Engine → Pipeline
//!
//! ```text
//! Initial ──resolve()──> IntentResolved ──assemble()──> Assembled ──export()──> Exported
//! ```
//!
//! Each stage runs the ones before it when they have not run yet.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::export::{ExportMeta, Exports};
use crate::facade::{InstructionOrigin, IntentResolver, ResolvedInstructions};
use qcgen_core::constants::limits::clamp_qubits;
use qcgen_core::{Assembly, Circuit, CircuitIntent, IntentParams};
use qcgen_suggest::{InstructionSuggester, RuleBasedSuggester, SourceFormat};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Nothing has run
    Initial,
    /// Intent known and instructions chosen
    IntentResolved,
    /// Circuit built
    Assembled,
    /// Export encodings rendered
    Exported,
}

/// What the pipeline starts from
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineInput {
    /// Free-text request
    Text(String),
    /// Ready-made intent
    Intent(CircuitIntent),
    /// Uploaded source file
    Source {
        /// Raw file contents
        bytes: Vec<u8>,
        /// Declared format
        format: SourceFormat,
        /// Caller's description, if any
        description: Option<String>,
    },
}

/// Pipeline state holding intermediate results
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Current stage
    pub stage: PipelineStage,

    /// Cleaned upload, for source input
    pub cleaned_source: Option<String>,

    /// Resolved intent and instructions
    pub resolved: Option<ResolvedInstructions>,

    /// Assembled circuit
    pub assembly: Option<Assembly>,

    /// Rendered exports
    pub exports: Option<Exports>,
}

impl PipelineState {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Initial,
            cleaned_source: None,
            resolved: None,
            assembly: None,
            exports: None,
        }
    }

    /// Check if the intent has been resolved
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Check if a circuit has been assembled
    pub fn is_assembled(&self) -> bool {
        self.assembly.is_some()
    }
}

/// Everything one request produced
/// Gantree: CircuitReport // 생성 결과
#[derive(Debug, Clone)]
pub struct CircuitReport {
    /// Intent after resolution
    pub intent: CircuitIntent,
    /// Instructions handed to the assembler
    pub raw_instructions: Vec<String>,
    /// Where the instructions came from
    pub origin: InstructionOrigin,
    /// Cleaned upload, for source input
    pub cleaned_source: Option<String>,
    /// Circuit plus applied and skipped instructions
    pub assembly: Assembly,
    /// Rendered encodings
    pub exports: Exports,
}

impl CircuitReport {
    /// Finished circuit
    pub fn circuit(&self) -> &Circuit {
        &self.assembly.circuit
    }

    /// Check if every instruction was applied
    pub fn is_clean(&self) -> bool {
        self.assembly.is_clean()
    }

    /// JSON summary of the request outcome
    pub fn to_json(&self) -> Value {
        let circuit = self.circuit();
        let skipped: Vec<Value> = self
            .assembly
            .skipped
            .iter()
            .map(|s| json!({ "index": s.index, "instruction": s.raw, "reason": s.reason.to_string() }))
            .collect();

        json!({
            "circuit_type": self.intent.circuit_type.as_str(),
            "params": self.intent.params.to_value(),
            "explanation": self.intent.explanation,
            "origin": self.origin,
            "num_qubits": circuit.num_qubits(),
            "num_clbits": circuit.num_clbits(),
            "depth": circuit.depth(),
            "instructions": self.raw_instructions,
            "applied": self.assembly.canonical_strings(),
            "skipped": skipped,
            "measurements_appended": self.assembly.measurements_appended,
            "cleaned_source": self.cleaned_source,
            "exports": self.exports,
        })
    }
}

/// Staged circuit generation
/// Gantree: Pipeline // 단계별 실행
pub struct Pipeline {
    input: PipelineInput,
    resolver: IntentResolver,
    rules: RuleBasedSuggester,
    state: PipelineState,
}

impl Pipeline {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a pipeline for any input
    pub fn new(input: PipelineInput, config: EngineConfig) -> Self {
        Self {
            input,
            resolver: IntentResolver::new(config),
            rules: RuleBasedSuggester::new(),
            state: PipelineState::new(),
        }
    }

    /// Start from free text
    pub fn from_text(text: impl Into<String>, config: EngineConfig) -> Self {
        Self::new(PipelineInput::Text(text.into()), config)
    }

    /// Start from an intent
    pub fn from_intent(intent: CircuitIntent, config: EngineConfig) -> Self {
        Self::new(PipelineInput::Intent(intent), config)
    }

    /// Start from a circuit-type token and parameters
    ///
    /// An unrecognized token is rejected here with
    /// `QcgenError::InvalidCircuitType`.
    pub fn from_request(
        circuit_type: &str,
        params: IntentParams,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let intent = CircuitIntent::parse(circuit_type, params)?;
        Ok(Self::from_intent(intent, config))
    }

    /// Start from an uploaded source file
    pub fn from_source(
        bytes: impl Into<Vec<u8>>,
        format: SourceFormat,
        description: Option<String>,
        config: EngineConfig,
    ) -> Self {
        Self::new(
            PipelineInput::Source {
                bytes: bytes.into(),
                format,
                description,
            },
            config,
        )
    }

    /// Use a suggester for interpretation and instruction suggestions
    pub fn with_suggester(mut self, suggester: Arc<dyn InstructionSuggester>) -> Self {
        self.resolver = self.resolver.with_suggester(suggester);
        self
    }

    // ========================================================================
    // Stage Accessors
    // ========================================================================

    /// Get current stage
    pub fn stage(&self) -> PipelineStage {
        self.state.stage
    }

    /// Get current state
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        self.resolver.config()
    }

    /// Get input
    pub fn input(&self) -> &PipelineInput {
        &self.input
    }

    // ========================================================================
    // Pipeline Stages
    // ========================================================================

    /// Stage 1: interpret the input and choose instructions
    pub async fn resolve(&mut self) -> EngineResult<&ResolvedInstructions> {
        log::info!("pipeline: resolving intent");
        let (intent, cleaned_source) = self.obtain_intent().await?;
        let resolved = self.resolver.resolve(&intent).await;

        self.state.cleaned_source = cleaned_source;
        self.state.assembly = None;
        self.state.exports = None;
        self.state.stage = PipelineStage::IntentResolved;
        Ok(self.state.resolved.insert(resolved))
    }

    /// Stage 2: assemble the circuit
    pub async fn assemble(&mut self) -> EngineResult<&Assembly> {
        if self.state.resolved.is_none() {
            self.resolve().await?;
        }
        let resolved = self
            .state
            .resolved
            .as_ref()
            .ok_or(EngineError::MissingStage("resolve"))?;

        log::info!(
            "pipeline: assembling {} instruction(s)",
            resolved.instructions.len()
        );
        let assembly = self
            .resolver
            .config()
            .to_assembler()
            .assemble(resolved.intent.params.num_qubits, &resolved.instructions);

        self.state.exports = None;
        self.state.stage = PipelineStage::Assembled;
        Ok(self.state.assembly.insert(assembly))
    }

    /// Stage 3: render the enabled exports
    pub async fn export(&mut self) -> EngineResult<&Exports> {
        if self.state.assembly.is_none() {
            self.assemble().await?;
        }
        let (Some(resolved), Some(assembly)) = (&self.state.resolved, &self.state.assembly) else {
            return Err(EngineError::MissingStage("assemble"));
        };

        log::info!("pipeline: exporting");
        let intent = &resolved.intent;
        let description = intent
            .params
            .custom_description
            .clone()
            .unwrap_or_else(|| intent.circuit_type.title().to_string());
        let meta = ExportMeta::new(intent.circuit_type).with_description(description);
        let exports = Exports::render(
            &assembly.circuit,
            &meta,
            self.resolver.config().exports,
        );

        self.state.stage = PipelineStage::Exported;
        Ok(self.state.exports.insert(exports))
    }

    /// Run every stage and collect the results
    pub async fn run(&mut self) -> EngineResult<CircuitReport> {
        self.export().await?;

        let (Some(resolved), Some(assembly), Some(exports)) = (
            self.state.resolved.clone(),
            self.state.assembly.clone(),
            self.state.exports.clone(),
        ) else {
            return Err(EngineError::MissingStage("export"));
        };

        Ok(CircuitReport {
            intent: resolved.intent,
            raw_instructions: resolved.instructions,
            origin: resolved.origin,
            cleaned_source: self.state.cleaned_source.clone(),
            assembly,
            exports,
        })
    }

    /// Reset pipeline to initial state
    pub fn reset(&mut self) {
        self.state = PipelineState::new();
    }

    // ========================================================================
    // Interpretation
    // ========================================================================

    async fn obtain_intent(&self) -> EngineResult<(CircuitIntent, Option<String>)> {
        let max_intent = self.config().max_intent_qubits;
        match &self.input {
            PipelineInput::Intent(intent) => {
                let mut intent = intent.clone();
                intent.params.clamp_num_qubits(self.config().max_assembly_qubits);
                Ok((intent, None))
            }
            PipelineInput::Text(text) => {
                let mut intent = self.interpret_text(text).await;
                intent.params.clamp_num_qubits(max_intent);
                Ok((intent, None))
            }
            PipelineInput::Source {
                bytes,
                format,
                description,
            } => {
                let suggestion = self
                    .read_source(bytes, format, description.as_deref())
                    .await?;
                let cleaned = suggestion.cleaned_source.clone();
                let mut intent = suggestion.into_intent();
                intent.params.num_qubits = intent
                    .params
                    .num_qubits
                    .map(|n| clamp_qubits(n, self.config().max_assembly_qubits));
                Ok((intent, Some(cleaned)))
            }
        }
    }

    /// Configured suggester first, rule-based parsing on failure
    async fn interpret_text(&self, text: &str) -> CircuitIntent {
        if let Some(suggester) = self.resolver.suggester() {
            match suggester.interpret(text).await {
                Ok(intent) => return intent,
                Err(e) => log::warn!(
                    "{} interpretation failed: {}, using rules",
                    suggester.name(),
                    e
                ),
            }
        }
        self.rules.parse_text(text)
    }

    /// Configured suggester first, local scanning on failure
    async fn read_source(
        &self,
        bytes: &[u8],
        format: &SourceFormat,
        description: Option<&str>,
    ) -> EngineResult<qcgen_suggest::SourceSuggestion> {
        if let Some(suggester) = self.resolver.suggester() {
            match suggester.suggest_from_source(bytes, format, description).await {
                Ok(suggestion) => return Ok(suggestion),
                Err(e) => log::warn!(
                    "{} could not read {} source: {}, scanning locally",
                    suggester.name(),
                    format.label(),
                    e
                ),
            }
        }
        Ok(self.rules.read_source(bytes, format, description)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qcgen_core::{CircuitType, Gate, QcgenError};
    use qcgen_suggest::SuggestError;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio_test::block_on(future)
    }

    #[test]
    fn test_pipeline_new() {
        let pipeline = Pipeline::from_text("bell state", EngineConfig::default());
        assert_eq!(pipeline.stage(), PipelineStage::Initial);
        assert!(!pipeline.state().is_resolved());
    }

    #[test]
    fn test_staged_execution() {
        let mut pipeline = Pipeline::from_text("Make a GHZ state on 4 qubits", EngineConfig::default());

        let resolved = block_on(pipeline.resolve()).unwrap();
        assert_eq!(resolved.intent.circuit_type, CircuitType::GhzState);
        assert_eq!(resolved.instructions.len(), 4);
        assert_eq!(pipeline.stage(), PipelineStage::IntentResolved);

        let assembly = block_on(pipeline.assemble()).unwrap();
        assert_eq!(assembly.circuit.num_qubits(), 4);
        assert_eq!(pipeline.stage(), PipelineStage::Assembled);

        let exports = block_on(pipeline.export()).unwrap();
        assert!(exports.qasm.as_deref().unwrap().contains("qreg q[4];"));
        assert_eq!(pipeline.stage(), PipelineStage::Exported);
    }

    #[test]
    fn test_run_custom_text() {
        let mut pipeline = Pipeline::from_text(
            "hadamard on qubit 0 then cnot from qubit 0 to qubit 2",
            EngineConfig::default(),
        );
        let report = block_on(pipeline.run()).unwrap();

        assert_eq!(report.origin, InstructionOrigin::Custom);
        assert_eq!(report.circuit().num_qubits(), 3);
        assert_eq!(report.circuit().gates()[1], Gate::Cx(0, 2));
        assert!(report.assembly.measurements_appended);
        assert!(report.is_clean());
    }

    #[test]
    fn test_run_from_source() {
        let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\n\
                    h q[0];\ncx q[0],q[1];\nmeasure q[0] -> c[0];\nmeasure q[1] -> c[1];\n";
        let mut pipeline = Pipeline::from_source(
            qasm.as_bytes(),
            SourceFormat::Qasm,
            None,
            EngineConfig::templates_only(),
        );
        let report = block_on(pipeline.run()).unwrap();

        assert!(report.cleaned_source.is_some());
        assert!(!report.assembly.measurements_appended);
        assert_eq!(report.circuit().count_measurements(), 2);
        assert!(report.exports.is_empty());
    }

    #[test]
    fn test_image_without_model_is_an_error() {
        let mut pipeline = Pipeline::from_source(
            vec![0x89, 0x50],
            SourceFormat::Image("image/png".into()),
            None,
            EngineConfig::default(),
        );
        let err = block_on(pipeline.run()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Suggest(SuggestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_request_rejects_unknown_type() {
        let result = Pipeline::from_request("teleport_me", IntentParams::new(), EngineConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::Core(QcgenError::InvalidCircuitType(_)))
        ));

        let mut pipeline =
            Pipeline::from_request("bell_state", IntentParams::new(), EngineConfig::default())
                .unwrap();
        let report = block_on(pipeline.run()).unwrap();
        assert_eq!(report.origin, InstructionOrigin::Template);
        assert_eq!(report.circuit().gate_count(), 4);
    }

    #[test]
    fn test_report_json() {
        let intent = CircuitIntent::custom(["h 0", "frobnicate 1", "cx 0 1"]);
        let mut pipeline = Pipeline::from_intent(intent, EngineConfig::default());
        let report = block_on(pipeline.run()).unwrap();

        let summary = report.to_json();
        assert_eq!(summary["origin"], "custom");
        assert_eq!(summary["skipped"][0]["index"], 1);
        assert_eq!(summary["applied"], json!(["h 0", "cx 0 1"]));
        assert!(summary["exports"]["json"]["operations"].is_array());
    }

    #[test]
    fn test_reset() {
        let mut pipeline = Pipeline::from_text("bell", EngineConfig::default());
        block_on(pipeline.assemble()).unwrap();
        assert!(pipeline.state().is_assembled());

        pipeline.reset();
        assert_eq!(pipeline.stage(), PipelineStage::Initial);
        assert!(!pipeline.state().is_assembled());
    }
}
