//! Blocking engine
//!
//! Gantree: L6_Engine → QcgenEngine
//!
//! Synchronous entry point that owns a tokio runtime and runs one
//! [`Pipeline`] per request. Requests share only the read-only
//! configuration and suggester.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::pipeline::{CircuitReport, Pipeline};
use qcgen_core::{CircuitIntent, IntentParams};
use qcgen_suggest::{InstructionSuggester, LlmSuggester, SourceFormat, SuggestError};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Circuit generator with a blocking API
/// Gantree: QcgenEngine // 동기 엔진
pub struct QcgenEngine {
    /// Configuration
    config: EngineConfig,

    /// Optional suggester shared by every request
    suggester: Option<Arc<dyn InstructionSuggester>>,

    /// Tokio runtime for async operations
    runtime: Runtime,
}

impl QcgenEngine {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an engine with no suggester (rules and built-in generators only)
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        let runtime = Runtime::new().map_err(|e| EngineError::Runtime(e.to_string()))?;
        Ok(Self {
            config,
            suggester: None,
            runtime,
        })
    }

    /// Create an engine, attaching a language-model suggester when credentials load
    ///
    /// Credentials are looked up in:
    /// 1. Environment variables (QCGEN_API_KEY, OPENAI_API_KEY, ...)
    /// 2. ~/.qcgen/credentials.json
    pub fn auto(config: EngineConfig) -> EngineResult<Self> {
        let engine = Self::new(config)?;
        match LlmSuggester::auto() {
            Ok(suggester) => {
                log::info!("language-model suggester enabled");
                Ok(engine.with_suggester(Arc::new(suggester)))
            }
            Err(e) => {
                log::info!("no language-model suggester ({}), using rules", e);
                Ok(engine)
            }
        }
    }

    /// Attach a suggester
    pub fn with_suggester(mut self, suggester: Arc<dyn InstructionSuggester>) -> Self {
        self.suggester = Some(suggester);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the attached suggester
    pub fn suggester_name(&self) -> Option<&str> {
        self.suggester.as_deref().map(|s| s.name())
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Generate from free text
    pub fn generate_from_text(&self, text: &str) -> EngineResult<CircuitReport> {
        self.run(Pipeline::from_text(text, self.config.clone()))
    }

    /// Generate from an intent
    pub fn generate_from_intent(&self, intent: CircuitIntent) -> EngineResult<CircuitReport> {
        self.run(Pipeline::from_intent(intent, self.config.clone()))
    }

    /// Generate from a circuit-type token and parameters
    pub fn generate(&self, circuit_type: &str, params: IntentParams) -> EngineResult<CircuitReport> {
        self.run(Pipeline::from_request(
            circuit_type,
            params,
            self.config.clone(),
        )?)
    }

    /// Generate from an uploaded source
    pub fn generate_from_source(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        description: Option<&str>,
    ) -> EngineResult<CircuitReport> {
        self.run(Pipeline::from_source(
            bytes,
            format,
            description.map(str::to_string),
            self.config.clone(),
        ))
    }

    /// Generate from a file, taking the format from its extension
    pub fn generate_from_file(
        &self,
        path: impl AsRef<Path>,
        description: Option<&str>,
    ) -> EngineResult<CircuitReport> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = SourceFormat::from_extension(extension).ok_or_else(|| {
            SuggestError::UnsupportedFormat(format!("file extension '{}'", extension))
        })?;

        let bytes = std::fs::read(path)?;
        log::info!("read {} bytes of {} from {}", bytes.len(), format, path.display());
        self.generate_from_source(&bytes, format, description)
    }

    fn run(&self, pipeline: Pipeline) -> EngineResult<CircuitReport> {
        let mut pipeline = match &self.suggester {
            Some(suggester) => pipeline.with_suggester(Arc::clone(suggester)),
            None => pipeline,
        };
        self.runtime.block_on(pipeline.run())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::InstructionOrigin;
    use qcgen_core::{CircuitType, Gate};
    use std::io::Write;

    fn engine() -> QcgenEngine {
        QcgenEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = QcgenEngine::new(EngineConfig::default().with_max_assembly_qubits(0));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_generate_family() {
        let engine = engine();
        assert!(engine.suggester_name().is_none());

        let report = engine.generate("ghz_state", IntentParams::new()).unwrap();
        assert_eq!(report.origin, InstructionOrigin::Template);
        assert_eq!(report.circuit().num_qubits(), 3);
    }

    #[test]
    fn test_generate_from_text_and_intent() {
        let engine = engine();

        let report = engine.generate_from_text("teleport a qubit").unwrap();
        assert_eq!(report.intent.circuit_type, CircuitType::Teleportation);

        let report = engine
            .generate_from_intent(CircuitIntent::custom(["x 0", "if(c[0]==1) x 1"]))
            .unwrap();
        assert!(report.circuit().gates()[1].is_conditional());
    }

    #[test]
    fn test_generate_from_file() {
        let dir = std::env::temp_dir().join(format!("qcgen_engine_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bell.py");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "qc = QuantumCircuit(2)\nqc.h(0)\nqc.cx(0, 1)").unwrap();

        let report = engine().generate_from_file(&path, Some("bell")).unwrap();
        assert_eq!(
            report.circuit().gates()[..2],
            [Gate::H(0), Gate::Cx(0, 1)]
        );
        assert_eq!(report.intent.params.custom_description.as_deref(), Some("bell"));

        let bad = engine().generate_from_file(dir.join("bell.txt"), None);
        assert!(matches!(
            bad,
            Err(EngineError::Suggest(SuggestError::UnsupportedFormat(_)))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
