//! # QCGen Engine
//!
//! Intent resolution, staged circuit generation, and circuit exports.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcgen_engine // L6: Engine
//!     EngineConfig // 엔진 설정
//!         qubit ceilings, prefer_templates, append_measurements
//!         default_instructions, exports
//!     Templates // 내장 생성기
//!         bell, ghz, teleportation, qft3
//!         deutsch_jozsa, bernstein_vazirani, superdense, skeleton
//!     IntentResolver // 의도 해석 파사드
//!         custom → suggester → template → skeleton
//!     Export // QASM / JSON / Qiskit
//!     Pipeline // 단계별 실행
//!         resolve() → assemble() → export()
//!         run() - 전체 파이프라인
//!     QcgenEngine // 동기 엔진 (tokio Runtime 소유)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcgen_engine::prelude::*;
//!
//! let engine = QcgenEngine::new(EngineConfig::default()).unwrap();
//! let report = engine.generate_from_text("Create a Bell state").unwrap();
//!
//! assert_eq!(report.intent.circuit_type, CircuitType::BellState);
//! assert_eq!(report.circuit().num_qubits(), 2);
//! println!("{}", report.exports.qasm.unwrap_or_default());
//! ```
//!
//! ## Using Pipeline
//!
//! ```rust
//! use qcgen_engine::prelude::*;
//!
//! let mut pipeline = Pipeline::from_intent(
//!     CircuitIntent::custom(["h 0", "cx 0 1", "measure 0 -> 0"]),
//!     EngineConfig::templates_only(),
//! );
//!
//! tokio_test::block_on(async {
//!     pipeline.resolve().await.unwrap();
//!     let assembly = pipeline.assemble().await.unwrap();
//!     assert!(!assembly.measurements_appended);
//! });
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Configuration (Gantree: L6_Engine → EngineConfig)
pub mod config;

/// Errors (Gantree: L6_Engine → EngineError)
pub mod error;

/// Built-in generators (Gantree: L6_Engine → Templates)
pub mod templates;

/// Intent resolution facade (Gantree: L6_Engine → IntentResolver)
pub mod facade;

/// Circuit exports (Gantree: L6_Engine → Export)
pub mod export;

/// Staged pipeline (Gantree: L6_Engine → Pipeline)
pub mod pipeline;

/// Blocking engine (Gantree: L6_Engine → QcgenEngine)
pub mod engine;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{EngineConfig, ExportSwitches};
pub use engine::QcgenEngine;
pub use error::{EngineError, EngineResult};
pub use export::{to_json, to_qasm, to_qiskit, ExportMeta, Exports};
pub use facade::{InstructionOrigin, IntentResolver, ResolvedInstructions};
pub use pipeline::{CircuitReport, Pipeline, PipelineInput, PipelineStage, PipelineState};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{EngineConfig, ExportSwitches};
    pub use crate::engine::QcgenEngine;
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::export::Exports;
    pub use crate::facade::{InstructionOrigin, IntentResolver};
    pub use crate::pipeline::{CircuitReport, Pipeline, PipelineStage};
    pub use qcgen_core::prelude::*;
    pub use qcgen_suggest::{InstructionSuggester, SourceFormat};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use async_trait::async_trait;
    use qcgen_suggest::{SourceSuggestion, SuggestError, SuggestResult};
    use std::sync::Arc;

    /// Model stand-in: grouped gates for any request, fails interpretation
    struct GroupingSuggester;

    #[async_trait]
    impl InstructionSuggester for GroupingSuggester {
        fn name(&self) -> &str {
            "grouping"
        }

        async fn suggest(&self, _: CircuitType, _: &IntentParams) -> SuggestResult<Vec<String>> {
            let reply = serde_json::json!({
                "single_qubit_gates": ["h 0"],
                "two_qubit_gates": ["cx 0 1"],
            });
            Ok(qcgen_suggest::flatten_instructions(&reply))
        }

        async fn interpret(&self, _: &str) -> SuggestResult<CircuitIntent> {
            Err(SuggestError::EmptySuggestion)
        }

        async fn suggest_from_source(
            &self,
            _: &[u8],
            _: &SourceFormat,
            _: Option<&str>,
        ) -> SuggestResult<SourceSuggestion> {
            Err(SuggestError::EmptySuggestion)
        }
    }

    fn engine() -> QcgenEngine {
        QcgenEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_scenario_bell_pair() {
        let report = engine()
            .generate_from_intent(CircuitIntent::custom(["h 0", "cx 0 1"]))
            .unwrap();

        assert_eq!(
            report.circuit().gates(),
            &[
                Gate::H(0),
                Gate::Cx(0, 1),
                Gate::Measure(0, 0),
                Gate::Measure(1, 1)
            ]
        );
        let qasm = report.exports.qasm.unwrap();
        assert!(qasm.contains("cx q[0],q[1];"));
    }

    #[test]
    fn test_scenario_parenthesized_rotation() {
        let intent = CircuitIntent::new(CircuitType::Custom).with_params(
            IntentParams::new()
                .with_num_qubits(1)
                .with_custom_gates(["rx(pi/2) 0"]),
        );
        let report = engine().generate_from_intent(intent).unwrap();

        match &report.circuit().gates()[0] {
            Gate::Rx(0, theta) => {
                assert_abs_diff_eq!(*theta, std::f64::consts::FRAC_PI_2, epsilon = 1e-12)
            }
            other => panic!("expected rx, got {:?}", other),
        }
        assert_eq!(report.circuit().gates()[1], Gate::Measure(0, 0));
    }

    #[test]
    fn test_scenario_arrow_measure() {
        let report = engine()
            .generate_from_intent(CircuitIntent::custom(["measure 0 0 -> 0"]))
            .unwrap();

        assert_eq!(report.assembly.canonical_strings(), vec!["measure 0 0"]);
        assert_eq!(report.circuit().gates(), &[Gate::Measure(0, 0)]);
    }

    #[test]
    fn test_scenario_grouped_suggestion() {
        let engine = engine().with_suggester(Arc::new(GroupingSuggester));
        assert_eq!(engine.suggester_name(), Some("grouping"));

        // Interpretation fails over to rules; the suggester still supplies gates
        let report = engine.generate_from_text("entangled pair please").unwrap();
        assert_eq!(report.intent.circuit_type, CircuitType::BellState);
        assert_eq!(report.origin, InstructionOrigin::Suggested);
        assert_eq!(report.raw_instructions, vec!["h 0", "cx 0 1"]);
        assert_eq!(report.circuit().gate_count(), 4);
    }

    #[test]
    fn test_json_export_reads_back() {
        let engine = engine();
        let first = engine
            .generate_from_intent(CircuitIntent::custom([
                "h 0",
                "rz 1 0.25",
                "measure 0 -> 0",
                "if(c[0]==1) x 1",
            ]))
            .unwrap();
        let document = serde_json::to_vec(&first.exports.json.clone().unwrap()).unwrap();

        let second = engine
            .generate_from_source(&document, SourceFormat::Json, None)
            .unwrap();
        assert_eq!(second.circuit().gates(), first.circuit().gates());
        assert_eq!(second.circuit().num_qubits(), first.circuit().num_qubits());
    }

    #[test]
    fn test_qiskit_export_reads_back() {
        let engine = engine();
        let first = engine
            .generate_from_intent(CircuitIntent::custom(["h 0", "cp 0 2 0.5", "swap 1 2"]))
            .unwrap();
        let listing = first.exports.qiskit.clone().unwrap();

        let second = engine
            .generate_from_source(listing.as_bytes(), SourceFormat::Qiskit, None)
            .unwrap();
        assert_eq!(second.circuit().gates(), first.circuit().gates());
    }

    #[test]
    fn test_version() {
        assert!(!crate::VERSION.is_empty());
        assert_eq!(crate::NAME, "qcgen_engine");
    }
}
