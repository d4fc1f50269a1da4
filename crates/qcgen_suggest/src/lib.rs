//! # QCGen Suggest
//!
//! Instruction suggesters for the Quantum Circuit Generator: a
//! chat-completions client that asks a language model for gate sequences,
//! and a rule-based fallback that needs no network access.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcgen_suggest // L5: Suggest
//!     L5_Suggest // 명령 제안
//!         Auth // API 키, 모델, 자격 증명 파일
//!         Client // chat-completions REST 클라이언트
//!         Prompt // 시스템 프롬프트, 교정 문구
//!         Flatten // 그룹화된 응답 평탄화
//!         Suggester // InstructionSuggester trait
//!         LlmSuggester // 언어 모델 제안자
//!         RuleBasedSuggester // 키워드 + 게이트 구절
//!         SourceScan // QASM / Qiskit / JSON 로컬 해석
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcgen_suggest::prelude::*;
//!
//! let intent = RuleBasedSuggester::new()
//!     .parse_text("hadamard on qubit 0, then cnot from qubit 0 to qubit 1");
//!
//! assert_eq!(intent.circuit_type, CircuitType::Custom);
//! assert_eq!(
//!     intent.params.custom_gates,
//!     Some(vec!["h 0".to_string(), "cx 0 1".to_string()])
//! );
//! ```
//!
//! ## Language-model Suggester
//!
//! ```rust,ignore
//! use qcgen_suggest::prelude::*;
//!
//! // QCGEN_API_KEY / OPENAI_API_KEY, or ~/.qcgen/credentials.json
//! let suggester = LlmSuggester::auto()?;
//! let gates = suggester.suggest(CircuitType::GhzState, &IntentParams::new()).await?;
//! ```
//!
//! ## Environment Variables
//!
//! ```bash
//! export QCGEN_API_KEY="sk-..."          # Or OPENAI_API_KEY
//! export QCGEN_MODEL="gpt-3.5-turbo"     # Optional
//! export QCGEN_VISION_MODEL="gpt-4o"     # Optional
//! export QCGEN_BASE_URL="https://api.openai.com/v1"  # Optional
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Credentials (Gantree: L5_Suggest → Auth)
pub mod auth;

/// Chat-completions client (Gantree: L5_Suggest → Client)
pub mod client;

/// Prompt text (Gantree: L5_Suggest → Prompt)
pub mod prompt;

/// Reply flattening (Gantree: L5_Suggest → Flatten)
pub mod flatten;

/// Suggester trait (Gantree: L5_Suggest → Suggester)
pub mod suggester;

/// Language-model suggester (Gantree: L5_Suggest → LlmSuggester)
pub mod llm;

/// Rule-based suggester (Gantree: L5_Suggest → RuleBasedSuggester)
pub mod rules;

/// Local source scanners (Gantree: L5_Suggest → SourceScan)
pub mod scan;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{AuthError, SuggesterCredentials};
pub use client::{ChatClient, ChatCompletion, ChatMessage, ChatRequest, ClientError};
pub use flatten::{flatten_instructions, parse_json_reply};
pub use llm::LlmSuggester;
pub use rules::RuleBasedSuggester;
pub use scan::{scan_json, scan_qasm, scan_qiskit, ScannedSource};
pub use suggester::{
    InstructionSuggester, SourceFormat, SourceSuggestion, SuggestError, SuggestResult,
};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::auth::SuggesterCredentials;
    pub use crate::client::{ChatClient, ChatCompletion};
    pub use crate::llm::LlmSuggester;
    pub use crate::rules::RuleBasedSuggester;
    pub use crate::suggester::{
        InstructionSuggester, SourceFormat, SourceSuggestion, SuggestError, SuggestResult,
    };
    pub use qcgen_core::{CircuitIntent, CircuitType, IntentParams};
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
