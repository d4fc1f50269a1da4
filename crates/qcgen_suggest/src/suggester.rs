//! Instruction suggester interface
//!
//! Gantree: L5_Suggest → Suggester

use crate::auth::AuthError;
use crate::client::ClientError;
use async_trait::async_trait;
use qcgen_core::{CircuitIntent, CircuitType, IntentParams, QcgenError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Suggester errors
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Transport or service failure
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Reply was not usable JSON
    #[error("Malformed suggester reply: {0}")]
    MalformedResponse(String),

    /// Reply held no instructions
    #[error("Suggester returned no instructions")]
    EmptySuggestion,

    /// Source format this suggester cannot read
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Source bytes could not be read
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] QcgenError),
}

impl From<AuthError> for SuggestError {
    fn from(e: AuthError) -> Self {
        SuggestError::Client(ClientError::Auth(e))
    }
}

/// Result type for suggester operations
pub type SuggestResult<T> = Result<T, SuggestError>;

// ============================================================================
// Source Format
// ============================================================================

/// Format of an uploaded source
/// Gantree: SourceFormat // 업로드 형식
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// OpenQASM text
    Qasm,
    /// Qiskit Python code
    Qiskit,
    /// JSON circuit description
    Json,
    /// Circuit diagram image with its MIME type (`image/png`)
    Image(String),
}

impl SourceFormat {
    /// Detect from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "qasm" => Some(SourceFormat::Qasm),
            "py" => Some(SourceFormat::Qiskit),
            "json" => Some(SourceFormat::Json),
            "png" => Some(SourceFormat::Image("image/png".into())),
            "jpg" | "jpeg" => Some(SourceFormat::Image("image/jpeg".into())),
            "gif" => Some(SourceFormat::Image("image/gif".into())),
            "webp" => Some(SourceFormat::Image("image/webp".into())),
            _ => None,
        }
    }

    /// Check if this is an image
    pub fn is_image(&self) -> bool {
        matches!(self, SourceFormat::Image(_))
    }

    /// Short label (`QASM`, `QISKIT`, `JSON`, `IMAGE`)
    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Qasm => "QASM",
            SourceFormat::Qiskit => "QISKIT",
            SourceFormat::Json => "JSON",
            SourceFormat::Image(_) => "IMAGE",
        }
    }

    /// Reply key holding the cleaned source
    pub fn cleaned_key(&self) -> &'static str {
        match self {
            SourceFormat::Qasm => "cleaned_qasm",
            SourceFormat::Qiskit => "cleaned_code",
            SourceFormat::Json => "cleaned_json",
            SourceFormat::Image(_) => "cleaned_source",
        }
    }
}

impl FromStr for SourceFormat {
    type Err = SuggestError;

    /// `qasm`, `qiskit`, `json`, or `image/<type>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        match token.as_str() {
            "qasm" => Ok(SourceFormat::Qasm),
            "qiskit" => Ok(SourceFormat::Qiskit),
            "json" => Ok(SourceFormat::Json),
            t if t.starts_with("image/") && t.len() > "image/".len() => {
                Ok(SourceFormat::Image(token))
            }
            _ => Err(SuggestError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Qasm => write!(f, "qasm"),
            SourceFormat::Qiskit => write!(f, "qiskit"),
            SourceFormat::Json => write!(f, "json"),
            SourceFormat::Image(mime) => write!(f, "{}", mime),
        }
    }
}

// ============================================================================
// Source Suggestion
// ============================================================================

/// What a suggester read out of an uploaded source
/// Gantree: SourceSuggestion // 업로드 해석 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSuggestion {
    /// Source text after cleanup (empty for images)
    pub cleaned_source: String,
    /// Qubit count read from the source
    pub num_qubits: usize,
    /// Human-readable description
    pub description: String,
    /// Raw instructions, not yet normalized
    pub instructions: Vec<String>,
}

impl SourceSuggestion {
    /// Custom intent carrying this suggestion
    pub fn into_intent(self) -> CircuitIntent {
        let params = IntentParams::new()
            .with_num_qubits(self.num_qubits)
            .with_custom_gates(self.instructions)
            .with_description(self.description);
        CircuitIntent::new(CircuitType::Custom).with_params(params)
    }
}

// ============================================================================
// Trait
// ============================================================================

/// Proposes raw instruction lists for the assembler
///
/// Implementations may call out to a remote model or work locally. Every
/// returned instruction is raw: callers run it through the normalizer.
/// Gantree: InstructionSuggester // 명령 제안자
#[async_trait]
pub trait InstructionSuggester: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Instructions implementing `circuit_type` with `params`
    /// Gantree: suggest(CircuitType, &IntentParams) -> Vec<String> // 알고리즘 제안
    async fn suggest(
        &self,
        circuit_type: CircuitType,
        params: &IntentParams,
    ) -> SuggestResult<Vec<String>>;

    /// Read a free-text request into an intent
    /// Gantree: interpret(&str) -> CircuitIntent // 텍스트 해석
    async fn interpret(&self, text: &str) -> SuggestResult<CircuitIntent>;

    /// Read an uploaded source or diagram
    /// Gantree: suggest_from_source(&[u8], &SourceFormat, Option<&str>) -> SourceSuggestion // 업로드 해석
    async fn suggest_from_source(
        &self,
        source: &[u8],
        format: &SourceFormat,
        description: Option<&str>,
    ) -> SuggestResult<SourceSuggestion>;
}
