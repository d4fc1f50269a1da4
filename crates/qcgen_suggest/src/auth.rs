//! Suggester credentials
//!
//! Gantree: L5_Suggest → Auth
//!
//! Credential sources (in priority order):
//! 1. Environment variables (QCGEN_API_KEY, OPENAI_API_KEY)
//! 2. Credentials file (~/.qcgen/credentials.json)
//!
//! Model and endpoint overrides come from QCGEN_MODEL, QCGEN_VISION_MODEL
//! and QCGEN_BASE_URL, or from the matching keys of the credentials file.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Chat-completions endpoint root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for text requests
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Model used for image requests
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing API key
    #[error("Suggester API key not provided. Set QCGEN_API_KEY or OPENAI_API_KEY, or write ~/.qcgen/credentials.json")]
    MissingKey,

    /// Key cannot be sent as a header
    #[error("Invalid API key format")]
    InvalidKeyFormat,

    /// Rejected by the service
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Credentials file read error
    #[error("Failed to read credentials file: {0}")]
    ConfigFileError(String),

    /// Credentials file parse error
    #[error("Failed to parse credentials file: {0}")]
    ConfigParseError(String),
}

/// Credentials file entry (~/.qcgen/credentials.json)
#[derive(Debug, Clone, Deserialize)]
struct CredentialsFile {
    api_key: String,

    #[serde(default)]
    model: Option<String>,

    #[serde(default)]
    vision_model: Option<String>,

    #[serde(default)]
    base_url: Option<String>,
}

/// Credentials and model selection for the chat-completions service
/// Gantree: SuggesterCredentials // 인증 정보
#[derive(Clone)]
pub struct SuggesterCredentials {
    api_key: String,
    model: String,
    vision_model: String,
    base_url: String,
}

impl fmt::Debug for SuggesterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggesterCredentials")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("vision_model", &self.vision_model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SuggesterCredentials {
    /// Create credentials with default models and endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variables
    /// Gantree: from_env() -> Result<Self> // 환경 변수
    pub fn from_env() -> Result<Self, AuthError> {
        let key = std::env::var("QCGEN_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| AuthError::MissingKey)?;

        let mut creds = Self::new(key);
        if let Ok(model) = std::env::var("QCGEN_MODEL") {
            creds.model = model;
        }
        if let Ok(model) = std::env::var("QCGEN_VISION_MODEL") {
            creds.vision_model = model;
        }
        if let Ok(url) = std::env::var("QCGEN_BASE_URL") {
            creds.base_url = url;
        }
        Ok(creds)
    }

    /// Path of the credentials file (~/.qcgen/credentials.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qcgen").join("credentials.json"))
    }

    /// Load from ~/.qcgen/credentials.json
    pub fn from_config_file() -> Result<Self, AuthError> {
        let path = Self::config_path().ok_or_else(|| {
            AuthError::ConfigFileError("Could not determine home directory".into())
        })?;
        Self::from_file(&path)
    }

    /// Load from a credentials file at `path`
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::ConfigFileError(format!(
                "credentials file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AuthError::ConfigFileError(format!("{}: {}", path.display(), e)))?;
        let creds = Self::parse_config(&content)?;

        log::info!("Loaded suggester credentials from {}", path.display());
        Ok(creds)
    }

    /// Parse the JSON body of a credentials file
    pub fn parse_config(content: &str) -> Result<Self, AuthError> {
        let file: CredentialsFile = serde_json::from_str(content)
            .map_err(|e| AuthError::ConfigParseError(e.to_string()))?;

        let mut creds = Self::new(file.api_key);
        if let Some(model) = file.model {
            creds.model = model;
        }
        if let Some(model) = file.vision_model {
            creds.vision_model = model;
        }
        if let Some(url) = file.base_url {
            creds.base_url = url;
        }
        Ok(creds)
    }

    /// Auto-detect credentials (environment first, then the credentials file)
    /// Gantree: auto_load() -> Result<Self> // 자동 탐지
    pub fn auto_load() -> Result<Self, AuthError> {
        if let Ok(creds) = Self::from_env() {
            log::info!("Loaded suggester credentials from environment variables");
            return Ok(creds);
        }

        if let Ok(creds) = Self::from_config_file() {
            return Ok(creds);
        }

        Err(AuthError::MissingKey)
    }

    /// Set text model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set vision model
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Set endpoint root
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get text model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get vision model
    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    /// Get endpoint root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Basic format check
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.api_key.trim().is_empty() {
            return Err(AuthError::MissingKey);
        }
        if self.api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AuthError::InvalidKeyFormat);
        }
        Ok(())
    }
}
