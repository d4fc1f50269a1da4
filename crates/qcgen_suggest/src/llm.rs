//! Chat-completions suggester
//!
//! Gantree: L5_Suggest → LlmSuggester
//!
//! Every reply goes through [`parse_json_reply`] and
//! [`flatten_instructions`] before the instructions are tidied with
//! [`prepare_suggested`]. Source interpretation re-asks up to
//! `MAX_SHAPE_ATTEMPTS` times when the `gates` field is not a flat list.

use crate::auth::SuggesterCredentials;
use crate::client::{ChatClient, ChatCompletion, ChatMessage, ChatRequest, ClientError};
use crate::flatten::{flatten_instructions, is_flat_instruction_list, parse_json_reply};
use crate::prompt;
use crate::suggester::{
    InstructionSuggester, SourceFormat, SourceSuggestion, SuggestError, SuggestResult,
};
use async_trait::async_trait;
use qcgen_core::constants::limits::{clamp_qubits, MAX_ASSEMBLY_QUBITS, MAX_INTENT_QUBITS};
use qcgen_core::constants::suggest::MAX_SHAPE_ATTEMPTS;
use qcgen_core::{prepare_suggested, CircuitIntent, CircuitType, Explanation, IntentParams};
use serde_json::Value;

/// Qubit count assumed when a reply omits it
const DEFAULT_REPLY_QUBITS: usize = 2;

/// Reply length cap for image requests
const IMAGE_MAX_TOKENS: u32 = 2000;

/// Suggester backed by a chat-completions model
/// Gantree: LlmSuggester // 언어 모델 제안자
pub struct LlmSuggester<C = ChatClient> {
    completion: C,
    max_shape_attempts: usize,
}

impl LlmSuggester<ChatClient> {
    /// Build a client from credentials
    pub fn from_credentials(credentials: SuggesterCredentials) -> Result<Self, ClientError> {
        Ok(Self::new(ChatClient::new(credentials)?))
    }

    /// Build from auto-detected credentials
    pub fn auto() -> Result<Self, ClientError> {
        Self::from_credentials(SuggesterCredentials::auto_load()?)
    }
}

impl<C: ChatCompletion> LlmSuggester<C> {
    /// Wrap a completion backend
    pub fn new(completion: C) -> Self {
        Self {
            completion,
            max_shape_attempts: MAX_SHAPE_ATTEMPTS,
        }
    }

    /// Override the number of shape-correction attempts (at least 1)
    pub fn with_shape_attempts(mut self, attempts: usize) -> Self {
        self.max_shape_attempts = attempts.max(1);
        self
    }

    /// Completion backend
    pub fn completion(&self) -> &C {
        &self.completion
    }

    async fn ask_json(&self, request: &ChatRequest) -> SuggestResult<Value> {
        let reply = self.completion.chat(request).await?;
        parse_json_reply(&reply).ok_or_else(|| SuggestError::MalformedResponse(preview(&reply)))
    }

    /// Source text: ask, and re-ask with a correction while `gates` is not flat
    async fn read_source_text(
        &self,
        text: &str,
        format: &SourceFormat,
        description: Option<&str>,
    ) -> SuggestResult<SourceSuggestion> {
        let mut system = prompt::source_system(format, description);
        let mut last: Option<Value> = None;

        for attempt in 1..=self.max_shape_attempts {
            let request = ChatRequest::new(self.completion.text_model())
                .system(system.clone())
                .user(text)
                .json_mode();

            match self.ask_json(&request).await {
                Ok(value) => {
                    let gates = value.get("gates").cloned().unwrap_or(Value::Null);
                    if is_flat_instruction_list(&gates) {
                        last = Some(value);
                        break;
                    }
                    log::warn!(
                        "attempt {}: gates not a flat list, retrying with a correction",
                        attempt
                    );
                    system.push_str(if gates.is_object() {
                        prompt::GROUPED_CORRECTION
                    } else {
                        prompt::SHAPE_CORRECTION
                    });
                    last = Some(value);
                }
                Err(SuggestError::MalformedResponse(reply)) => {
                    log::warn!("attempt {}: reply was not JSON: {}", attempt, reply);
                    system.push_str(prompt::SHAPE_CORRECTION);
                }
                Err(e) => return Err(e),
            }
        }

        let value = last.ok_or_else(|| {
            SuggestError::MalformedResponse(format!(
                "no JSON reply after {} attempt(s)",
                self.max_shape_attempts
            ))
        })?;
        source_from_reply(&value, format)
    }

    async fn read_image(
        &self,
        image: &[u8],
        mime: &str,
        description: Option<&str>,
    ) -> SuggestResult<SourceSuggestion> {
        let request = ChatRequest::new(self.completion.vision_model())
            .system(prompt::image_system(description))
            .message(ChatMessage::user_with_image(prompt::IMAGE_USER_TEXT, mime, image))
            .with_max_tokens(IMAGE_MAX_TOKENS);

        let value = self.ask_json(&request).await?;
        image_from_reply(&value)
    }
}

#[async_trait]
impl<C: ChatCompletion> InstructionSuggester for LlmSuggester<C> {
    fn name(&self) -> &str {
        "llm"
    }

    async fn suggest(
        &self,
        circuit_type: CircuitType,
        params: &IntentParams,
    ) -> SuggestResult<Vec<String>> {
        let request = ChatRequest::new(self.completion.text_model())
            .system(prompt::suggest_system())
            .user(prompt::describe_request(circuit_type, params))
            .json_mode()
            .with_temperature(0.2);

        let value = self.ask_json(&request).await?;
        let instructions = prepare_suggested(&flatten_instructions(&value));
        if instructions.is_empty() {
            return Err(SuggestError::EmptySuggestion);
        }
        log::debug!(
            "{} suggested {} instruction(s) for {}",
            self.name(),
            instructions.len(),
            circuit_type
        );
        Ok(instructions)
    }

    async fn interpret(&self, text: &str) -> SuggestResult<CircuitIntent> {
        let request = ChatRequest::new(self.completion.text_model())
            .system(prompt::interpret_system())
            .user(text)
            .json_mode();

        let value = self.ask_json(&request).await?;
        Ok(intent_from_reply(&value))
    }

    async fn suggest_from_source(
        &self,
        source: &[u8],
        format: &SourceFormat,
        description: Option<&str>,
    ) -> SuggestResult<SourceSuggestion> {
        match format {
            SourceFormat::Image(mime) => self.read_image(source, mime, description).await,
            _ => {
                let text = std::str::from_utf8(source)
                    .map_err(|e| SuggestError::InvalidSource(e.to_string()))?;
                self.read_source_text(text, format, description).await
            }
        }
    }
}

// ============================================================================
// Reply Readers
// ============================================================================

/// Build an intent from an interpretation reply
///
/// An unrecognized `circuit_type` reads as `unknown`. Only custom intents
/// keep `custom_gates`.
/// Gantree: intent_from_reply(&Value) -> CircuitIntent // 응답 → 의도
pub fn intent_from_reply(value: &Value) -> CircuitIntent {
    let circuit_type = value
        .get("circuit_type")
        .and_then(Value::as_str)
        .map(|token| {
            token.parse().unwrap_or_else(|_| {
                log::warn!("unrecognized circuit type '{}', using unknown", token);
                CircuitType::Unknown
            })
        })
        .unwrap_or(CircuitType::Unknown);

    let mut params = value
        .get("params")
        .map(IntentParams::from_value)
        .unwrap_or_default();
    params.num_qubits = Some(clamp_qubits(
        count_field(value, "num_qubits").unwrap_or(DEFAULT_REPLY_QUBITS),
        MAX_INTENT_QUBITS,
    ));

    if circuit_type == CircuitType::Custom {
        let description = text_field(value, "custom_description")
            .unwrap_or_else(|| "Custom quantum circuit".to_string());
        let gates = value
            .get("custom_gates")
            .map(flatten_instructions)
            .unwrap_or_default();
        params.custom_description = Some(description);
        params.custom_gates = Some(prepare_suggested(&gates));
    }

    let mut intent = CircuitIntent::new(circuit_type).with_params(params);
    if let Some(explanation) = value
        .get("explanation")
        .and_then(|e| serde_json::from_value::<Explanation>(e.clone()).ok())
    {
        intent = intent.with_explanation(explanation);
    }
    intent
}

/// Build a source suggestion from a source-cleaning reply
pub fn source_from_reply(value: &Value, format: &SourceFormat) -> SuggestResult<SourceSuggestion> {
    let gates = value
        .get("gates")
        .map(flatten_instructions)
        .unwrap_or_default();
    let instructions = prepare_suggested(&gates);
    if instructions.is_empty() {
        return Err(SuggestError::EmptySuggestion);
    }
    log::info!(
        "read {} instruction(s) from {} source",
        instructions.len(),
        format.label()
    );

    Ok(SourceSuggestion {
        cleaned_source: text_field(value, format.cleaned_key()).unwrap_or_default(),
        num_qubits: clamp_qubits(
            count_field(value, "num_qubits").unwrap_or(DEFAULT_REPLY_QUBITS),
            MAX_ASSEMBLY_QUBITS,
        ),
        description: text_field(value, "description")
            .unwrap_or_else(|| format!("Imported {} circuit", format.label())),
        instructions,
    })
}

/// Build a source suggestion from a diagram-reading reply
pub fn image_from_reply(value: &Value) -> SuggestResult<SourceSuggestion> {
    let gates = value
        .get("custom_gates")
        .or_else(|| value.get("gates"))
        .map(flatten_instructions)
        .unwrap_or_default();
    let instructions = prepare_suggested(&gates);
    if instructions.is_empty() {
        return Err(SuggestError::EmptySuggestion);
    }

    let description = text_field(value, "custom_description")
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "Circuit read from a diagram".to_string());

    Ok(SourceSuggestion {
        cleaned_source: String::new(),
        num_qubits: clamp_qubits(
            count_field(value, "num_qubits").unwrap_or(DEFAULT_REPLY_QUBITS),
            MAX_INTENT_QUBITS,
        ),
        description,
        instructions,
    })
}

fn count_field(value: &Value, key: &str) -> Option<usize> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn preview(reply: &str) -> String {
    reply.chars().take(200).collect()
}
