//! Intent resolution
//!
//! Gantree: L6_Engine → IntentResolver
//!
//! Turns a [`CircuitIntent`] into a raw instruction list. Custom intents
//! carry their own instructions; every other family asks the configured
//! suggester and falls back to a built-in generator. Resolution never fails.
//!
//! ```text
//! custom ───────────────> custom_gates | default_instructions
//! family ─┬─ prefer_templates && template ──> Template
//!         ├─ suggester Ok(usable) ──────────> Suggested
//!         └─ otherwise ─> template | skeleton
//! ```

use crate::config::EngineConfig;
use crate::templates;
use qcgen_core::{normalize, CircuitIntent, CircuitType};
use qcgen_suggest::InstructionSuggester;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a resolved instruction list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionOrigin {
    /// The intent's own `custom_gates`
    Custom,
    /// The configured suggester
    Suggested,
    /// A family generator
    Template,
    /// Default instructions or the minimal skeleton
    Fallback,
}

impl fmt::Display for InstructionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstructionOrigin::Custom => "custom",
            InstructionOrigin::Suggested => "suggested",
            InstructionOrigin::Template => "template",
            InstructionOrigin::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

/// Instruction list ready for the assembler
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInstructions {
    /// Intent with `num_qubits` filled in
    pub intent: CircuitIntent,
    /// Raw instructions in source order
    pub instructions: Vec<String>,
    /// How the list was produced
    pub origin: InstructionOrigin,
}

impl ResolvedInstructions {
    fn new(intent: CircuitIntent, instructions: Vec<String>, origin: InstructionOrigin) -> Self {
        log::info!(
            "resolved {} into {} {} instruction(s)",
            intent.circuit_type,
            instructions.len(),
            origin
        );
        Self {
            intent,
            instructions,
            origin,
        }
    }
}

/// Facade over suggester and built-in generators
/// Gantree: IntentResolver // 의도 해석 파사드
#[derive(Clone)]
pub struct IntentResolver {
    suggester: Option<Arc<dyn InstructionSuggester>>,
    config: EngineConfig,
}

impl IntentResolver {
    /// Resolver without a suggester
    pub fn new(config: EngineConfig) -> Self {
        Self {
            suggester: None,
            config,
        }
    }

    /// Attach a suggester
    pub fn with_suggester(mut self, suggester: Arc<dyn InstructionSuggester>) -> Self {
        self.suggester = Some(suggester);
        self
    }

    /// Configured suggester
    pub fn suggester(&self) -> Option<&Arc<dyn InstructionSuggester>> {
        self.suggester.as_ref()
    }

    /// Configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve an intent to raw instructions
    /// Gantree: resolve(&CircuitIntent) -> ResolvedInstructions // 의도 해석
    pub async fn resolve(&self, intent: &CircuitIntent) -> ResolvedInstructions {
        let mut intent = intent.clone();

        if intent.circuit_type == CircuitType::Custom {
            return self.resolve_custom(intent);
        }

        let n = intent.num_qubits_or_default();
        intent.params.num_qubits = Some(n);

        if self.config.prefer_templates {
            if let Some(instructions) = templates::generate(intent.circuit_type, &intent.params, n)
            {
                return ResolvedInstructions::new(intent, instructions, InstructionOrigin::Template);
            }
        }

        if let Some(instructions) = self.ask_suggester(&intent).await {
            return ResolvedInstructions::new(intent, instructions, InstructionOrigin::Suggested);
        }

        match templates::generate(intent.circuit_type, &intent.params, n) {
            Some(instructions) => {
                ResolvedInstructions::new(intent, instructions, InstructionOrigin::Template)
            }
            None => {
                ResolvedInstructions::new(intent, templates::skeleton(n), InstructionOrigin::Fallback)
            }
        }
    }

    fn resolve_custom(&self, intent: CircuitIntent) -> ResolvedInstructions {
        let gates: Vec<String> = intent
            .params
            .custom_gates
            .iter()
            .flatten()
            .filter(|g| !g.trim().is_empty())
            .cloned()
            .collect();

        if gates.is_empty() {
            let defaults = self.config.default_instructions.clone();
            ResolvedInstructions::new(intent, defaults, InstructionOrigin::Fallback)
        } else {
            ResolvedInstructions::new(intent, gates, InstructionOrigin::Custom)
        }
    }

    /// Usable suggester output, or `None` after logging why not
    async fn ask_suggester(&self, intent: &CircuitIntent) -> Option<Vec<String>> {
        let suggester = self.suggester.as_ref()?;

        match suggester.suggest(intent.circuit_type, &intent.params).await {
            Ok(instructions) if is_usable(&instructions) => Some(instructions),
            Ok(_) => {
                log::warn!(
                    "{} suggester returned nothing usable for {}, falling back",
                    suggester.name(),
                    intent.circuit_type
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "{} suggester failed for {}: {}, falling back",
                    suggester.name(),
                    intent.circuit_type,
                    e
                );
                None
            }
        }
    }
}

/// At least one instruction normalizes
fn is_usable(instructions: &[String]) -> bool {
    instructions.iter().any(|i| normalize(i).is_ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use qcgen_core::IntentParams;
    use qcgen_suggest::{SourceFormat, SourceSuggestion, SuggestError, SuggestResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed answer to `suggest` and counts calls
    struct StubSuggester {
        answer: Option<Vec<String>>,
        calls: AtomicUsize,
    }

    impl StubSuggester {
        fn answering(gates: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                answer: Some(gates.iter().map(|g| g.to_string()).collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl InstructionSuggester for StubSuggester {
        fn name(&self) -> &str {
            "stub"
        }

        async fn suggest(&self, _: CircuitType, _: &IntentParams) -> SuggestResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .ok_or_else(|| SuggestError::MalformedResponse("stub".into()))
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

    fn resolve(resolver: &IntentResolver, intent: &CircuitIntent) -> ResolvedInstructions {
        tokio_test::block_on(resolver.resolve(intent))
    }

    #[test]
    fn test_custom_uses_own_gates() {
        let resolver = IntentResolver::new(EngineConfig::default());
        let resolved = resolve(&resolver, &CircuitIntent::custom(["x 0", "", "h 1"]));
        assert_eq!(resolved.origin, InstructionOrigin::Custom);
        assert_eq!(resolved.instructions, vec!["x 0", "h 1"]);
    }

    #[test]
    fn test_custom_without_gates_uses_defaults() {
        let resolver = IntentResolver::new(EngineConfig::default());
        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::Custom));
        assert_eq!(resolved.origin, InstructionOrigin::Fallback);
        assert_eq!(resolved.instructions, vec!["h 0", "cx 0 1"]);
    }

    #[test]
    fn test_family_without_suggester() {
        let resolver = IntentResolver::new(EngineConfig::default());

        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::GhzState));
        assert_eq!(resolved.origin, InstructionOrigin::Template);
        assert_eq!(resolved.intent.params.num_qubits, Some(3));
        assert_eq!(resolved.instructions, vec!["h 0", "cx 0 1", "cx 1 2"]);

        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::Simon));
        assert_eq!(resolved.origin, InstructionOrigin::Fallback);
        assert_eq!(resolved.intent.params.num_qubits, Some(6));
        assert_eq!(resolved.instructions, vec!["h 0", "cx 0 1", "cx 1 2"]);
    }

    #[test]
    fn test_suggester_wins_unless_templates_preferred() {
        let stub = StubSuggester::answering(&["h 0", "h 1", "cx 0 1"]);
        let resolver = IntentResolver::new(EngineConfig::default()).with_suggester(stub.clone());

        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::BellState));
        assert_eq!(resolved.origin, InstructionOrigin::Suggested);
        assert_eq!(resolved.instructions.len(), 3);

        let resolver = IntentResolver::new(EngineConfig::default().with_prefer_templates(true))
            .with_suggester(stub.clone());
        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::BellState));
        assert_eq!(resolved.origin, InstructionOrigin::Template);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        // Families without a generator still ask
        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::Qpe));
        assert_eq!(resolved.origin, InstructionOrigin::Suggested);
    }

    #[test]
    fn test_failure_and_unusable_output_fall_back() {
        let resolver =
            IntentResolver::new(EngineConfig::default()).with_suggester(StubSuggester::failing());
        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::BellState));
        assert_eq!(resolved.origin, InstructionOrigin::Template);
        assert_eq!(resolved.instructions, vec!["h 0", "cx 0 1"]);

        let resolver = IntentResolver::new(EngineConfig::default())
            .with_suggester(StubSuggester::answering(&["teleport 0", "magic"]));
        let resolved = resolve(&resolver, &CircuitIntent::new(CircuitType::Qaoa));
        assert_eq!(resolved.origin, InstructionOrigin::Fallback);
    }

    #[test]
    fn test_explicit_qubits_kept() {
        let resolver = IntentResolver::new(EngineConfig::default());
        let intent = CircuitIntent::new(CircuitType::GhzState)
            .with_params(IntentParams::new().with_num_qubits(5));
        let resolved = resolve(&resolver, &intent);
        assert_eq!(resolved.instructions.len(), 5);
    }
}
