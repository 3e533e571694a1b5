//! Summariser client: one chat request turning chunk text into a diagram.
//!
//! The pipeline depends only on the [`Summarizer`] trait; [`LlmSummarizer`]
//! is the production implementation over an `edgequake-llm` provider, which
//! is handed in rather than held globally so tests can swap in a stub.
//!
//! There is no retry: a failed or empty answer ends the run and the user
//! decides whether to try again.

use crate::config::MindmapConfig;
use crate::error::MindmapError;
use crate::pipeline::chunk::ChunkSequence;
use crate::prompts::{user_prompt, DEFAULT_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Separator placed between chunk texts in the request.
pub const CHUNK_SEPARATOR: &str = "\n";

/// Environment variables that count as "a credential is configured".
pub const CREDENTIAL_ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "AZURE_OPENAI_API_KEY",
    "MISTRAL_API_KEY",
    "OPENROUTER_API_KEY",
    "XAI_API_KEY",
    "OLLAMA_HOST",
    "EDGEQUAKE_LLM_PROVIDER",
];

/// The unstructured text a summariser returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResponse {
    /// Response text, trimmed. May or may not hold a diagram block.
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl SummaryResponse {
    /// A response with no token accounting.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            input_tokens: 0,
            output_tokens: 0,
        }
    }
}

/// Text-in, text-out summarisation service.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarise `chunks` (non-empty, in document order).
    async fn summarize(&self, chunks: &ChunkSequence) -> Result<SummaryResponse, MindmapError>;
}

/// [`Summarizer`] backed by an `edgequake-llm` chat provider.
pub struct LlmSummarizer {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    temperature: f32,
    max_tokens: usize,
}

impl LlmSummarizer {
    /// Wrap an already-built provider, taking prompt and sampling settings from `config`.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &MindmapConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Resolve a provider from `config` and the environment, then wrap it.
    pub fn from_config(config: &MindmapConfig) -> Result<Self, MindmapError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }

    fn build_messages(&self, document_text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(user_prompt(document_text)),
        ]
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, chunks: &ChunkSequence) -> Result<SummaryResponse, MindmapError> {
        if chunks.is_empty() {
            return Err(MindmapError::Internal(
                "summarize called with no chunks; check for empty input first".into(),
            ));
        }

        let document_text = chunks.join(CHUNK_SEPARATOR);
        let messages = self.build_messages(&document_text);
        let options = self.build_options();

        info!(
            "Requesting flowchart for {} chunks ({} chars)",
            chunks.len(),
            document_text.len()
        );
        let start = Instant::now();
        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| MindmapError::SummarizationFailed {
                message: format!("{}", e),
            })?;

        debug!(
            "{} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        let content = response.content.trim();
        if content.is_empty() {
            return Err(MindmapError::EmptyResponse);
        }

        Ok(SummaryResponse {
            content: content.to_string(),
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, MindmapError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        MindmapError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// True when at least one of [`CREDENTIAL_ENV_VARS`] is set and non-empty.
pub fn credential_present() -> bool {
    CREDENTIAL_ENV_VARS
        .iter()
        .any(|k| std::env::var(k).map(|v| !v.trim().is_empty()).unwrap_or(false))
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider + model** (`config.provider_name`): the factory
///    reads the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **`OPENAI_API_KEY`**: OpenAI with the configured or default model.
/// 5. **Auto-detection** (`ProviderFactory::from_env`), only when some
///    credential variable is present; otherwise the run fails up front.
pub fn resolve_provider(config: &MindmapConfig) -> Result<Arc<dyn LLMProvider>, MindmapError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model_or_default();

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.trim().is_empty() {
            return create_provider("openai", model);
        }
    }

    if !credential_present() {
        return Err(MindmapError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: "No API key found in the environment or .env file.\n\
                   Set OPENAI_API_KEY (or ANTHROPIC_API_KEY, GEMINI_API_KEY, …)."
                .to_string(),
        });
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| MindmapError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureClass;
    use crate::pipeline::diagram::extract_mermaid;
    use edgequake_llm::{ChatRole, LLMResponse, LlmError, MockProvider};
    use std::sync::Mutex;

    type Request = (Vec<ChatMessage>, Option<CompletionOptions>);

    /// Keeps every chat request and answers each with the same reply.
    struct RecordingProvider {
        reply: Result<String, String>,
        requests: Mutex<Vec<Request>>,
    }

    impl RecordingProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }

        fn answer(&self) -> edgequake_llm::Result<LLMResponse> {
            match self.reply {
                Ok(ref text) => {
                    let mut response = LLMResponse::new(text.as_str(), "recording-model");
                    response.prompt_tokens = 42;
                    response.completion_tokens = 7;
                    Ok(response)
                }
                Err(ref message) => Err(LlmError::ApiError(message.clone())),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "recording-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            self.answer()
        }

        async fn complete_with_options(
            &self,
            _prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.answer()
        }

        async fn chat(
            &self,
            messages: &[ChatMessage],
            options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((messages.to_vec(), options.cloned()));
            self.answer()
        }
    }

    fn chunks(texts: &[&str]) -> ChunkSequence {
        texts.iter().copied().collect()
    }

    #[test]
    fn summary_response_new_has_no_tokens() {
        let r = SummaryResponse::new("```mermaid\nA\n```");
        assert_eq!(r.input_tokens, 0);
        assert_eq!(r.output_tokens, 0);
    }

    #[test]
    fn credential_list_includes_openai() {
        assert!(CREDENTIAL_ENV_VARS.contains(&"OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn blank_reply_is_empty_response() {
        let mock = MockProvider::new();
        mock.add_response("   \n ").await;
        let summarizer = LlmSummarizer::new(Arc::new(mock), &MindmapConfig::default());

        let err = summarizer.summarize(&chunks(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, MindmapError::EmptyResponse), "got {err:?}");
        assert_eq!(err.class(), FailureClass::Summarization);
    }

    #[tokio::test]
    async fn reply_is_trimmed_and_keeps_the_block() {
        let mock = MockProvider::new();
        mock.add_response("\n  Here you go:\n```mermaid\ngraph LR\nA-->B\n```\n  ")
            .await;
        let summarizer = LlmSummarizer::new(Arc::new(mock), &MindmapConfig::default());

        let response = summarizer.summarize(&chunks(&["a"])).await.unwrap();
        assert!(response.content.starts_with("Here you go:"));
        assert!(response.content.ends_with("```"));
        let payload = extract_mermaid(&response.content).unwrap();
        assert_eq!(payload.as_str(), "graph LR\nA-->B");
    }

    #[tokio::test]
    async fn provider_error_is_summarization_failed() {
        let provider = RecordingProvider::failing("quota exceeded");
        let summarizer = LlmSummarizer::new(provider.clone(), &MindmapConfig::default());

        let err = summarizer.summarize(&chunks(&["a"])).await.unwrap_err();
        match err {
            MindmapError::SummarizationFailed { ref message } => {
                assert!(message.contains("quota exceeded"), "got {message}");
            }
            ref other => panic!("expected SummarizationFailed, got {other:?}"),
        }
        assert_eq!(err.class(), FailureClass::Summarization);
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn request_carries_joined_chunks_and_default_settings() {
        let provider = RecordingProvider::replying("```mermaid\ngraph LR\n```");
        let summarizer = LlmSummarizer::new(provider.clone(), &MindmapConfig::default());

        let response = summarizer
            .summarize(&chunks(&["first window", "second window"]))
            .await
            .unwrap();
        assert_eq!(response.input_tokens, 42);
        assert_eq!(response.output_tokens, 7);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let (messages, options) = &requests[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(
            messages[1].content,
            user_prompt(&format!("first window{CHUNK_SEPARATOR}second window"))
        );

        let options = options.as_ref().unwrap();
        assert_eq!(options.temperature, Some(0.5));
        assert_eq!(options.max_tokens, Some(1500));
    }

    #[tokio::test]
    async fn configured_prompt_and_sampling_are_sent() {
        let provider = RecordingProvider::replying("ok");
        let config = MindmapConfig::builder()
            .system_prompt("Only output a mermaid block.")
            .temperature(0.0)
            .max_tokens(64)
            .build()
            .unwrap();
        let summarizer = LlmSummarizer::new(provider.clone(), &config);

        summarizer.summarize(&chunks(&["x"])).await.unwrap();

        let (messages, options) = provider.requests().remove(0);
        assert_eq!(messages[0].content, "Only output a mermaid block.");
        let options = options.unwrap();
        assert_eq!(options.temperature, Some(0.0));
        assert_eq!(options.max_tokens, Some(64));
    }

    #[tokio::test]
    async fn no_chunks_never_reaches_the_provider() {
        let provider = RecordingProvider::replying("unused");
        let summarizer = LlmSummarizer::new(provider.clone(), &MindmapConfig::default());

        let err = summarizer.summarize(&chunks(&[])).await.unwrap_err();
        assert!(matches!(err, MindmapError::Internal(_)));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn from_config_prefers_injected_provider() {
        let provider = RecordingProvider::replying("reply");
        let config = MindmapConfig::builder()
            .provider(provider.clone())
            .build()
            .unwrap();

        let summarizer = LlmSummarizer::from_config(&config).unwrap();
        let response = summarizer.summarize(&chunks(&["a"])).await.unwrap();
        assert_eq!(response.content, "reply");
        assert_eq!(provider.requests().len(), 1);
    }
}
