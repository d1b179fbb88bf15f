//! LLM interaction: resolve a provider and ask it a question over paragraphs.
//!
//! ## Retry Strategy
//!
//! Every attempt is bounded by `api_timeout_secs`. Failed or timed-out
//! attempts are retried with exponential backoff
//! (`retry_backoff_ms * 2^(attempt-1)`): with 500 ms base and 3 retries the
//! waits are 500 ms → 1 s → 2 s. Once retries are exhausted the request fails
//! as a whole; there is no partial answer.

use crate::config::{QueryConfig, DEFAULT_MODEL};
use crate::error::PdfSearchError;
use crate::output::Answer;
use crate::prompts::search_prompt;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Why one attempt failed.
enum AttemptFailure {
    Timeout,
    Api(String),
}

/// Ask `question` over `paragraphs` using an already-resolved provider.
pub async fn ask_with_provider(
    provider: &Arc<dyn LLMProvider>,
    question: &str,
    paragraphs: &[String],
    config: &QueryConfig,
) -> Result<Answer, PdfSearchError> {
    let question = validate_request(question, paragraphs)?;

    let start = Instant::now();
    let messages = build_messages(question, paragraphs, config);
    let options = build_options(config);
    let per_call = Duration::from_secs(config.api_timeout_secs);

    debug!(
        "Asking over {} paragraphs ({} prompt bytes)",
        paragraphs.len(),
        messages.iter().map(|m| m.content.len()).sum::<usize>()
    );

    let mut last_failure = AttemptFailure::Api("no attempt made".into());

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config
                .retry_backoff_ms
                .saturating_mul(2u64.saturating_pow(attempt - 1));
            warn!(
                "Query: retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(per_call, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                let answer = response.content.trim();
                if answer.is_empty() {
                    return Err(PdfSearchError::UnexpectedResponse {
                        detail: "completion contained no text".into(),
                    });
                }
                let duration = start.elapsed();
                debug!(
                    "Query: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens, response.completion_tokens, duration
                );
                return Ok(Answer {
                    question: question.to_string(),
                    answer: answer.to_string(),
                    paragraph_count: paragraphs.len(),
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt,
                });
            }
            Ok(Err(e)) => {
                let err_msg = format!("{}", e);
                warn!("Query: attempt {} failed: {}", attempt + 1, err_msg);
                last_failure = AttemptFailure::Api(err_msg);
            }
            Err(_) => {
                warn!(
                    "Query: attempt {} timed out after {}s",
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_failure = AttemptFailure::Timeout;
            }
        }
    }

    Err(match last_failure {
        AttemptFailure::Timeout => PdfSearchError::ApiTimeout {
            secs: config.api_timeout_secs,
            retries: config.max_retries,
        },
        AttemptFailure::Api(message) => PdfSearchError::LlmApiError {
            retries: config.max_retries,
            message,
        },
    })
}

/// Check a question and its context before any provider is contacted.
///
/// Returns the trimmed question.
pub fn validate_request<'q>(question: &'q str, paragraphs: &[String]) -> Result<&'q str, PdfSearchError> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(PdfSearchError::InvalidInput {
            input: question.to_string(),
            reason: "question must not be empty".into(),
        });
    }
    if paragraphs.is_empty() {
        return Err(PdfSearchError::NoParagraphs);
    }
    Ok(trimmed)
}

/// Build the chat: optional system prompt, then the search prompt as the user turn.
fn build_messages(question: &str, paragraphs: &[String], config: &QueryConfig) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = config.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(search_prompt(question, paragraphs)));
    messages
}

/// Build `CompletionOptions` from the query config.
fn build_options(config: &QueryConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. pre-built `config.provider`
/// 2. `config.provider_name` + `config.model` (or [`DEFAULT_MODEL`])
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set
/// 4. `OPENAI_API_KEY` present → openai
/// 5. `ProviderFactory::from_env()` auto-detection
pub fn resolve_provider(config: &QueryConfig) -> Result<Arc<dyn LLMProvider>, PdfSearchError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

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

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PdfSearchError::ProviderNotConfigured {
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

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, PdfSearchError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PdfSearchError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
