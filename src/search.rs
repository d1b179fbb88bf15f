//! Question answering over extracted paragraphs.
//!
//! The paragraphs are inlined into a single prompt and sent to the configured
//! LLM provider. No retrieval or ranking happens locally; the model sees the
//! whole document.

use crate::config::{ExtractionConfig, QueryConfig};
use crate::error::PdfSearchError;
use crate::extract::extract;
use crate::output::Answer;
use crate::pipeline::query;
use tracing::info;

/// Answer `question` from `paragraphs`.
///
/// The request is validated before a provider is resolved, so an empty
/// question or paragraph list fails fast even without an API key.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfsearch::{ask, QueryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let paragraphs = vec!["The warranty lasts two years.".to_string()];
/// let answer = ask("How long is the warranty?", &paragraphs, &QueryConfig::default()).await?;
/// println!("{}", answer.answer);
/// # Ok(())
/// # }
/// ```
pub async fn ask(
    question: &str,
    paragraphs: &[String],
    config: &QueryConfig,
) -> Result<Answer, PdfSearchError> {
    query::validate_request(question, paragraphs)?;
    info!(
        "Received search request: {} paragraphs",
        paragraphs.len()
    );
    let provider = query::resolve_provider(config)?;
    query::ask_with_provider(&provider, question, paragraphs, config).await
}

/// Extract a PDF, then answer `question` from its paragraphs.
pub async fn ask_document(
    input_str: impl AsRef<str>,
    question: &str,
    extraction: &ExtractionConfig,
    config: &QueryConfig,
) -> Result<Answer, PdfSearchError> {
    let output = extract(input_str, extraction).await?;
    ask(question, &output.paragraphs, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_paragraphs_fail_before_provider_resolution() {
        // No provider configured anywhere; validation must still win.
        let err = ask("anything?", &[], &QueryConfig::default()).await.unwrap_err();
        assert!(matches!(err, PdfSearchError::NoParagraphs));
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let paras = vec!["text".to_string()];
        let err = ask("   ", &paras, &QueryConfig::default()).await.unwrap_err();
        assert!(matches!(err, PdfSearchError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn ask_document_propagates_extraction_errors() {
        let err = ask_document(
            "/no/such/doc.pdf",
            "q?",
            &ExtractionConfig::default(),
            &QueryConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PdfSearchError::FileNotFound { .. }));
    }
}
