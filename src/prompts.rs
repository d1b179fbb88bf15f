//! Prompts for question answering over extracted paragraphs.
//!
//! Callers can prepend their own system prompt via
//! [`crate::config::QueryConfig::system_prompt`]; the search prompt itself is
//! always built by [`search_prompt`].

use crate::pipeline::paragraphs::format_paragraphs;

/// Build the user message asking the model to answer `question` from `paragraphs`.
///
/// Paragraphs are inlined in order, separated by a blank line.
pub fn search_prompt(question: &str, paragraphs: &[String]) -> String {
    format!(
        "Act as a semantic search API. Given the following paragraphs:\n\n\
{}\n\n\
Please answer the following question based on the content above: {}",
        format_paragraphs(paragraphs),
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_inlines_paragraphs_and_question() {
        let paras = vec!["First para.".to_string(), "Second para.".to_string()];
        let prompt = search_prompt("What is second?", &paras);
        assert!(prompt.starts_with("Act as a semantic search API."));
        assert!(prompt.contains("paragraphs:\n\nFirst para.\n\nSecond para.\n\n"));
        assert!(prompt.ends_with("based on the content above: What is second?"));
    }
}
