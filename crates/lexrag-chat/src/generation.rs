//! Grounded answer generation.
//!
//! Builds a prompt from retrieved excerpts plus conversation history,
//! calls the configured provider, and returns the answer together with
//! source attributions. Fails closed: any provider failure yields a
//! fixed apology instead of an ungrounded answer.

use reqwest::Client;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::providers::complete;
use crate::types::{ChatMessage, ContextChunk, Source};
use lexrag_core::Result;

/// System prompt framing the assistant as a legal document analyst.
pub const SYSTEM_PROMPT: &str = "You are a legal assistant answering questions about the \
user's legal documents. Base every answer strictly on the document excerpts provided in \
the prompt. Quote or paraphrase the excerpts; never invent facts, citations, or clauses \
that do not appear in them. If the excerpts do not contain the answer, say so plainly. \
Answer clearly and concisely, in the language of the question.";

/// Fixed reply when generation cannot produce a grounded answer.
pub const APOLOGY: &str =
    "I'm sorry, I couldn't generate an answer right now. Please try again.";

/// Maximum snippet length in source attributions.
const SNIPPET_MAX_CHARS: usize = 200;

/// Upper bound on history messages included in the prompt.
const MAX_HISTORY_MESSAGES: usize = 20;

/// Answer generator over the configured LLM provider.
pub struct AnswerGenerator {
    config: LlmConfig,
    client: Client,
}

impl AnswerGenerator {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Whether a provider is configured and answers can be generated.
    pub fn is_available(&self) -> bool {
        self.config.is_configured()
    }

    /// Name of the active provider, if any.
    pub fn active_provider(&self) -> Option<String> {
        self.config.resolve_provider().map(|(p, _, _)| p.to_string())
    }

    /// Generate an answer for `question` grounded in `chunks`, with
    /// `history` providing conversational context. Returns the answer
    /// text and one source attribution per chunk.
    pub async fn generate(
        &self,
        question: &str,
        chunks: &[ContextChunk],
        history: &[ChatMessage],
    ) -> Result<(String, Vec<Source>)> {
        let sources = build_sources(chunks);

        let (provider, model, api_key) = match self.config.resolve_provider() {
            Some(resolved) => resolved,
            None => {
                warn!("No LLM provider configured; returning apology");
                return Ok((APOLOGY.to_string(), Vec::new()));
            }
        };

        let messages = build_messages(question, chunks, history);

        match complete(
            &self.client,
            provider,
            &messages,
            &model,
            &api_key,
            self.config.temperature,
            self.config.max_tokens,
        )
        .await
        {
            Ok(answer) => {
                info!(
                    "Generated answer via {} ({} chars, {} sources)",
                    provider,
                    answer.len(),
                    sources.len()
                );
                Ok((answer, sources))
            }
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                Ok((APOLOGY.to_string(), Vec::new()))
            }
        }
    }
}

/// Assemble the message list: system prompt, bounded history, then the
/// user turn carrying the excerpts and the question.
///
/// Stored history uses the role `"ai"` for answers; providers expect
/// `"assistant"`, so the role is mapped here.
fn build_messages(
    question: &str,
    chunks: &[ContextChunk],
    history: &[ChatMessage],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new("system", SYSTEM_PROMPT));

    let skip = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    for msg in history.iter().skip(skip) {
        let role = if msg.role == "ai" { "assistant" } else { msg.role.as_str() };
        messages.push(ChatMessage::new(role, msg.content.clone()));
    }

    messages.push(ChatMessage::new("user", build_user_prompt(question, chunks)));
    messages
}

/// Render the user turn. With excerpts, each is fenced with explicit
/// markers and labelled with its source file; without any, the model
/// is told no documents matched.
fn build_user_prompt(question: &str, chunks: &[ContextChunk]) -> String {
    if chunks.is_empty() {
        return format!(
            "No matching excerpts were found in the user's documents.\n\
             State that the documents contain no information on this, then answer \
             from general legal knowledge if you can, flagging it as such.\n\n\
             Question: {}",
            question
        );
    }

    let mut prompt = String::from("Answer using only the following document excerpts.\n\n");
    for chunk in chunks {
        let source = chunk.original_filename.as_deref().unwrap_or("Unknown source");
        prompt.push_str("--- SOURCE START ---\n");
        prompt.push_str(&format!("SOURCE: {}\n", source));
        prompt.push_str(&chunk.content);
        prompt.push_str("\n--- SOURCE END ---\n\n");
    }
    prompt.push_str(&format!("Question: {}", question));
    prompt
}

/// One attribution per excerpt: the source filename as title and a
/// truncated snippet of the content.
fn build_sources(chunks: &[ContextChunk]) -> Vec<Source> {
    chunks
        .iter()
        .map(|chunk| {
            let title = chunk
                .original_filename
                .clone()
                .unwrap_or_else(|| "Unknown source".to_string());
            let snippet = if chunk.content.chars().count() > SNIPPET_MAX_CHARS {
                let head: String = chunk.content.chars().take(SNIPPET_MAX_CHARS).collect();
                format!("{}...", head)
            } else {
                chunk.content.clone()
            };
            Source { title, snippet }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, filename: Option<&str>) -> ContextChunk {
        ContextChunk {
            content: content.to_string(),
            original_filename: filename.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_prompt_fences_each_excerpt() {
        let chunks = vec![
            chunk("Clause one.", Some("contract.pdf")),
            chunk("Clause two.", Some("lease.docx")),
        ];
        let prompt = build_user_prompt("What are the clauses?", &chunks);

        assert_eq!(prompt.matches("--- SOURCE START ---").count(), 2);
        assert_eq!(prompt.matches("--- SOURCE END ---").count(), 2);
        assert!(prompt.contains("SOURCE: contract.pdf"));
        assert!(prompt.contains("SOURCE: lease.docx"));
        assert!(prompt.contains("Clause one."));
        assert!(prompt.ends_with("Question: What are the clauses?"));
    }

    #[test]
    fn test_prompt_without_excerpts_flags_no_match() {
        let prompt = build_user_prompt("What is a lien?", &[]);
        assert!(prompt.contains("No matching excerpts"));
        assert!(prompt.ends_with("Question: What is a lien?"));
    }

    #[test]
    fn test_sources_title_and_snippet() {
        let long_content = "x".repeat(300);
        let chunks = vec![
            chunk("Short clause.", Some("a.pdf")),
            chunk(&long_content, None),
        ];
        let sources = build_sources(&chunks);

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "a.pdf");
        assert_eq!(sources[0].snippet, "Short clause.");
        assert_eq!(sources[1].title, "Unknown source");
        assert_eq!(sources[1].snippet.chars().count(), 203);
        assert!(sources[1].snippet.ends_with("..."));
    }

    #[test]
    fn test_stored_ai_role_mapped_to_assistant() {
        let history = vec![
            ChatMessage::new("user", "What does clause 3 say?"),
            ChatMessage::new("ai", "Clause 3 covers termination."),
        ];
        let messages = build_messages("And clause 4?", &[], &history);

        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].content, "Clause 3 covers termination.");
        assert!(messages.iter().all(|m| m.role != "ai"));
    }

    #[test]
    fn test_history_bounded() {
        let history: Vec<ChatMessage> = (0..50)
            .map(|i| ChatMessage::new("user", format!("turn {}", i)))
            .collect();
        let messages = build_messages("latest question", &[], &history);

        // system + 20 history + final user turn
        assert_eq!(messages.len(), 22);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "turn 30");
        assert!(messages.last().unwrap().content.contains("latest question"));
    }
}
