//! External LLM provider implementations.
//!
//! OpenAI and Groq share the chat-completions format. Anthropic uses
//! its Messages API. All calls are non-streaming: the full completion
//! is returned at once.

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::types::{ChatMessage, LlmProvider};
use lexrag_core::{Error, Result};

/// Request a completion from the appropriate provider.
pub async fn complete(
    client: &Client,
    provider: LlmProvider,
    messages: &[ChatMessage],
    model: &str,
    api_key: &str,
    temperature: f64,
    max_tokens: usize,
) -> Result<String> {
    match provider {
        LlmProvider::OpenAI => {
            complete_openai_compat(
                client,
                "https://api.openai.com/v1/chat/completions",
                messages,
                model,
                api_key,
                temperature,
                max_tokens,
            )
            .await
        }
        LlmProvider::Groq => {
            complete_openai_compat(
                client,
                "https://api.groq.com/openai/v1/chat/completions",
                messages,
                model,
                api_key,
                temperature,
                max_tokens,
            )
            .await
        }
        LlmProvider::Anthropic => {
            complete_anthropic(client, messages, model, api_key, temperature, max_tokens).await
        }
    }
}

/// Call an OpenAI-compatible chat completions API (OpenAI, Groq).
async fn complete_openai_compat(
    client: &Client,
    url: &str,
    messages: &[ChatMessage],
    model: &str,
    api_key: &str,
    temperature: f64,
    max_tokens: usize,
) -> Result<String> {
    let msgs: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let body = json!({
        "model": model,
        "messages": msgs,
        "temperature": temperature,
        "max_tokens": max_tokens,
    });

    debug!("Completion request to {} with model {}", url, model);

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Http(format!("API error {}: {}", status, body)));
    }

    let parsed: serde_json::Value = response
        .json()
        .await
        .map_err(|e| Error::Http(format!("Response parse failed: {}", e)))?;

    parsed["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| Error::Http("Completion response missing content".to_string()))
}

/// Call Anthropic's Messages API.
async fn complete_anthropic(
    client: &Client,
    messages: &[ChatMessage],
    model: &str,
    api_key: &str,
    temperature: f64,
    max_tokens: usize,
) -> Result<String> {
    // Separate system message from conversation
    let system_msg: Option<String> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.clone());

    let conv_msgs: Vec<serde_json::Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let mut body = json!({
        "model": model,
        "messages": conv_msgs,
        "temperature": temperature,
        "max_tokens": max_tokens,
    });

    if let Some(sys) = system_msg {
        body["system"] = json!(sys);
    }

    debug!("Completion request to Anthropic with model {}", model);

    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Http(format!("API error {}: {}", status, body)));
    }

    let parsed: serde_json::Value = response
        .json()
        .await
        .map_err(|e| Error::Http(format!("Response parse failed: {}", e)))?;

    // Content is a list of blocks; concatenate the text blocks.
    let blocks = parsed["content"]
        .as_array()
        .ok_or_else(|| Error::Http("Completion response missing content".to_string()))?;

    let text: String = blocks
        .iter()
        .filter_map(|b| b["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(Error::Http("Completion response empty".to_string()));
    }
    Ok(text)
}
