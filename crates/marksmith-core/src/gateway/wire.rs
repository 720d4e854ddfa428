//! Request and response shapes for each provider.
//!
//! Pure functions only; the HTTP exchange lives in [`super::http`].

use serde::Deserialize;
use serde_json::{Value, json};

use super::provider::ProviderKind;
use crate::prompt::PromptPair;

/// `anthropic-version` header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Full request URL for `kind`.
pub fn endpoint(kind: ProviderKind, base_url: &str, model: &str) -> String {
    match kind {
        ProviderKind::OpenAi => format!("{base_url}/chat/completions"),
        ProviderKind::Anthropic => format!("{base_url}/v1/messages"),
        ProviderKind::Gemini => format!("{base_url}/v1beta/models/{model}:generateContent"),
    }
}

/// JSON request body for `kind`.
pub fn request_body(kind: ProviderKind, model: &str, max_tokens: u32, prompt: &PromptPair) -> Value {
    match kind {
        ProviderKind::OpenAi => json!({
            "model": model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
        }),
        ProviderKind::Anthropic => json!({
            "model": model,
            "max_tokens": max_tokens,
            "system": prompt.system,
            "messages": [
                { "role": "user", "content": prompt.user },
            ],
        }),
        ProviderKind::Gemini => json!({
            "systemInstruction": { "parts": [ { "text": prompt.system } ] },
            "contents": [
                { "role": "user", "parts": [ { "text": prompt.user } ] },
            ],
            "generationConfig": { "maxOutputTokens": max_tokens },
        }),
    }
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicMessage {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// Pull the generated text out of a success response body.
///
/// Returns a short description of what was wrong when the body is not JSON
/// or lacks the expected text field.
pub fn extract_text(kind: ProviderKind, body: &str) -> Result<String, String> {
    match kind {
        ProviderKind::OpenAi => {
            let parsed: ChatCompletion = parse(body)?;
            parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| "response has no choices".to_string())?
                .message
                .content
                .ok_or_else(|| "first choice has no message content".to_string())
        }
        ProviderKind::Anthropic => {
            let parsed: AnthropicMessage = parse(body)?;
            let texts: Vec<String> = parsed
                .content
                .into_iter()
                .filter(|block| block.kind == "text")
                .filter_map(|block| block.text)
                .collect();
            if texts.is_empty() {
                return Err("response has no text content blocks".to_string());
            }
            Ok(texts.concat())
        }
        ProviderKind::Gemini => {
            let parsed: GeminiResponse = parse(body)?;
            let content = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .ok_or_else(|| "response has no candidate content".to_string())?;
            let texts: Vec<String> = content.parts.into_iter().filter_map(|p| p.text).collect();
            if texts.is_empty() {
                return Err("candidate has no text parts".to_string());
            }
            Ok(texts.concat())
        }
    }
}

fn parse<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, String> {
    serde_json::from_str(body).map_err(|e| format!("invalid JSON body: {e}"))
}
