//! Bearer-authenticated calls to hosted text-generation endpoints.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::stats::ReportStats;

const SYSTEM_PROMPT: &str = "You are a digital balance and wellness coach.";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

pub(crate) fn build_prompt(stats: &ReportStats) -> String {
    format!(
        "Analyse the user's last {} interaction cycles and write a short balance report.\n\n\
         Data:\n\
         - Calm cycles: {}\n\
         - Balanced cycles: {}\n\
         - Aggressive cycles: {}\n\
         - Average score: {}\n\
         - Total interactions: {}\n\n\
         Keep it brief and easy to read, and end with concrete suggestions.",
        stats.total_cycles,
        stats.mode_counts.calm,
        stats.mode_counts.balanced,
        stats.mode_counts.aggressive,
        stats.average_score,
        stats.total_interactions,
    )
}

pub(crate) async fn fetch_chat_completion(
    client: &Client,
    endpoint: &str,
    model: &str,
    api_key: &str,
    stats: &ReportStats,
) -> Result<String> {
    let prompt = build_prompt(stats);
    let body = ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: &prompt,
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .context("chat completion request failed")?
        .error_for_status()
        .context("chat completion endpoint returned an error status")?;

    let parsed: ChatResponse = response
        .json()
        .await
        .context("malformed chat completion response")?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| anyhow!("chat completion response contained no text"))
}

pub(crate) async fn fetch_inference(
    client: &Client,
    endpoint: &str,
    api_key: &str,
    stats: &ReportStats,
) -> Result<String> {
    let prompt = build_prompt(stats);

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&InferenceRequest { inputs: &prompt })
        .send()
        .await
        .context("inference request failed")?
        .error_for_status()
        .context("inference endpoint returned an error status")?;

    let payload: Value = response
        .json()
        .await
        .context("malformed inference response")?;

    generated_text(&payload)
}

/// Accepts both `[{"generated_text": ..}]` and `{"generated_text": ..}`.
fn generated_text(payload: &Value) -> Result<String> {
    let entry = match payload {
        Value::Array(items) => items.first().ok_or_else(|| anyhow!("empty inference response"))?,
        other => other,
    };

    match entry.get("generated_text").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(_) => bail!("inference response contained no text"),
        None => bail!("inference response is missing generated_text"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::report::stats::ModeCounts;

    #[test]
    fn prompt_carries_every_statistic() {
        let stats = ReportStats {
            total_cycles: 12,
            mode_counts: ModeCounts {
                calm: 3,
                balanced: 4,
                aggressive: 5,
            },
            average_score: 48,
            total_interactions: 777,
        };
        let prompt = build_prompt(&stats);
        for needle in ["12 interaction cycles", "Calm cycles: 3", "Balanced cycles: 4", "Aggressive cycles: 5", "Average score: 48", "Total interactions: 777"] {
            assert!(prompt.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn reads_both_inference_shapes() {
        assert_eq!(
            generated_text(&json!([{ "generated_text": " hello " }])).unwrap(),
            "hello"
        );
        assert_eq!(
            generated_text(&json!({ "generated_text": "hi" })).unwrap(),
            "hi"
        );
        assert!(generated_text(&json!([])).is_err());
        assert!(generated_text(&json!({ "error": "loading" })).is_err());
        assert!(generated_text(&json!({ "generated_text": "  " })).is_err());
    }
}
