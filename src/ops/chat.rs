//! One chat-completion probe, trying standard and deployment path styles.

use anyhow::Result;
use serde_json::{Value, json};

use crate::config::PathStyle;
use crate::probe::{Attempt, Prober, order_attempts};

const PREVIEW_CHARS: usize = 200;

/// Probe the chat-completions endpoint with a single user message, reporting
/// which base/path/style answered and a preview of the reply text.
pub async fn run(
    prober: &Prober,
    model: &str,
    user_message: &str,
    hint: Option<PathStyle>,
) -> Result<Value> {
    let standard = Attempt {
        style: PathStyle::Standard,
        path: "/chat/completions".to_string(),
        payload: json!({
            "model": model,
            "messages": [{"role": "user", "content": user_message}],
        }),
    };
    let deployment = Attempt {
        style: PathStyle::Deployment,
        path: format!("/openai/deployments/{model}/chat/completions"),
        payload: json!({
            "messages": [{"role": "user", "content": user_message}],
        }),
    };

    let hit = prober
        .post_first("chat/completions", &order_attempts(standard, deployment, hint))
        .await?;
    println!("{}", serde_json::to_string_pretty(&hit.report)?);

    if let Some(preview) = reply_preview(&hit.body) {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"chat_preview": preview}))?
        );
    }
    Ok(hit.body)
}

/// Preview of the first choice's reply: `message.content`, falling back to the
/// legacy `text` field. `Some("")` when a choice exists but carries neither;
/// `None` only when there are no choices at all.
fn reply_preview(body: &Value) -> Option<String> {
    let first = body.get("choices").and_then(|choices| choices.get(0))?;
    let content = first
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .or_else(|| first.get("text").and_then(Value::as_str))
        .unwrap_or("");
    Some(content.chars().take(PREVIEW_CHARS).collect())
}
