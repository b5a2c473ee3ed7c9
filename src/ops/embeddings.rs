//! One embeddings probe, trying standard and deployment path styles.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::PathStyle;
use crate::probe::{Attempt, Prober, order_attempts};

/// How many vectors came back and how wide the first one is.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EmbeddingSummary {
    pub count: usize,
    pub dimensions: Option<usize>,
}

/// Probe the embeddings endpoint with a single input text, reporting which
/// base/path/style answered and a count/dimensionality summary.
pub async fn run(
    prober: &Prober,
    model: &str,
    text: &str,
    hint: Option<PathStyle>,
) -> Result<Value> {
    let standard = Attempt {
        style: PathStyle::Standard,
        path: "/embeddings".to_string(),
        payload: json!({"model": model, "input": text}),
    };
    let deployment = Attempt {
        style: PathStyle::Deployment,
        path: format!("/openai/deployments/{model}/embeddings"),
        payload: json!({"input": text}),
    };

    let hit = prober
        .post_first("embeddings", &order_attempts(standard, deployment, hint))
        .await?;
    println!("{}", serde_json::to_string_pretty(&hit.report)?);

    let summary = summarize(&hit.body);
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({"embeddings": summary}))?
    );
    Ok(hit.body)
}

fn summarize(body: &Value) -> EmbeddingSummary {
    match body.get("data").and_then(Value::as_array) {
        Some(rows) if !rows.is_empty() => EmbeddingSummary {
            count: rows.len(),
            dimensions: rows[0]
                .get("embedding")
                .and_then(Value::as_array)
                .map(Vec::len),
        },
        _ => EmbeddingSummary {
            count: 0,
            dimensions: None,
        },
    }
}
