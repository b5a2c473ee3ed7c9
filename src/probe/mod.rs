//! Endpoint discovery and probing.
//!
//! Deployments of the same OpenAI-compatible API mount the versioned path
//! differently and disagree on where the model id goes (JSON body vs URL
//! path). Rather than asking the user to configure this, the prober walks the
//! small product of candidate base URLs and request shapes and returns on the
//! first 2xx response.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::PathStyle;

const VERSION_SUFFIX: &str = "/v1";
const BODY_PREVIEW_CHARS: usize = 500;

/// Per-call ceiling for the `/models` listing.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);
/// Per-call ceiling for chat and embeddings probes.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Base URLs to try: the configured one plus its `/v1`-toggled variant,
/// deduplicated. Stripping the suffix never yields an empty candidate.
pub fn base_candidates(base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/').to_string();
    let toggled = match base.strip_suffix(VERSION_SUFFIX) {
        Some("") => base.clone(),
        Some(stripped) => stripped.to_string(),
        None => format!("{base}{VERSION_SUFFIX}"),
    };

    let mut candidates = vec![base];
    if !candidates.contains(&toggled) {
        candidates.push(toggled);
    }
    candidates
}

/// One path/payload shape to try against each candidate base.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub style: PathStyle,
    pub path: String,
    pub payload: Value,
}

/// Order the two request shapes by style hint. The hint is a preference, not
/// a filter: both shapes are always in the result.
pub fn order_attempts(
    standard: Attempt,
    deployment: Attempt,
    hint: Option<PathStyle>,
) -> Vec<Attempt> {
    match hint {
        Some(PathStyle::Deployment) => vec![deployment, standard],
        _ => vec![standard, deployment],
    }
}

/// Which combination answered, reported to the user after a successful probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub used_base: String,
    pub used_path: String,
    pub style: PathStyle,
    pub status: u16,
}

/// A successful probe: the winning combination plus the parsed JSON body.
#[derive(Debug)]
pub struct ProbeHit {
    pub report: ProbeReport,
    pub body: Value,
}

/// One failed combination, kept for the aggregated exhaustion report.
/// `status` is `None` for transport-level failures.
#[derive(Debug, Serialize)]
pub struct AttemptError {
    pub url: String,
    pub status: Option<u16>,
    pub body_or_error: String,
}

/// Every combination failed. Display enumerates the full attempt history so
/// the user can see exactly which URLs were tried and why each one failed.
#[derive(Debug, Error)]
#[error(
    "{operation} failed across all bases/paths. Attempts:\n{}",
    serde_json::to_string_pretty(.attempts).unwrap_or_default()
)]
pub struct ExhaustedError {
    pub operation: &'static str,
    pub attempts: Vec<AttemptError>,
}

/// Shared endpoint prober: iterates candidate bases outer, attempts inner,
/// and returns on the first 2xx response.
pub struct Prober {
    client: Client,
    api_key: String,
    bases: Vec<String>,
}

impl Prober {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.to_string(),
            bases: base_candidates(base_url),
        }
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// Full URLs in the exact order they would be probed (bases outer,
    /// attempts inner).
    fn candidate_urls<'a>(
        &'a self,
        attempts: &'a [Attempt],
    ) -> impl Iterator<Item = (&'a str, &'a Attempt)> {
        self.bases.iter().flat_map(move |base| {
            attempts
                .iter()
                .map(move |attempt| (base.as_str(), attempt))
        })
    }

    /// GET `{base}{path}` per candidate base; first 2xx wins and returns the
    /// parsed JSON body.
    pub async fn get_first(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<Value, ExhaustedError> {
        let mut errors = Vec::new();

        for base in &self.bases {
            let url = format!("{base}{path}");
            tracing::debug!(%url, "probing");

            let response = self
                .client
                .get(&url)
                .timeout(LIST_TIMEOUT)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.json::<Value>().await {
                            Ok(body) => return Ok(body),
                            Err(err) => record_bad_body(&mut errors, url, status.as_u16(), &err),
                        }
                    } else {
                        record_http_failure(&mut errors, url, status.as_u16(), response).await;
                    }
                }
                Err(err) => record_transport_failure(&mut errors, url, &err),
            }
        }

        Err(ExhaustedError {
            operation,
            attempts: errors,
        })
    }

    /// POST each attempt's payload across candidate bases; first 2xx wins.
    /// No call is issued after the first success.
    pub async fn post_first(
        &self,
        operation: &'static str,
        attempts: &[Attempt],
    ) -> Result<ProbeHit, ExhaustedError> {
        let mut errors = Vec::new();

        for (base, attempt) in self.candidate_urls(attempts) {
            let url = format!("{base}{}", attempt.path);
            tracing::debug!(%url, style = %attempt.style, "probing");

            let response = self
                .client
                .post(&url)
                .timeout(CALL_TIMEOUT)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&attempt.payload)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.json::<Value>().await {
                            Ok(body) => {
                                return Ok(ProbeHit {
                                    report: ProbeReport {
                                        used_base: base.to_string(),
                                        used_path: attempt.path.clone(),
                                        style: attempt.style,
                                        status: status.as_u16(),
                                    },
                                    body,
                                });
                            }
                            Err(err) => record_bad_body(&mut errors, url, status.as_u16(), &err),
                        }
                    } else {
                        record_http_failure(&mut errors, url, status.as_u16(), response).await;
                    }
                }
                Err(err) => record_transport_failure(&mut errors, url, &err),
            }
        }

        Err(ExhaustedError {
            operation,
            attempts: errors,
        })
    }
}

async fn record_http_failure(
    errors: &mut Vec<AttemptError>,
    url: String,
    status: u16,
    response: reqwest::Response,
) {
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%url, status, "attempt failed");
    errors.push(AttemptError {
        url,
        status: Some(status),
        body_or_error: truncate_chars(&body, BODY_PREVIEW_CHARS),
    });
}

fn record_transport_failure(errors: &mut Vec<AttemptError>, url: String, err: &reqwest::Error) {
    tracing::warn!(%url, error = %err, "attempt failed");
    errors.push(AttemptError {
        url,
        status: None,
        body_or_error: err.to_string(),
    });
}

fn record_bad_body(errors: &mut Vec<AttemptError>, url: String, status: u16, err: &reqwest::Error) {
    tracing::warn!(%url, status, error = %err, "2xx response with unparseable body");
    errors.push(AttemptError {
        url,
        status: Some(status),
        body_or_error: format!("invalid JSON body: {err}"),
    });
}

/// Char-boundary-safe truncation for response-body previews.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn candidates_strip_version_suffix() {
        assert_eq!(
            base_candidates("https://api.example.com/v1"),
            vec!["https://api.example.com/v1", "https://api.example.com"]
        );
    }

    #[test]
    fn candidates_append_version_suffix() {
        assert_eq!(
            base_candidates("https://api.example.com"),
            vec!["https://api.example.com", "https://api.example.com/v1"]
        );
    }

    #[test]
    fn candidates_normalize_trailing_slash() {
        assert_eq!(
            base_candidates("https://api.example.com/v1/"),
            vec!["https://api.example.com/v1", "https://api.example.com"]
        );
    }

    #[test]
    fn bare_suffix_never_yields_empty_candidate() {
        assert_eq!(base_candidates("/v1"), vec!["/v1"]);
    }

    #[test]
    fn candidates_have_at_most_two_entries() {
        assert_eq!(base_candidates("https://x.io/v1").len(), 2);
        assert_eq!(base_candidates("/v1").len(), 1);
    }

    fn standard() -> Attempt {
        Attempt {
            style: PathStyle::Standard,
            path: "/chat/completions".into(),
            payload: json!({"model": "m"}),
        }
    }

    fn deployment() -> Attempt {
        Attempt {
            style: PathStyle::Deployment,
            path: "/openai/deployments/m/chat/completions".into(),
            payload: json!({}),
        }
    }

    #[test]
    fn no_hint_tries_standard_first() {
        let attempts = order_attempts(standard(), deployment(), None);
        assert_eq!(attempts[0].style, PathStyle::Standard);
        assert_eq!(attempts[1].style, PathStyle::Deployment);
    }

    #[test]
    fn standard_hint_tries_standard_first() {
        let attempts = order_attempts(standard(), deployment(), Some(PathStyle::Standard));
        assert_eq!(attempts[0].style, PathStyle::Standard);
    }

    #[test]
    fn deployment_hint_reorders_but_keeps_both() {
        let attempts = order_attempts(standard(), deployment(), Some(PathStyle::Deployment));
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].style, PathStyle::Deployment);
        assert_eq!(attempts[1].style, PathStyle::Standard);
    }

    #[test]
    fn probe_order_is_bases_outer_attempts_inner() {
        let prober = Prober::new("https://api.example.com/v1", "sk-test");
        let attempts = vec![standard(), deployment()];
        let urls: Vec<String> = prober
            .candidate_urls(&attempts)
            .map(|(base, attempt)| format!("{base}{}", attempt.path))
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://api.example.com/v1/chat/completions",
                "https://api.example.com/v1/openai/deployments/m/chat/completions",
                "https://api.example.com/chat/completions",
                "https://api.example.com/openai/deployments/m/chat/completions",
            ]
        );
    }

    #[test]
    fn prober_dedups_bases() {
        let prober = Prober::new("/v1", "sk-test");
        assert_eq!(prober.bases(), ["/v1"]);
    }

    #[test]
    fn exhausted_error_lists_every_attempt() {
        let err = ExhaustedError {
            operation: "chat/completions",
            attempts: vec![
                AttemptError {
                    url: "https://a.example/v1/chat/completions".into(),
                    status: Some(404),
                    body_or_error: "not found".into(),
                },
                AttemptError {
                    url: "https://a.example/chat/completions".into(),
                    status: None,
                    body_or_error: "connection refused".into(),
                },
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("chat/completions failed across all bases/paths"));
        assert!(rendered.contains("https://a.example/v1/chat/completions"));
        assert!(rendered.contains("https://a.example/chat/completions"));
        assert!(rendered.contains("404"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn transport_failures_serialize_with_null_status() {
        let attempt = AttemptError {
            url: "https://a.example".into(),
            status: None,
            body_or_error: "timed out".into(),
        };
        let json = serde_json::to_value(&attempt).unwrap();
        assert!(json["status"].is_null());
    }

    #[test]
    fn body_preview_is_truncated_on_char_boundary() {
        let long = "é".repeat(600);
        let preview = truncate_chars(&long, BODY_PREVIEW_CHARS);
        assert_eq!(preview.chars().count(), 500);
    }

    #[test]
    fn short_bodies_are_untouched() {
        assert_eq!(truncate_chars("oops", BODY_PREVIEW_CHARS), "oops");
    }
}
