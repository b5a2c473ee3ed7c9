//! Process configuration, read once from the environment at startup.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default API root when `NEBUL_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://api.chat.nebul.io/v1";

/// Which request shape an operation should try first.
///
/// "Standard" puts the model id in the JSON body on a fixed path;
/// "deployment" embeds the model id in the URL path and omits it from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Standard,
    Deployment,
}

impl PathStyle {
    /// Parse an environment hint. Anything other than "standard" or
    /// "deployment" (case-insensitive, whitespace-tolerant) is treated as unset.
    pub fn from_env_hint(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "deployment" => Some(Self::Deployment),
            _ => None,
        }
    }
}

impl fmt::Display for PathStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Deployment => "deployment",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub chat_path_style: Option<PathStyle>,
    pub embed_path_style: Option<PathStyle>,
}

impl Config {
    /// Load configuration from the environment. A `.env` file is honored if
    /// present; the real environment wins over it.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(
            std::env::var("NEBUL_BASE_URL").ok(),
            std::env::var("NEBUL_API_KEY").ok(),
            std::env::var("NEBUL_CHAT_PATH_STYLE").ok(),
            std::env::var("NEBUL_EMBED_PATH_STYLE").ok(),
        )
    }

    fn from_vars(
        base_url: Option<String>,
        api_key: Option<String>,
        chat_hint: Option<String>,
        embed_hint: Option<String>,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing NEBUL_API_KEY environment variable"))?;

        Ok(Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            chat_path_style: chat_hint.as_deref().and_then(PathStyle::from_env_hint),
            embed_path_style: embed_hint.as_deref().and_then(PathStyle::from_env_hint),
        })
    }
}
