#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::time::FormatTime;

use nebul_smoke::config::Config;
use nebul_smoke::ops;
use nebul_smoke::probe::Prober;

/// Fixed user message for the chat probe.
const CHAT_PROBE_MESSAGE: &str = "Say hello and tell me your model id.";
/// Fixed input text for the embeddings probe.
const EMBED_PROBE_TEXT: &str = "Amsterdam is the capital of the Netherlands.";

/// Smoke-test an OpenAI-compatible inference API.
///
/// Always lists available models. When both model ids are given, additionally
/// runs one chat-completion call and one embeddings call, trying standard and
/// deployment-style endpoint shapes across the base URL with and without its
/// `/v1` segment until one succeeds.
#[derive(Parser, Debug)]
#[command(name = "nebul-smoke")]
#[command(version)]
struct Cli {
    /// Model id for the chat-completion probe
    chat_model: Option<String>,

    /// Model id for the embeddings probe
    embed_model: Option<String>,
}

struct CompactTimer;

impl FormatTime for CompactTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y%m%d %H:%M:%S"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the JSON dumps.
    let subscriber = FmtSubscriber::builder()
        .with_timer(CompactTimer)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = Config::from_env()?;
    let prober = Prober::new(&config.base_url, &config.api_key);
    info!(bases = ?prober.bases(), "candidate base URLs");

    ops::models::list(&prober).await?;

    if let (Some(chat_model), Some(embed_model)) = (cli.chat_model, cli.embed_model) {
        ops::chat::run(&prober, &chat_model, CHAT_PROBE_MESSAGE, config.chat_path_style).await?;
        ops::embeddings::run(&prober, &embed_model, EMBED_PROBE_TEXT, config.embed_path_style)
            .await?;
    } else {
        println!();
        println!("Usage: nebul-smoke <chat_model_id> <embed_model_id>");
        println!(
            "Env toggles: NEBUL_CHAT_PATH_STYLE=standard|deployment, NEBUL_EMBED_PATH_STYLE=standard|deployment"
        );
        println!("Bases tried: current NEBUL_BASE_URL and variant with/without /v1.");
    }

    Ok(())
}
