use anyhow::{Context, Result};
use clap::Parser;
use gemini_relay::models::{AdapterMode, RelayConfig};
use gemini_relay::{server, RequestAdapter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-relay")]
#[command(about = "Relay chat requests to the Gemini API with a server-held key")]
struct CliArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8787)]
    port: u16,

    /// Overrides RELAY_MODE.
    #[arg(long, value_enum)]
    mode: Option<AdapterMode>,

    /// Overrides GEMINI_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Overrides RELAY_TIMEOUT_SECS.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl CliArgs {
    fn apply(&self, mut config: RelayConfig) -> RelayConfig {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = args.apply(RelayConfig::from_env().context("Failed to load configuration")?);

    if config.api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; every request will fail with 500");
    }
    let model = config.model.clone();
    let timeout = config.timeout;
    let adapter = Arc::new(RequestAdapter::from_config(config));
    info!(
        "Starting gemini-relay (mode: {:?}, model: {}, timeout: {:?})",
        adapter.mode(),
        model,
        timeout
    );

    let app = server::router(adapter);

    let bind = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = CliArgs::parse_from([
            "gemini-relay",
            "--mode",
            "session",
            "--model",
            "gemini-2.0-flash",
            "--timeout-secs",
            "7",
        ]);
        let config = args.apply(RelayConfig::default());

        assert_eq!(config.mode, AdapterMode::Session);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_cli_defaults_keep_config() {
        let args = CliArgs::parse_from(["gemini-relay"]);
        assert_eq!(args.port, 8787);
        let config = args.apply(RelayConfig::default().with_mode(AdapterMode::Prompt));
        assert_eq!(config.mode, AdapterMode::Prompt);
    }
}
