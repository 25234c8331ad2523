pub mod config;
pub mod detect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Liveness gateway: HTTP facade over Rekognition Face Liveness.
#[derive(Debug, Parser)]
#[command(name = "liveness-gateway", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Run one liveness check against a local video file and print the
    /// JSON response.
    Detect {
        /// Path to the video file.
        path: PathBuf,
        /// Override the content type (guessed from the extension otherwise).
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `LV_CONFIG` (or `config.toml`
/// by default). A missing file yields the defaults. Returns the parsed
/// [`Config`](lv_domain::config::Config) and the path that was used.
pub fn load_config() -> anyhow::Result<(lv_domain::config::Config, String)> {
    let config_path = std::env::var("LV_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        lv_domain::config::Config::default()
    };

    Ok((config, config_path))
}
