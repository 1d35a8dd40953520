use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use transcode_broker::config::{self, AppConfig};
use transcode_broker::core::{Preset, ProviderRegistry, TranscodingProvider};
use transcode_broker::logging::{self, LogConfig};

#[derive(Parser)]
#[command(name = "transcode-broker")]
#[command(about = "Dispatch transcode jobs to a remote transcoding backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML config file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job for SOURCE with the presets listed in a JSON file
    Transcode {
        #[arg(long)]
        source: String,
        /// JSON array of presets
        #[arg(long)]
        presets: PathBuf,
        #[arg(long, default_value = "elementalconductor")]
        provider: String,
    },
    /// Print the normalized status of a submitted job
    Status {
        id: String,
        #[arg(long, default_value = "elementalconductor")]
        provider: String,
    },
    /// Check the backend has enough active nodes
    Healthcheck {
        #[arg(long, default_value = "elementalconductor")]
        provider: String,
    },
    /// List providers that can be built from the current configuration
    Providers,
}

#[derive(Args, Serialize)]
struct Overrides {
    /// Use an in-memory backend. Its jobs live only as long as this process,
    /// so `status` cannot see ids printed by an earlier `transcode` run
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    simulation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    json_logs: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config, Some(&cli.overrides)).context("Failed to load configuration")?;
    logging::init(LogConfig::from(&config));

    let registry = ProviderRegistry::with_defaults().context("Failed to register providers")?;

    match cli.command {
        Commands::Transcode {
            source,
            presets,
            provider,
        } => {
            let presets = read_presets(&presets)?;
            let provider = build_provider(&registry, &provider, &config)?;
            let status = provider
                .transcode(&source, &presets)
                .await
                .context("Failed to submit job")?;
            print_json(&status)?;
        }
        Commands::Status { id, provider } => {
            let provider = build_provider(&registry, &provider, &config)?;
            let status = provider
                .job_status(&id)
                .await
                .with_context(|| format!("Failed to fetch status of job {id}"))?;
            print_json(&status)?;
        }
        Commands::Healthcheck { provider } => {
            let provider = build_provider(&registry, &provider, &config)?;
            provider.healthcheck().await.context("Healthcheck failed")?;
            println!("OK");
        }
        Commands::Providers => print_json(&registry.available(&config))?,
    }

    Ok(())
}

fn build_provider(
    registry: &ProviderRegistry,
    name: &str,
    config: &AppConfig,
) -> Result<Box<dyn TranscodingProvider>> {
    registry
        .build(name, config)
        .with_context(|| format!("Failed to initialize provider {name}"))
}

fn read_presets(path: &Path) -> Result<Vec<Preset>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read presets from {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse presets file")
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn simulation_help_warns_state_is_per_process() {
        let command = Cli::command();
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == "simulation")
            .and_then(|arg| arg.get_help())
            .map(ToString::to_string)
            .unwrap_or_default();

        assert!(help.contains("only as long as this process"));
    }

    #[test]
    fn simulation_flag_is_global() {
        let cli = Cli::try_parse_from(["transcode-broker", "status", "1", "--simulation", "true"]).unwrap();
        assert_eq!(cli.overrides.simulation, Some(true));
    }
}
