//! roundseed: operator tool for the trust-key promise protocol.

mod audit;
mod config;

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use roundseed_promise::SeedInput;
use roundseed_types::{serde_b64, CostOverrides};
use roundseed_utils::{format_elapsed, init_logging, LogFormat};

use crate::audit::{AuditVerdict, TrustKeyMaterial};
use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "roundseed", about = "Trust-key promise protocol tools")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ROUNDSEED_CONFIG")]
    config: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ROUNDSEED_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ROUNDSEED_LOG_LEVEL")]
    log_level: Option<String>,

    /// Abandon keystream derivation after this many milliseconds.
    #[arg(long, env = "ROUNDSEED_DERIVATION_TIMEOUT_MS")]
    derivation_timeout_ms: Option<u64>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct TrustKeyArgs {
    /// Hex-encoded committed secret of the trust key.
    #[arg(long)]
    trustkey: String,

    /// Hex-encoded input material of the trust key.
    #[arg(long)]
    inputs: String,
}

impl TrustKeyArgs {
    fn into_material(self) -> anyhow::Result<TrustKeyMaterial> {
        let inputs = hex::decode(&self.inputs)
            .map_err(|e| anyhow::anyhow!("--inputs is not valid hex: {e}"))?;
        Ok(TrustKeyMaterial {
            trustkey: self.trustkey,
            inputs,
        })
    }
}

#[derive(clap::Args)]
struct CostArgs {
    /// Argon2 passes (defaults to the configured value).
    #[arg(long)]
    time_cost: Option<u32>,

    /// Argon2 memory in KiB (defaults to the configured value).
    #[arg(long)]
    memory_cost: Option<u32>,

    /// Argon2 lanes (defaults to the configured value).
    #[arg(long)]
    parallelism: Option<u32>,
}

impl CostArgs {
    fn overrides(&self) -> CostOverrides {
        CostOverrides {
            time_cost: self.time_cost,
            memory_cost: self.memory_cost,
            parallelism: self.parallelism,
        }
    }
}

#[derive(clap::Subcommand)]
enum Command {
    /// Recompute the output of a resolved promise and optionally check it.
    Audit {
        #[command(flatten)]
        trust_key: TrustKeyArgs,

        /// Base64 seed issued by create.
        #[arg(long)]
        seed: String,

        /// Base64 output claimed by resolve. Exits non-zero if it differs.
        #[arg(long)]
        result: Option<String>,

        #[command(flatten)]
        costs: CostArgs,
    },

    /// Derive a trust key's keystream and print it as hex.
    Keystream {
        #[command(flatten)]
        trust_key: TrustKeyArgs,

        /// Keystream length in bytes.
        #[arg(long)]
        length: usize,

        #[command(flatten)]
        costs: CostArgs,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match cli.config {
        Some(ref path) => DaemonConfig::from_toml_file(path)
            .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?,
        None => DaemonConfig::default(),
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    if cli.derivation_timeout_ms.is_some() {
        config.promise.derivation_timeout_ms = cli.derivation_timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(config.log_format, &config.log_level);
    if let Some(ref path) = cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Audit {
            trust_key,
            seed,
            result,
            costs,
        } => {
            let claimed = result
                .map(|encoded| serde_b64::decode(&encoded))
                .transpose()
                .map_err(|e| anyhow::anyhow!("--result is not valid base64: {e}"))?;
            let material = trust_key.into_material()?;

            let started = Instant::now();
            let expected = audit::recompute(
                &config.promise,
                &material,
                &SeedInput::Base64(seed),
                &costs.overrides(),
            )
            .await?;
            tracing::info!(elapsed = %format_elapsed(started.elapsed()), "output recomputed");

            match AuditVerdict::judge(expected, claimed) {
                AuditVerdict::Computed(output) => println!("{}", serde_b64::encode(&output)),
                AuditVerdict::Match(output) => {
                    println!("{}", serde_b64::encode(&output));
                    tracing::info!("claimed result matches");
                }
                AuditVerdict::Mismatch { expected, claimed } => {
                    println!("{}", serde_b64::encode(&expected));
                    anyhow::bail!(
                        "claimed result {} does not match recomputed output",
                        serde_b64::encode(&claimed)
                    );
                }
            }
        }
        Command::Keystream {
            trust_key,
            length,
            costs,
        } => {
            let material = trust_key.into_material()?;
            let started = Instant::now();
            let keystream =
                audit::derive(&config.promise, &material, length, &costs.overrides()).await?;
            tracing::info!(elapsed = %format_elapsed(started.elapsed()), "keystream derived");
            println!("{}", hex::encode(keystream.as_slice()));
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
