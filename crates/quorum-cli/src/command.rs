//! Subcommands and their execution.

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use quorum_canonical::to_canonical_json;
use quorum_config::{Config, ConfigEnvelope};
use quorum_updates::{derive_updates, updates_to_plain};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate a config file
    Check { config: PathBuf },
    /// Print the canonical hash of a config file
    Hash { config: PathBuf },
    /// Derive the updates turning `current` into `new`
    Diff {
        current: PathBuf,
        new: PathBuf,
        timestamp: Option<u64>,
    },
    /// Check whether a signed envelope is approved by the current quorum
    Approve { current: PathBuf, envelope: PathBuf },
}

/// What a command printed and whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    fn failed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }
}

impl Command {
    /// Parse arguments following the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some(name) = args.first() else {
            return Err(CliError::Usage("missing command".to_string()));
        };
        let operands = &args[1..];

        let command = match name.as_str() {
            "check" => {
                let [config] = expect_operands::<1>(name, operands)?;
                Command::Check { config }
            }
            "hash" => {
                let [config] = expect_operands::<1>(name, operands)?;
                Command::Hash { config }
            }
            "diff" => {
                let (paths, timestamp) = match operands {
                    [current, new, timestamp] => {
                        let timestamp = timestamp.parse().map_err(|_| {
                            CliError::Usage(format!("invalid timestamp '{}'", timestamp))
                        })?;
                        ([current, new], Some(timestamp))
                    }
                    [current, new] => ([current, new], None),
                    _ => {
                        return Err(CliError::Usage(
                            "diff expects <current> <new> [timestamp]".to_string(),
                        ))
                    }
                };
                Command::Diff {
                    current: PathBuf::from(paths[0]),
                    new: PathBuf::from(paths[1]),
                    timestamp,
                }
            }
            "approve" => {
                let [current, envelope] = expect_operands::<2>(name, operands)?;
                Command::Approve { current, envelope }
            }
            other => return Err(CliError::Usage(format!("unknown command '{}'", other))),
        };
        Ok(command)
    }

    /// Run the command against files on disk.
    pub fn execute(&self, cli: &CliConfig) -> Result<Outcome> {
        match self {
            Command::Check { config } => Ok(check(&read_json(config)?)),
            Command::Hash { config } => hash(&read_json(config)?),
            Command::Diff {
                current,
                new,
                timestamp,
            } => {
                let timestamp = timestamp.unwrap_or_else(now_millis);
                diff(&read_json(current)?, &read_json(new)?, timestamp, cli)
            }
            Command::Approve { current, envelope } => {
                approve(&read_json(current)?, &read_json(envelope)?)
            }
        }
    }
}

fn expect_operands<const N: usize>(name: &str, operands: &[String]) -> Result<[PathBuf; N]> {
    let paths: Vec<PathBuf> = operands.iter().map(PathBuf::from).collect();
    paths.try_into().map_err(|_| {
        CliError::Usage(format!("{} expects {} file argument(s)", name, N))
    })
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "Read input");
    Ok(serde_json::from_str(&text)?)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

fn render(value: &Value, cli: &CliConfig) -> Result<String> {
    if cli.pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(to_canonical_json(value)?)
    }
}

/// Validate a raw config, listing every issue found.
pub fn check(raw: &Value) -> Outcome {
    match Config::from_raw(raw) {
        Ok(config) => {
            info!(
                contracts = config.contracts.len(),
                nodes = config.nodes.len(),
                legacy = config.is_legacy(),
                "Config is valid"
            );
            Outcome::ok("valid")
        }
        Err(issues) => Outcome::failed(issues.to_lines()),
    }
}

/// Canonical hash of a raw config.
pub fn hash(raw: &Value) -> Result<Outcome> {
    let config = Config::from_raw(raw).map_err(quorum_config::Error::from)?;
    Ok(Outcome::ok(config.hash()?))
}

/// Updates required to move from `current` to `new`, keyed by contract.
pub fn diff(current: &Value, new: &Value, timestamp: u64, cli: &CliConfig) -> Result<Outcome> {
    let current = Config::from_raw(current).map_err(quorum_config::Error::from)?;
    let new = Config::from_raw(new).map_err(quorum_config::Error::from)?;
    let updates = derive_updates(timestamp, &current, &new)?;
    info!(updates = updates.len(), timestamp, "Derived updates");
    Ok(Outcome::ok(render(&updates_to_plain(&updates), cli)?))
}

/// Whether an envelope carries every signature the current quorum requires.
pub fn approve(current: &Value, envelope: &Value) -> Result<Outcome> {
    let current = Config::from_raw(current).map_err(quorum_config::Error::from)?;
    let envelope = ConfigEnvelope::from_raw(envelope)?;
    let signers = envelope.accepted_signers().join("\n");
    if envelope.is_approved(&current) {
        Ok(Outcome::ok(format!("approved\n{}", signers)))
    } else {
        Ok(Outcome::failed(format!("not approved\n{}", signers)))
    }
}
