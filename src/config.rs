//! Node Configuration
//!
//! Flags take precedence over environment variables, which take precedence over defaults.
//!
//! | Flag            | Environment         | Default          |
//! |-----------------|---------------------|------------------|
//! | `--bind`        | `FENCED_BIND`       | `127.0.0.1:7000` |
//! | `--partitions`  | `FENCED_PARTITIONS` | `16`             |
//! | `--log-level`   | `FENCED_LOG`        | `info`           |

use crate::storage::partitioner::DEFAULT_PARTITIONS;

use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const ENV_BIND: &str = "FENCED_BIND";
pub const ENV_PARTITIONS: &str = "FENCED_PARTITIONS";
pub const ENV_LOG: &str = "FENCED_LOG";

const DEFAULT_BIND: &str = "127.0.0.1:7000";

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub num_partitions: u32,
    pub log_level: tracing::Level,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7000)),
            num_partitions: DEFAULT_PARTITIONS,
            log_level: tracing::Level::INFO,
        }
    }
}

impl NodeConfig {
    pub fn from_env_and_args() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args, |name| std::env::var(name).ok())
    }

    /// Parses `args` (without the program name), falling back to `env` lookups.
    pub fn parse<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut bind = env(ENV_BIND);
        let mut partitions = env(ENV_PARTITIONS);
        let mut log_level = env(ENV_LOG);

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--bind" | "--partitions" | "--log-level" => {
                    let value = args
                        .get(i + 1)
                        .cloned()
                        .with_context(|| format!("{} requires a value", flag))?;
                    match flag {
                        "--bind" => bind = Some(value),
                        "--partitions" => partitions = Some(value),
                        _ => log_level = Some(value),
                    }
                    i += 2;
                }
                _ => {
                    tracing::warn!("Ignoring unknown argument {}", flag);
                    i += 1;
                }
            }
        }

        let bind_addr: SocketAddr = bind
            .as_deref()
            .unwrap_or(DEFAULT_BIND)
            .parse()
            .context("invalid bind address")?;

        let num_partitions = match partitions {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid partition count {:?}", raw))?,
            None => DEFAULT_PARTITIONS,
        };
        if num_partitions == 0 {
            return Err(anyhow::anyhow!("Partition count must be at least 1"));
        }

        let log_level = match log_level {
            Some(raw) => raw
                .parse::<tracing::Level>()
                .map_err(|e| anyhow::anyhow!("invalid log level {:?}: {}", raw, e))?,
            None => tracing::Level::INFO,
        };

        Ok(Self {
            bind_addr,
            num_partitions,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_without_args_or_env() {
        let config = NodeConfig::parse(&[], |_| None).unwrap();

        assert_eq!(config.bind_addr, NodeConfig::default().bind_addr);
        assert_eq!(config.num_partitions, DEFAULT_PARTITIONS);
        assert_eq!(config.log_level, tracing::Level::INFO);
    }

    #[test]
    fn test_flags_override_env() {
        let config = NodeConfig::parse(
            &args(&["--bind", "0.0.0.0:9100", "--partitions", "4"]),
            |name| match name {
                ENV_BIND => Some("127.0.0.1:1".to_string()),
                ENV_LOG => Some("debug".to_string()),
                _ => None,
            },
        )
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9100);
        assert_eq!(config.num_partitions, 4);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(NodeConfig::parse(&args(&["--partitions", "0"]), |_| None).is_err());
        assert!(NodeConfig::parse(&args(&["--partitions", "many"]), |_| None).is_err());
        assert!(NodeConfig::parse(&args(&["--bind", "nowhere"]), |_| None).is_err());
        assert!(NodeConfig::parse(&args(&["--bind"]), |_| None).is_err());
    }
}
