//! Configuration module for the kubeip agent
//!
//! Maps the `run` flags (and their environment variables) onto the immutable
//! settings of a single agent run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::cli::RunArgs;

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Node name override
    pub node_name: Option<String>,

    /// Out-of-cluster kubeconfig path; `None` means in-cluster credentials
    pub kubeconfig: Option<PathBuf>,

    /// Delay between IP assignment attempts
    pub retry_interval: Duration,

    /// Number of IP assignment attempts
    pub retry_attempts: u32,

    /// Log level name (debug, info, warning, error, fatal, panic)
    pub log_level: String,

    /// JSON log output
    pub log_json: bool,

    /// Development mode (logs the full node descriptor)
    pub develop_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_name: None,
            kubeconfig: None,
            retry_interval: default_retry_interval(),
            retry_attempts: default_retry_attempts(),
            log_level: default_log_level(),
            log_json: false,
            develop_mode: false,
        }
    }
}

impl Config {
    /// Build the configuration from parsed `run` flags
    pub fn from_args(args: &RunArgs) -> Self {
        Self {
            node_name: args
                .node_name
                .clone()
                .filter(|name| !name.trim().is_empty()),
            kubeconfig: args
                .kubeconfig
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            retry_interval: args.retry_interval,
            retry_attempts: args.retry_attempts,
            log_level: args.log_level.clone(),
            log_json: args.json,
            develop_mode: args.develop_mode,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.retry_interval.is_zero() {
            anyhow::bail!("retry-interval must be > 0");
        }
        Ok(())
    }
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_retry_attempts() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}
