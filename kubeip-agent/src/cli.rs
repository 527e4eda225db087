//! CLI argument parsing for the kubeip agent

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use once_cell::sync::Lazy;

static LONG_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}\n  Build date: {}\n  Git commit: {}\n  Git branch: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("KUBEIP_BUILD_DATE").unwrap_or("unknown"),
        option_env!("KUBEIP_GIT_COMMIT").unwrap_or("unknown"),
        option_env!("KUBEIP_GIT_BRANCH").unwrap_or("unknown"),
    )
});

fn long_version() -> &'static str {
    LONG_VERSION.as_str()
}

/// kubeip agent - replaces the node's public IP address with a static public IP address
#[derive(Debug, Parser)]
#[command(name = "kubeip-agent")]
#[command(version, long_version = long_version(), about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run agent
    Run(RunArgs),
}

/// Flags of the `run` subcommand
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Kubernetes node name (not needed if running in node)
    #[arg(long, env = "CLUSTER_NAME", help_heading = "Configuration")]
    pub node_name: Option<String>,

    /// Path to Kubernetes configuration file (not needed if running in node)
    #[arg(long, env = "KUBECONFIG", help_heading = "Configuration")]
    pub kubeconfig: Option<PathBuf>,

    /// When the agent fails to assign the static public IP address, it will retry after this interval
    #[arg(
        long,
        env = "RETRY_INTERVAL",
        default_value = "5m",
        value_parser = humantime::parse_duration,
        help_heading = "Configuration"
    )]
    pub retry_interval: Duration,

    /// Number of attempts to assign the static public IP address
    #[arg(long, env = "RETRY_ATTEMPTS", default_value_t = 10, help_heading = "Configuration")]
    pub retry_attempts: u32,

    /// Log level (debug, info, warning, error, fatal, panic)
    #[arg(long, default_value = "info", env = "LOG_LEVEL", help_heading = "Logging")]
    pub log_level: String,

    /// Produce log in JSON format: Logstash and Splunk friendly
    #[arg(long, default_value = "false", env = "LOG_JSON", help_heading = "Logging")]
    pub json: bool,

    /// Enable develop mode
    #[arg(long, default_value = "false", env = "DEV_MODE", help_heading = "Development")]
    pub develop_mode: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        let argv = ["kubeip-agent", "run"].iter().chain(args.iter()).copied();
        let Command::Run(args) = Cli::try_parse_from(argv).unwrap().command;
        args
    }

    #[test]
    fn test_cli_defaults() {
        let args = run_args(&[]);
        assert_eq!(args.retry_interval, Duration::from_secs(300));
        assert_eq!(args.retry_attempts, 10);
        assert_eq!(args.log_level, "info");
        assert!(!args.json);
        assert!(!args.develop_mode);
    }

    #[test]
    fn test_cli_flags() {
        let args = run_args(&[
            "--node-name",
            "gke-node-1",
            "--kubeconfig",
            "/home/dev/.kube/config",
            "--retry-interval",
            "90s",
            "--retry-attempts",
            "3",
            "--log-level",
            "DEBUG",
            "--json",
            "--develop-mode",
        ]);
        assert_eq!(args.node_name.as_deref(), Some("gke-node-1"));
        assert_eq!(
            args.kubeconfig.as_deref().and_then(|p| p.to_str()),
            Some("/home/dev/.kube/config")
        );
        assert_eq!(args.retry_interval, Duration::from_secs(90));
        assert_eq!(args.retry_attempts, 3);
        assert_eq!(args.log_level, "DEBUG");
        assert!(args.json);
        assert!(args.develop_mode);
    }

    #[test]
    fn test_cli_bad_duration() {
        let result = Cli::try_parse_from(["kubeip-agent", "run", "--retry-interval", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["kubeip-agent"]).is_err());
    }

    #[test]
    fn test_long_version() {
        assert!(long_version().starts_with(env!("CARGO_PKG_VERSION")));
        assert!(long_version().contains("Git commit:"));
    }
}
