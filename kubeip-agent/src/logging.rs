//! Logger setup

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Map a log level name to a filter.
///
/// Names are case-insensitive. `fatal` and `panic` map to ERROR, the most
/// severe tracing level. Unknown names fall back to WARN.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warning" | "warn" => LevelFilter::WARN,
        "error" | "fatal" | "panic" => LevelFilter::ERROR,
        _ => LevelFilter::WARN,
    }
}

/// Initialize the tracing/logging subsystem
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_logging(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(parse_level(level).into()));

    let layer = fmt::layer().with_file(true).with_line_number(true);

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_case_insensitive() {
        assert_eq!(parse_level("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level("Info"), LevelFilter::INFO);
        assert_eq!(parse_level("WARNING"), LevelFilter::WARN);
        assert_eq!(parse_level("error"), LevelFilter::ERROR);
    }

    #[test]
    fn test_parse_level_fatal_and_panic() {
        assert_eq!(parse_level("fatal"), LevelFilter::ERROR);
        assert_eq!(parse_level("PANIC"), LevelFilter::ERROR);
    }

    #[test]
    fn test_parse_level_unknown_defaults_to_warning() {
        assert_eq!(parse_level("verbose"), LevelFilter::WARN);
        assert_eq!(parse_level(""), LevelFilter::WARN);
        assert_eq!(parse_level("trace"), LevelFilter::WARN);
    }
}
