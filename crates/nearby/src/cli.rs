//! Command-line interface handling for the nearby-contacts server.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// Every option except the config path overrides a value from the
/// configuration file.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for bind address
    pub bind_address: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    /// Parses the process arguments.
    pub fn parse() -> Self {
        Self::from_matches(command().get_matches())
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            bind_address: matches.get_one::<String>("bind").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

fn command() -> Command {
    Command::new("nearby")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tracks user locations and answers nearby-contact queries")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDRESS")
                .help("Bind address (e.g., 0.0.0.0:9999)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> CliArgs {
        CliArgs::from_matches(command().get_matches_from(args))
    }

    #[test]
    fn test_defaults() {
        let args = parse_from(&["nearby"]);
        assert_eq!(args.config_path, PathBuf::from("config.toml"));
        assert_eq!(args.bind_address, None);
        assert_eq!(args.log_level, None);
        assert!(!args.json_logs);
    }

    #[test]
    fn test_overrides() {
        let args = parse_from(&[
            "nearby",
            "-c",
            "custom.toml",
            "--bind",
            "127.0.0.1:9000",
            "-l",
            "debug",
            "--json-logs",
        ]);
        assert_eq!(args.config_path, PathBuf::from("custom.toml"));
        assert_eq!(args.bind_address.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }
}
