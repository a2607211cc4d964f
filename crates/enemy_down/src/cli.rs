//! Command-line interface handling for the EnemyDown server.
//!
//! Every option overrides the matching value from the configuration file.

use clap::{value_parser, Arg, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Command line arguments parsed from user input.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the score store file
    pub store_path: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional fixed seed for spawn randomness
    pub seed: Option<u64>,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("EnemyDown Arena Server")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Timed arena mini-game with persistent score records")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value(DEFAULT_CONFIG_PATH),
            )
            .arg(
                Arg::new("store")
                    .short('s')
                    .long("store")
                    .value_name("FILE")
                    .help("Score record file (JSON lines)"),
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
            .arg(
                Arg::new("seed")
                    .long("seed")
                    .value_name("SEED")
                    .help("Seed for enemy spawns, for reproducible runs")
                    .value_parser(value_parser!(u64)),
            )
    }

    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list; the first item is the program name.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            store_path: matches.get_one::<String>("store").map(PathBuf::from),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            seed: matches.get_one::<u64>("seed").copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["enemy_down"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("config.toml"));
        assert_eq!(args.store_path, None);
        assert_eq!(args.log_level, None);
        assert!(!args.json_logs);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn test_all_overrides() {
        let args = CliArgs::try_parse_from([
            "enemy_down", "-c", "arena.toml", "-s", "/tmp/scores.jsonl", "-l", "debug", "--json-logs", "--seed", "42",
        ])
        .unwrap();

        assert_eq!(args.config_path, PathBuf::from("arena.toml"));
        assert_eq!(args.store_path, Some(PathBuf::from("/tmp/scores.jsonl")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn test_seed_must_be_a_number() {
        assert!(CliArgs::try_parse_from(["enemy_down", "--seed", "lucky"]).is_err());
    }
}
