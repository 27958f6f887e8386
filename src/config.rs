//! Configuration module for the statedb-parser command-line tool.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use statedb_parser::protocols::resp::parser::{DEFAULT_MAX_BULK_LEN, DEFAULT_MAX_ELEMENTS};
use statedb_parser::DecoderLimits;
use std::path::PathBuf;

/// Command-line arguments for the parser tool
#[derive(Parser, Debug)]
#[command(name = "statedb-parser")]
#[command(author = "statedb authors")]
#[command(version = "0.1.0")]
#[command(about = "Decode a RESP command into dispatcher JSON", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read the raw RESP buffer from this file instead of stdin
    #[arg(short, long, conflicts_with = "words")]
    pub input: Option<PathBuf>,

    /// Build the RESP buffer from these words (e.g. SET mykey myvalue)
    pub words: Vec<String>,

    /// Maximum number of elements in one command
    #[arg(long)]
    pub max_elements: Option<usize>,

    /// Maximum length of one bulk string in bytes
    #[arg(long)]
    pub max_bulk_len: Option<usize>,

    /// Pretty-print the result envelope
    #[arg(short, long)]
    pub pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Decoder limits
#[derive(Debug, Deserialize)]
pub struct DecoderConfig {
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,
    #[serde(default = "default_max_bulk_len")]
    pub max_bulk_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_elements: default_max_elements(),
            max_bulk_len: default_max_bulk_len(),
        }
    }
}

/// Output formatting
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_max_elements() -> usize {
    DEFAULT_MAX_ELEMENTS
}

fn default_max_bulk_len() -> usize {
    DEFAULT_MAX_BULK_LEN
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the command buffer comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    Words(Vec<String>),
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub input: InputSource,
    pub limits: DecoderLimits,
    pub pretty: bool,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Merge parsed CLI args with the TOML file they name, if any.
    /// CLI arguments take precedence over TOML file values.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let input = if !cli.words.is_empty() {
            InputSource::Words(cli.words)
        } else if let Some(path) = cli.input {
            InputSource::File(path)
        } else {
            InputSource::Stdin
        };

        Ok(Config {
            input,
            limits: DecoderLimits {
                max_elements: cli
                    .max_elements
                    .unwrap_or(toml_config.decoder.max_elements),
                max_bulk_len: cli
                    .max_bulk_len
                    .unwrap_or(toml_config.decoder.max_bulk_len),
            },
            pretty: cli.pretty || toml_config.output.pretty,
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.decoder.max_elements, 1024 * 1024);
        assert_eq!(config.decoder.max_bulk_len, 512 * 1024 * 1024);
        assert!(!config.output.pretty);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [decoder]
            max_elements = 16
            max_bulk_len = 4096

            [output]
            pretty = true

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.decoder.max_elements, 16);
        assert_eq!(config.decoder.max_bulk_len, 4096);
        assert!(config.output.pretty);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_words() {
        let cli = CliArgs::parse_from(["statedb-parser", "SET", "mykey", "myvalue"]);
        let config = Config::from_args(cli).unwrap();
        assert_eq!(
            config.input,
            InputSource::Words(vec!["SET".into(), "mykey".into(), "myvalue".into()])
        );
        assert_eq!(config.limits, DecoderLimits::default());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = CliArgs::parse_from([
            "statedb-parser",
            "--input",
            "cmd.resp",
            "--max-elements",
            "8",
            "--log-level",
            "trace",
        ]);
        let config = Config::from_args(cli).unwrap();
        assert_eq!(config.input, InputSource::File(PathBuf::from("cmd.resp")));
        assert_eq!(config.limits.max_elements, 8);
        assert_eq!(config.limits.max_bulk_len, 512 * 1024 * 1024);
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliArgs::parse_from(["statedb-parser", "--config", "/nonexistent/statedb.toml"]);
        match Config::from_args(cli) {
            Err(ConfigError::FileRead(path, _)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/statedb.toml"))
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
