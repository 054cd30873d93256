use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use coinstore_core::parse::DEFAULT_DATE_FORMAT;

use crate::cli::Command;

#[derive(Parser, Debug)]
#[command(name = "coinstore", about = "coinstore - indexed record store for crypto asset quotations")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "coinstore.toml")]
    pub config: String,

    /// Directory holding journal files (overrides config file)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default = "default_input")]
    pub input: InputConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Journal directory. Without one, nothing outlives the process.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// fsync the journal after every append.
    #[serde(default)]
    pub sync_writes: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// `time` format description used for dates given on the command line.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_input() -> InputConfig {
    InputConfig {
        date_format: default_date_format(),
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig::default(),
            logging: default_logging(),
            input: default_input(),
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(cli: &CliArgs) -> Self {
        // Logging is configured from the result, so problems go to stderr.
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(ref dir) = cli.data_dir {
            config.store.data_dir = Some(dir.clone());
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }
}
