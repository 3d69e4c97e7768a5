use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "kora.toml";

pub const DEFAULT_RAM_SIZE: u32 = 0x2000;
pub const DEFAULT_BATCH_SIZE: u64 = 1_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No boot image specified")]
    MissingFile,

    #[error("Failed to parse kora.toml: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Accepts `8192` as well as `0x2000`
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("`{s}` isn't a valid size: {e}"))
}

#[derive(Parser, Deserialize, Debug, Default)]
#[command(author, version, about)]
#[clap(disable_help_flag = true)]
#[serde(default)]
pub struct OptionalConfig {
    #[clap(long, action = clap::ArgAction::HelpLong)]
    #[serde(skip)]
    help: Option<bool>,

    /// Size of the ram mapped at address 0, in bytes. Defaults to 0x2000
    #[arg(short, long, value_parser = parse_u32)]
    pub ram_size: Option<u32>,

    /// Instructions run between two host-side checkpoints. Defaults to 1000000
    #[arg(short, long)]
    pub batch_size: Option<u64>,

    /// Prints every instruction to stderr before it runs
    #[arg(long)]
    pub trace: bool,

    /// Prints the final state of the processor after execution
    #[arg(long)]
    pub print_state: bool,

    /// The flat binary to load at address 0
    pub file: Option<String>,
}

impl OptionalConfig {
    pub fn get_args() -> Self {
        Self::parse()
    }

    /// Reads `kora.toml` from the working directory, if there is one
    pub fn get_toml() -> Result<Self, ConfigError> {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(config) => Self::from_toml(&config),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_toml(config: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config)?)
    }

    /// Fields set in `self` take precedence over the ones in `rhs`
    pub fn merge(self, rhs: Self) -> Self {
        Self {
            help: self.help.or(rhs.help),
            ram_size: self.ram_size.or(rhs.ram_size),
            batch_size: self.batch_size.or(rhs.batch_size),
            trace: self.trace || rhs.trace,
            print_state: self.print_state || rhs.print_state,
            file: self.file.or(rhs.file),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub file: String,
    pub ram_size: u32,
    pub batch_size: u64,
    pub trace: bool,
    pub print_state: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: String::new(),
            ram_size: DEFAULT_RAM_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            trace: false,
            print_state: false,
        }
    }
}

impl TryFrom<OptionalConfig> for Config {
    type Error = ConfigError;

    fn try_from(config: OptionalConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            file: config.file.ok_or(ConfigError::MissingFile)?,
            ram_size: config.ram_size.unwrap_or(DEFAULT_RAM_SIZE),
            // a batch of 0 would never make progress
            batch_size: config.batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
            trace: config.trace,
            print_state: config.print_state,
        })
    }
}

impl Config {
    /// Command line arguments, falling back to `kora.toml`, falling back to the defaults
    pub fn get() -> Result<Self, ConfigError> {
        OptionalConfig::get_args()
            .merge(OptionalConfig::get_toml()?)
            .try_into()
    }
}
