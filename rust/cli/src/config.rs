//! Layered CLI configuration: built-in defaults, then an optional TOML file
//! named by `AXIOMIND_HOLDEM_CONFIG`, then `AXIOMIND_HOLDEM_*` environment
//! variables. Each value remembers which layer set it.

use axiomind_holdem::config::TableConfig;
use axiomind_holdem::deck::Seed;
use axiomind_holdem::game::Stakes;
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_PATH_VAR: &str = "AXIOMIND_HOLDEM_CONFIG";
const ENV_PREFIX: &str = "AXIOMIND_HOLDEM_";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub commission_rate: u64,
    pub action_timeout_secs: u64,
    pub randomness_timeout_secs: u64,
    pub min_buy_in_big_blinds: u64,
    pub buy_in: u64,
    /// The big blind is always twice this.
    pub small_blind: u64,
    pub seed: Option<Seed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub commission_rate: ValueSource,
    pub action_timeout_secs: ValueSource,
    pub randomness_timeout_secs: ValueSource,
    pub min_buy_in_big_blinds: ValueSource,
    pub buy_in: ValueSource,
    pub small_blind: ValueSource,
    pub seed: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            commission_rate: ValueSource::Default,
            action_timeout_secs: ValueSource::Default,
            randomness_timeout_secs: ValueSource::Default,
            min_buy_in_big_blinds: ValueSource::Default,
            buy_in: ValueSource::Default,
            small_blind: ValueSource::Default,
            seed: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        let table = TableConfig::default();
        Self {
            commission_rate: table.commission_rate,
            action_timeout_secs: table.action_timeout_secs,
            randomness_timeout_secs: table.randomness_timeout_secs,
            min_buy_in_big_blinds: table.min_buy_in_big_blinds,
            buy_in: 1_000,
            small_blind: 5,
            seed: None,
        }
    }
}

impl Config {
    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            commission_rate: self.commission_rate,
            action_timeout_secs: self.action_timeout_secs,
            randomness_timeout_secs: self.randomness_timeout_secs,
            min_buy_in_big_blinds: self.min_buy_in_big_blinds,
            ..TableConfig::default()
        }
    }

    pub fn stakes(&self) -> Stakes {
        Stakes {
            buy_in: self.buy_in,
            small_blind: self.small_blind,
            big_blind: self.small_blind.saturating_mul(2),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Resolves the configuration from the process environment.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Resolves the configuration with `lookup` standing in for the environment.
pub fn load_from<F>(lookup: F) -> Result<ConfigResolved, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = lookup(CONFIG_PATH_VAR)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.commission_rate {
            cfg.commission_rate = v;
            sources.commission_rate = ValueSource::File;
        }
        if let Some(v) = f.action_timeout_secs {
            cfg.action_timeout_secs = v;
            sources.action_timeout_secs = ValueSource::File;
        }
        if let Some(v) = f.randomness_timeout_secs {
            cfg.randomness_timeout_secs = v;
            sources.randomness_timeout_secs = ValueSource::File;
        }
        if let Some(v) = f.min_buy_in_big_blinds {
            cfg.min_buy_in_big_blinds = v;
            sources.min_buy_in_big_blinds = ValueSource::File;
        }
        if let Some(v) = f.buy_in {
            cfg.buy_in = v;
            sources.buy_in = ValueSource::File;
        }
        if let Some(v) = f.small_blind {
            cfg.small_blind = v;
            sources.small_blind = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v.into_seed()?);
            sources.seed = ValueSource::File;
        }
    }

    let env = |name: &str| {
        lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.trim().is_empty())
    };
    let env_u64 = |name: &str| -> Result<Option<u64>, ConfigError> {
        env(name)
            .map(|v| {
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid(format!("Invalid {}{}: {}", ENV_PREFIX, name, v)))
            })
            .transpose()
    };

    if let Some(seed) = env("SEED") {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {}", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(v) = env_u64("COMMISSION_RATE")? {
        cfg.commission_rate = v;
        sources.commission_rate = ValueSource::Env;
    }
    if let Some(v) = env_u64("ACTION_TIMEOUT")? {
        cfg.action_timeout_secs = v;
        sources.action_timeout_secs = ValueSource::Env;
    }
    if let Some(v) = env_u64("RANDOMNESS_TIMEOUT")? {
        cfg.randomness_timeout_secs = v;
        sources.randomness_timeout_secs = ValueSource::Env;
    }
    if let Some(v) = env_u64("MIN_BUY_IN_BB")? {
        cfg.min_buy_in_big_blinds = v;
        sources.min_buy_in_big_blinds = ValueSource::Env;
    }
    if let Some(v) = env_u64("BUY_IN")? {
        cfg.buy_in = v;
        sources.buy_in = ValueSource::Env;
    }
    if let Some(v) = env_u64("SMALL_BLIND")? {
        cfg.small_blind = v;
        sources.small_blind = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    commission_rate: Option<u64>,
    #[serde(default)]
    action_timeout_secs: Option<u64>,
    #[serde(default)]
    randomness_timeout_secs: Option<u64>,
    #[serde(default)]
    min_buy_in_big_blinds: Option<u64>,
    #[serde(default)]
    buy_in: Option<u64>,
    #[serde(default)]
    small_blind: Option<u64>,
    #[serde(default)]
    seed: Option<FileSeed>,
}

/// `seed = 42` or `seed = "0x2a"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileSeed {
    Int(u64),
    Text(String),
}

impl FileSeed {
    fn into_seed(self) -> Result<Seed, ConfigError> {
        match self {
            FileSeed::Int(v) => Ok(Seed::from_u64(v)),
            FileSeed::Text(s) => s
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {}", s))),
        }
    }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let table = cfg.table_config();
    table
        .validate()
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))?;
    cfg.stakes()
        .validate(&table)
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))
}
