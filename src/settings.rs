use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    #[default]
    Pattern,
    Sentiment,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DataSettings {
    pub rules_file: String,
    pub responses_file: String,
    #[serde(default)]
    pub lexicon_file: Option<String>,
    #[serde(default)]
    pub sentiment_responses_file: Option<String>,
    #[serde(default)]
    pub case_insensitive: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BotSettings {
    #[serde(default)]
    pub kind: BotKind,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LogicSettings {
    /// Fixed seed for the shared random source.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Refuse to start when a template can never be filled.
    #[serde(default)]
    pub strict_templates: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub data: DataSettings,
    #[serde(default)]
    pub bot: BotSettings,
    #[serde(default)]
    pub logic: LogicSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Reads `<name>.toml` (or any format `config` recognises by extension).
    pub fn load(name: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name))
            .build()
            .with_context(|| format!("Failed to read configuration '{}'", name))?;
        Self::from_config(settings)
    }

    pub fn from_config(settings: config::Config) -> Result<Self> {
        settings
            .try_deserialize()
            .context("Configuration does not match the expected layout")
    }
}
