use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_JWT_SECRET: &str = "your_jwt_secret";

#[derive(Deserialize, Serialize)]
#[serde(default)]
struct RawConfig {
    listen_addr: String,
    listen_port: u16,
    jwt_secret: String,
    llm: LlmConfig,
    humanize: HumanizeConfig,
    rewrite: RewriteConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".into(),
            listen_port: 5000,
            jwt_secret: DEFAULT_JWT_SECRET.into(),
            llm: LlmConfig::default(),
            humanize: HumanizeConfig::default(),
            rewrite: RewriteConfig::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    /// Answers in-process by echoing the prompt, no API key needed.
    Echo,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            base_url: crate::llm::openai::OPENAI_BASE_URL.into(),
            api_key: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TemperatureRange {
    pub min: f32,
    pub max: f32,
}

impl TemperatureRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Never panics, unlike `f32::clamp`, even for NaN or an inverted range.
    pub fn clamp(&self, temperature: f32) -> f32 {
        temperature.max(self.min).min(self.max)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct HumanizeConfig {
    pub default_model: String,
    pub default_temperature: f32,
    pub max_tokens: u32,
    /// Inputs longer than this many characters get a second, refining pass.
    pub refine_threshold: usize,
    pub temperature: TemperatureRange,
    pub refine_temperature: TemperatureRange,
    /// Added to the requested temperature for the refining pass.
    pub refine_temperature_boost: f32,
    /// Replaces the built-in instruction prompt.
    pub system_prompt: Option<String>,
    /// Makes the rewrite pass deterministic for a given model output.
    pub seed: Option<u64>,
}

impl Default for HumanizeConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-4-turbo".into(),
            default_temperature: 0.75,
            max_tokens: 4000,
            refine_threshold: 1000,
            temperature: TemperatureRange::new(0.5, 0.9),
            refine_temperature: TemperatureRange::new(0.6, 0.95),
            refine_temperature_boost: 0.1,
            system_prompt: None,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// A sentence gets an interjection when its draw is above this.
    pub interjection_threshold: f64,
    /// A paragraph gets the emphasis sentence when its draw is above this.
    pub emphasis_threshold: f64,
    pub emphasis_min_len: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            interjection_threshold: 0.8,
            emphasis_threshold: 0.9,
            emphasis_min_len: 200,
        }
    }
}

pub struct Config {
    pub listen_addr: std::net::IpAddr,
    pub listen_port: u16,
    pub jwt_secret: String,
    pub llm: LlmConfig,
    pub humanize: HumanizeConfig,
    pub rewrite: RewriteConfig,
}

impl Config {
    /// Reads the optional yaml file and applies environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let raw = match path {
            Some(path) => {
                let data = std::fs::read(path).map_err(Error::ConfigReadFailed)?;
                serde_yaml::from_slice(&data).map_err(Error::ConfigDeserializeFailed)?
            }
            None => RawConfig::default(),
        };
        Self::from_raw(raw, |key| std::env::var(key).ok())
    }

    fn from_raw(config: RawConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let addr = env("HUMANIZER_LISTEN_ADDR").unwrap_or(config.listen_addr);
        let listen_addr = addr
            .parse::<std::net::IpAddr>()
            .map_err(|e| Error::InvalidIp(e.to_string()))?;

        let listen_port = match env("PORT") {
            Some(port) => port.parse().map_err(|_| Error::InvalidPort(port))?,
            None => config.listen_port,
        };

        let jwt_secret = env("JWT_SECRET").unwrap_or(config.jwt_secret);

        let mut llm = config.llm;
        if let Some(key) = env("OPENAI_API_KEY") {
            llm.api_key = Some(key);
        }
        if let Some(url) = env("OPENAI_BASE_URL") {
            llm.base_url = url;
        }

        Ok(Self {
            listen_addr,
            listen_port,
            jwt_secret,
            llm,
            humanize: config.humanize,
            rewrite: config.rewrite,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let raw = RawConfig::default();
        Self {
            listen_addr: std::net::IpAddr::from([0, 0, 0, 0]),
            listen_port: raw.listen_port,
            jwt_secret: raw.jwt_secret,
            llm: raw.llm,
            humanize: raw.humanize,
            rewrite: raw.rewrite,
        }
    }
}
