//! # Configuration
//!
//! Settings come from an optional YAML file named by `MEMENTO_CONFIG`,
//! overlaid by environment variables. Secrets (API keys, webhook secret)
//! are normally supplied through the environment only.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::backend::clients::openai::{DEFAULT_MODEL, OPENAI_API_URL};
use crate::backend::clients::stripe::STRIPE_API_URL;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub data_dir: PathBuf,
    /// Origin allowed by CORS, i.e. where the web UI is served from
    pub allowed_origin: String,
    /// Used to build redirect URLs when a request carries no Origin header
    pub default_origin: String,
    pub openai: OpenAiSettings,
    pub stripe: StripeSettings,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StripeSettings {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            data_dir: PathBuf::from("memento-data"),
            allowed_origin: "http://localhost:3000".to_string(),
            default_origin: "http://localhost:3000".to_string(),
            openai: OpenAiSettings::default(),
            stripe: StripeSettings::default(),
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }
}

impl Default for StripeSettings {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            api_base: STRIPE_API_URL.to_string(),
        }
    }
}

// Keys never end up in logs
fn redacted(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<set>"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl fmt::Debug for StripeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeSettings")
            .field("secret_key", &redacted(&self.secret_key))
            .field("webhook_secret", &redacted(&self.webhook_secret))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = match var("MEMENTO_CONFIG") {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path))?;
                serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path))?
            }
            None => AppConfig::default(),
        };

        if let Some(v) = var("MEMENTO_BIND_ADDR") {
            config.bind_address = v;
        }
        if let Some(v) = var("MEMENTO_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = var("MEMENTO_ALLOWED_ORIGIN") {
            config.allowed_origin = v;
        }
        if let Some(v) = var("MEMENTO_DEFAULT_ORIGIN") {
            config.default_origin = v;
        }
        if let Some(v) = var("OPENAI_API_KEY") {
            config.openai.api_key = Some(v);
        }
        if let Some(v) = var("OPENAI_MODEL") {
            config.openai.model = v;
        }
        if let Some(v) = var("OPENAI_BASE_URL") {
            config.openai.base_url = v;
        }
        if let Some(v) = var("STRIPE_SECRET_KEY") {
            config.stripe.secret_key = Some(v);
        }
        if let Some(v) = var("STRIPE_WEBHOOK_SECRET") {
            config.stripe.webhook_secret = Some(v);
        }
        if let Some(v) = var("STRIPE_API_BASE") {
            config.stripe.api_base = v;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))
    }
}
