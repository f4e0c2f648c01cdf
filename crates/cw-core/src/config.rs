//! Configuration management
//!
//! Settings are read in this order of precedence:
//! 1. Environment variables
//! 2. `cw-bridge.toml` config file
//! 3. Default values
//!
//! `${VAR_NAME}` references inside the config file are expanded from the
//! environment before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cw-bridge.toml";

/// Meta WhatsApp Cloud API settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Secret echoed back by Meta during webhook verification
    pub verify_token: String,

    /// Bearer token for the send endpoint
    pub api_token: String,

    /// Full send endpoint URL, e.g. `https://graph.facebook.com/v18.0/<phone-id>/messages`
    pub api_url: String,
}

/// Chatwoot API settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatwootConfig {
    /// Base URL of the Chatwoot installation
    pub base_url: String,

    /// `api_access_token` header value
    pub api_token: String,

    pub account_id: u64,

    pub inbox_id: u64,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Message routing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Fixed text sent back to every inbound sender
    #[serde(default = "default_auto_reply")]
    pub auto_reply: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            auto_reply: default_auto_reply(),
        }
    }
}

/// Main configuration for cw-bridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub meta: MetaConfig,

    #[serde(default)]
    pub chatwoot: ChatwootConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

fn default_port() -> u16 {
    5000
}

fn default_auto_reply() -> String {
    "Obrigado pela sua mensagem!".to_string()
}

// TOML file layout: every field optional so partial files fall back to env/defaults

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    meta: Option<TomlMeta>,
    chatwoot: Option<TomlChatwoot>,
    server: Option<TomlServer>,
    relay: Option<TomlRelay>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlMeta {
    verify_token: Option<String>,
    api_token: Option<String>,
    api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlChatwoot {
    base_url: Option<String>,
    api_token: Option<String>,
    account_id: Option<u64>,
    inbox_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlServer {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlRelay {
    auto_reply: Option<String>,
}

impl Config {
    /// Replace `${VAR_NAME}` with the environment value.
    ///
    /// Unset variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists, or from
    /// the environment alone.
    pub fn load(path: Option<&str>) -> crate::Result<Self> {
        if let Some(path) = path {
            return Self::from_toml_file(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load a TOML config file, expanding `${VAR}` and applying env overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut cfg = Self::from_toml_str(&Self::expand_env_vars(&toml_content))?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Parse TOML content without consulting the environment
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let toml: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let meta = toml.meta.unwrap_or_default();
        let chatwoot = toml.chatwoot.unwrap_or_default();
        let server = toml.server.unwrap_or_default();
        let relay = toml.relay.unwrap_or_default();

        Ok(Config {
            meta: MetaConfig {
                verify_token: meta.verify_token.unwrap_or_default(),
                api_token: meta.api_token.unwrap_or_default(),
                api_url: meta.api_url.unwrap_or_default(),
            },
            chatwoot: ChatwootConfig {
                base_url: chatwoot.base_url.unwrap_or_default(),
                api_token: chatwoot.api_token.unwrap_or_default(),
                account_id: chatwoot.account_id.unwrap_or_default(),
                inbox_id: chatwoot.inbox_id.unwrap_or_default(),
            },
            server: ServerConfig {
                port: server.port.unwrap_or_else(default_port),
            },
            relay: RelayConfig {
                auto_reply: relay.auto_reply.unwrap_or_else(default_auto_reply),
            },
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> crate::Result<String> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };
        let required_id = |key: &str| -> crate::Result<u64> {
            let raw = required(key)?;
            raw.trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, raw)))
        };

        Ok(Config {
            meta: MetaConfig {
                verify_token: required("META_VERIFY_TOKEN")?,
                api_token: required("META_API_TOKEN")?,
                api_url: required("META_API_URL")?,
            },
            chatwoot: ChatwootConfig {
                base_url: required("CHATWOOT_URL")?,
                api_token: required("CHATWOOT_API_TOKEN")?,
                account_id: required_id("CHATWOOT_ACCOUNT_ID")?,
                inbox_id: required_id("CHATWOOT_INBOX_ID")?,
            },
            server: ServerConfig {
                port: lookup("PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_else(default_port),
            },
            relay: RelayConfig {
                auto_reply: lookup("AUTO_REPLY_MESSAGE")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(default_auto_reply),
            },
        })
    }

    /// Override file values with any environment variables that are set
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = set("META_VERIFY_TOKEN") {
            self.meta.verify_token = v;
        }
        if let Some(v) = set("META_API_TOKEN") {
            self.meta.api_token = v;
        }
        if let Some(v) = set("META_API_URL") {
            self.meta.api_url = v;
        }

        if let Some(v) = set("CHATWOOT_URL") {
            self.chatwoot.base_url = v;
        }
        if let Some(v) = set("CHATWOOT_API_TOKEN") {
            self.chatwoot.api_token = v;
        }
        if let Some(v) = set("CHATWOOT_ACCOUNT_ID") {
            match v.trim().parse() {
                Ok(id) => self.chatwoot.account_id = id,
                Err(_) => warn!("Ignoring non-numeric CHATWOOT_ACCOUNT_ID: {}", v),
            }
        }
        if let Some(v) = set("CHATWOOT_INBOX_ID") {
            match v.trim().parse() {
                Ok(id) => self.chatwoot.inbox_id = id,
                Err(_) => warn!("Ignoring non-numeric CHATWOOT_INBOX_ID: {}", v),
            }
        }

        if let Some(port) = set("PORT") {
            match port.trim().parse() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!("Ignoring non-numeric PORT: {}", port),
            }
        }
        if let Some(v) = set("AUTO_REPLY_MESSAGE") {
            self.relay.auto_reply = v;
        }
    }

    /// Check that every required setting is present
    pub fn validate(&self) -> crate::Result<()> {
        let mut missing = Vec::new();

        if self.meta.verify_token.is_empty() {
            missing.push("meta.verify_token");
        }
        if self.meta.api_token.is_empty() {
            missing.push("meta.api_token");
        }
        if self.meta.api_url.is_empty() {
            missing.push("meta.api_url");
        }
        if self.chatwoot.base_url.is_empty() {
            missing.push("chatwoot.base_url");
        }
        if self.chatwoot.api_token.is_empty() {
            missing.push("chatwoot.api_token");
        }
        if self.chatwoot.account_id == 0 {
            missing.push("chatwoot.account_id");
        }
        if self.chatwoot.inbox_id == 0 {
            missing.push("chatwoot.inbox_id");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}
