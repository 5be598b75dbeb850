//! Command-line and environment configuration.

use std::fmt;

use clap::{Parser, ValueEnum};
use dart::{DartError, Result, ScopePolicy};

/// Named scope policies selectable at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyPreset {
    /// Every report code, no consolidation lock.
    Unrestricted,
    /// Every report code, consolidated statements only.
    Consolidated,
    /// Consolidated annual business reports only.
    #[default]
    AnnualOnly,
}

impl PolicyPreset {
    /// Builds the policy this preset names.
    #[must_use]
    pub fn policy(self) -> ScopePolicy {
        match self {
            Self::Unrestricted => ScopePolicy::unrestricted(),
            Self::Consolidated => ScopePolicy::consolidated(),
            Self::AnnualOnly => ScopePolicy::annual_only(),
        }
    }
}

/// Proxy configuration, read from flags with environment fallbacks.
#[derive(Clone, Parser)]
#[command(name = "dart-proxy")]
#[command(about = "Scope-locked OpenDART proxy", long_about = None)]
#[command(version)]
pub struct Config {
    /// OpenDART API key
    #[arg(long, env = "OPENDART_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Token clients must present as `Authorization: Bearer <token>`
    #[arg(long, env = "PROXY_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Scope policy
    #[arg(long, env = "DART_SCOPE_POLICY", value_enum, default_value_t = PolicyPreset::AnnualOnly)]
    pub policy: PolicyPreset,

    /// OpenDART API root
    #[arg(long, env = "OPENDART_BASE_URL", default_value = dart::OPENDART_BASE_URL)]
    pub base_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("policy", &self.policy)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// The OpenDART credential; missing or blank is a startup error.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DartError::Config("OPENDART_API_KEY is not set".to_string()))
    }

    /// The inbound bearer token; blank disables auth.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// `host:port` to listen on.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
