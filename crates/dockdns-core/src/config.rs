//! Configuration types for the dockdns system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main dockdns configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// DNS listener settings
    #[serde(default)]
    pub dns: DnsConfig,

    /// Alias file settings
    #[serde(default)]
    pub alias: AliasConfig,
}

impl Config {
    /// Parse a configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.dns.ttl == 0 {
            return Err(crate::Error::config("answer TTL must be > 0"));
        }
        if self.alias.reload_interval_secs == 0 {
            return Err(crate::Error::config("alias reload interval must be > 0"));
        }
        Ok(())
    }
}

/// DNS listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Socket address the UDP listener binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Fixed time-to-live for answer records, in seconds
    ///
    /// Kept short so clients re-resolve quickly after registry churn.
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            ttl: default_ttl(),
        }
    }
}

/// Alias file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasConfig {
    /// Path to the two-column alias file
    #[serde(default = "default_alias_path")]
    pub path: PathBuf,

    /// Interval between alias file reloads, in seconds
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            path: default_alias_path(),
            reload_interval_secs: default_reload_interval_secs(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:53".parse().expect("static address parses")
}

fn default_ttl() -> u32 {
    60
}

fn default_alias_path() -> PathBuf {
    PathBuf::from("data/alias")
}

fn default_reload_interval_secs() -> u64 {
    10
}
