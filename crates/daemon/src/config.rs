//! Node configuration
//!
//! Optional TOML file layered under `LEDGER_RPC__*` environment variables,
//! e.g. `LEDGER_RPC__RPC__PORT=6006` overrides `rpc.port`.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use ledger_rpc_api::{AdminPolicy, ResourceConfig, RpcServerConfig, DEFAULT_MAX_REQUEST_SIZE};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "~/.ledger-rpc/config.toml";
pub const CONFIG_PATH_ENV: &str = "LEDGER_RPC_CONFIG";
const ENV_PREFIX: &str = "LEDGER_RPC";
const ENV_SEPARATOR: &str = "__";

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub rpc: RpcSection,
    pub resource: ResourceSection,
    pub ledger: LedgerSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSection {
    pub host: String,
    pub port: u16,
    pub allow_remote: bool,
    pub max_request_size: usize,
    pub admin_allow: Vec<IpAddr>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for RpcSection {
    fn default() -> Self {
        let server = RpcServerConfig::default();
        Self {
            host: server.host,
            port: server.port,
            allow_remote: server.allow_remote,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            admin_allow: vec![IpAddr::V4(Ipv4Addr::LOCALHOST), IpAddr::V6(Ipv6Addr::LOCALHOST)],
            admin_user: None,
            admin_password: None,
        }
    }
}

impl RpcSection {
    pub fn server_config(&self) -> RpcServerConfig {
        RpcServerConfig {
            host: self.host.clone(),
            port: self.port,
            allow_remote: self.allow_remote,
        }
    }

    pub fn admin_policy(&self) -> AdminPolicy {
        AdminPolicy {
            admin_allow: self.admin_allow.clone(),
            admin_user: self.admin_user.clone(),
            admin_password: self.admin_password.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourceSection {
    pub warning_threshold: u32,
    pub drop_threshold: u32,
    pub decay_window_secs: u32,
    pub sweep_interval_secs: u64,
}

impl Default for ResourceSection {
    fn default() -> Self {
        let limits = ResourceConfig::default();
        Self {
            warning_threshold: limits.warning_threshold,
            drop_threshold: limits.drop_threshold,
            decay_window_secs: limits.decay_window_secs,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl ResourceSection {
    pub fn resource_config(&self) -> ResourceConfig {
        ResourceConfig {
            warning_threshold: self.warning_threshold,
            drop_threshold: self.drop_threshold,
            decay_window_secs: self.decay_window_secs.max(1),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    /// JSON ledger fixture; the genesis ledger when unset
    pub fixture: Option<PathBuf>,
}

/// Config file path: `LEDGER_RPC_CONFIG`, else the default location.
pub fn config_path() -> PathBuf {
    let raw = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("rpc.admin_allow")
}

impl NodeConfig {
    /// Load from `path` (missing file is fine) plus the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(environment())
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        let mut config: NodeConfig = settings
            .try_deserialize()
            .context("invalid configuration")?;
        config.expand_paths();
        Ok(config)
    }

    /// Parse a TOML document without consulting the environment.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: NodeConfig = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .context("failed to parse configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        config.expand_paths();
        Ok(config)
    }

    fn expand_paths(&mut self) {
        if let Some(fixture) = &self.ledger.fixture {
            let expanded = shellexpand::tilde(&fixture.to_string_lossy()).into_owned();
            self.ledger.fixture = Some(PathBuf::from(expanded));
        }
    }
}
