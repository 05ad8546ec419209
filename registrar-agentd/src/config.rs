use std::path::{Path, PathBuf};
use serde::Deserialize;
use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub agent: AgentConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Address recorded for ports the runtime reports without one
    pub default_ip: String,
    /// Container listing written by the runtime, in `containers/json` format
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Overrides the system hostname stamped on records
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Records not refreshed for longer than this are evicted
    #[serde(default = "default_lifespan")]
    pub lifespan_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("/var/run/service-registrar/containers.json")
}

fn default_refresh_interval() -> u64 {
    10
}

fn default_lifespan() -> u64 {
    80
}

fn default_sweep_interval() -> u64 {
    20
}

fn default_listen() -> String {
    "[::]:7779".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lifespan_secs: default_lifespan(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl RegistryConfig {
    pub fn lifespan(&self) -> Result<chrono::Duration> {
        i64::try_from(self.lifespan_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .with_context(|| format!("registry.lifespan_secs out of range: {}", self.lifespan_secs))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Reject values that parse but cannot drive the refresh and sweep timers
    pub fn validate(&self) -> Result<()> {
        if self.agent.refresh_interval_secs == 0 {
            bail!("agent.refresh_interval_secs must be greater than 0");
        }
        if self.registry.sweep_interval_secs == 0 {
            bail!("registry.sweep_interval_secs must be greater than 0");
        }
        self.registry.lifespan()?;
        Ok(())
    }
}
