use crate::chain::Network;
use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "WALLET_CONNECT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// JSON-RPC endpoint; no endpoint means no provider
    pub rpc_url: Option<String>,
    /// Watch-only accounts reported instead of the node's own accounts
    pub watch_accounts: Vec<String>,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            rpc_url: None,
            watch_accounts: Vec::new(),
            request_timeout_secs: 30,
            poll_interval_secs: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub provider: ProviderSettings,
    pub auto_connect: bool,
    pub log_level: String,
    pub networks: Vec<Network>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            auto_connect: true,
            log_level: "info".to_string(),
            networks: Vec::new(),
        }
    }
}

impl WalletConfig {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Loads and persists `config.toml`
pub struct ConfigService {
    path: PathBuf,
    config: WalletConfig,
}

impl ConfigService {
    /// Load from the platform config directory, falling back to defaults.
    pub fn new() -> Self {
        let path = Self::default_path();
        match Self::load(&path) {
            Ok(service) => service,
            Err(e) => {
                log::warn!("Failed to load config from {}: {}", path.display(), e);
                Self {
                    path,
                    config: WalletConfig::default(),
                }
            }
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("wallet-connect"))
            .unwrap_or_else(|| PathBuf::from(".wallet-connect"))
            .join("config.toml")
    }

    /// Read `path` (optional) layered under `WALLET_CONNECT__*` environment
    /// overrides, e.g. `WALLET_CONNECT__PROVIDER__RPC_URL`.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let config: WalletConfig = settings.try_deserialize()?;

        log::info!("Loaded config from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> WalletConfig {
        self.config.clone()
    }

    pub fn update(&mut self, config: WalletConfig) -> Result<()> {
        if let Some(url) = &config.provider.rpc_url {
            url::Url::parse(url)
                .map_err(|e| WalletError::ConfigError(format!("Invalid RPC URL {}: {}", url, e)))?;
        }
        self.config = config;
        self.save()
    }

    pub fn reset(&mut self) -> Result<()> {
        self.update(WalletConfig::default())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| WalletError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&self.path, content)?;
        log::info!("Saved config to {}", self.path.display());
        Ok(())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
