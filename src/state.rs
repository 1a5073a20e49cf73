use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::chain::NetworkRegistry;
use crate::error::Result;
use crate::provider::{HttpProvider, Provider};
use crate::services::balance::BalanceReading;
use crate::services::config::WalletConfig;
use crate::services::{BalanceService, ConfigService, WalletConnection};
use crate::view::ViewModel;

/// Global application state managed by Tauri
pub struct AppState {
    pub config: Arc<RwLock<ConfigService>>,
    /// Set when the provider is backed by a JSON-RPC endpoint
    pub http_provider: Option<Arc<HttpProvider>>,
    pub connection: Arc<WalletConnection>,
    /// Lookup for the address typed by the user
    pub lookup: Arc<BalanceService>,
    /// Balance of the connected account
    pub account_balance: Arc<BalanceService>,
    pub networks: Arc<RwLock<NetworkRegistry>>,
    pub address_input: Arc<RwLock<String>>,
}

impl AppState {
    pub fn new() -> Self {
        let config_service = ConfigService::new();
        let app_config = config_service.get();
        let http_provider = build_http_provider(&app_config).map(Arc::new);

        let provider = http_provider
            .clone()
            .map(|p| p as Arc<dyn Provider>);
        let mut state = Self::with_provider(provider, config_service);
        state.http_provider = http_provider;
        state
    }

    /// Assemble the services around an already constructed provider.
    pub fn with_provider(provider: Option<Arc<dyn Provider>>, config: ConfigService) -> Self {
        let app_config = config.get();
        log::info!(
            "Initializing wallet state: provider={}, auto_connect={}, custom networks={}",
            if provider.is_some() { "configured" } else { "none" },
            app_config.auto_connect,
            app_config.networks.len()
        );

        Self {
            config: Arc::new(RwLock::new(config)),
            http_provider: None,
            connection: Arc::new(WalletConnection::new(provider.clone())),
            lookup: Arc::new(BalanceService::new(provider.clone())),
            account_balance: Arc::new(BalanceService::new(provider)),
            networks: Arc::new(RwLock::new(NetworkRegistry::with_overrides(
                &app_config.networks,
            ))),
            address_input: Arc::new(RwLock::new(String::new())),
        }
    }

    pub async fn view(&self) -> ViewModel {
        let networks = self.networks.read().await;
        let address_input = self.address_input.read().await;
        ViewModel::render(
            &self.connection.snapshot(),
            &address_input,
            &self.lookup.latest(),
            &self.account_balance.latest(),
            &networks,
        )
    }

    pub async fn set_address_input(&self, address: String) {
        *self.address_input.write().await = address;
    }

    /// Look up the balance of the address currently in the input field.
    pub async fn check_input_balance(&self) -> Result<BalanceReading> {
        let address = self.address_input.read().await.clone();
        let chain_id = self.connection.snapshot().chain_id;
        let symbol = self.networks.read().await.symbol(chain_id).to_string();
        self.lookup.check_balance(&address, &symbol).await
    }

    /// Apply network overrides from a freshly saved configuration.
    pub async fn reload_networks(&self, config: &WalletConfig) {
        *self.networks.write().await = NetworkRegistry::with_overrides(&config.networks);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn build_http_provider(config: &WalletConfig) -> Option<HttpProvider> {
    let url = config.provider.rpc_url.as_deref()?;
    let timeout = Duration::from_secs(config.provider.request_timeout_secs);
    match HttpProvider::new(url, timeout) {
        Ok(provider) => {
            log::info!("Using JSON-RPC provider at {}", provider.rpc_url());
            Some(provider.with_watch_accounts(config.provider.watch_accounts.clone()))
        }
        Err(e) => {
            log::error!("Wallet provider unavailable: {}", e);
            None
        }
    }
}
