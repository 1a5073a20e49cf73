//! Wallet connection
//!
//! Requests account access and the active chain from the provider, then keeps
//! both current by listening for `accountsChanged` / `chainChanged`. The
//! latest notification always wins.

use crate::chain::parse_chain_id;
use crate::error::{Result, WalletError};
use crate::provider::{
    EventKind, Listener, ListenerId, Provider, ProviderEvent, ProviderExt,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "camelCase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(WalletError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub account: Option<String>,
    pub chain_id: Option<u64>,
    pub status: ConnectionStatus,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn error(&self) -> Option<&WalletError> {
        match &self.status {
            ConnectionStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

pub struct WalletConnection {
    provider: Option<Arc<dyn Provider>>,
    state: Arc<watch::Sender<ConnectionState>>,
    subscriptions: Mutex<Vec<(EventKind, ListenerId)>>,
}

impl WalletConnection {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        Self {
            provider,
            state: Arc::new(state),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn provider(&self) -> Option<Arc<dyn Provider>> {
        self.provider.clone()
    }

    pub fn snapshot(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Request accounts and chain id, then start following provider
    /// notifications. Failures are recorded in the state and returned.
    pub async fn connect(&self) -> Result<ConnectionState> {
        let Some(provider) = self.provider.clone() else {
            log::error!("No wallet provider available, configure an RPC endpoint");
            return Err(self.fail(WalletError::NoProvider));
        };

        self.state
            .send_modify(|s| s.status = ConnectionStatus::Connecting);

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                log::error!("Account request failed: {}", e);
                return Err(self.fail(e));
            }
        };

        let chain_id = match provider.chain_id().await.and_then(|raw| parse_chain_id(&raw)) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Chain id request failed: {}", e);
                return Err(self.fail(e));
            }
        };

        let account = accounts.into_iter().next();
        log::info!(
            "Wallet connected: account={}, chain={}",
            account.as_deref().unwrap_or("<none>"),
            chain_id
        );
        self.state.send_modify(|s| {
            s.status = if account.is_some() {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            };
            s.account = account;
            s.chain_id = Some(chain_id);
        });

        self.register_listeners(provider.as_ref());
        Ok(self.snapshot())
    }

    /// Stop following notifications and clear the state.
    pub fn disconnect(&self) {
        self.unregister_listeners();
        self.state.send_replace(ConnectionState::default());
        log::info!("Wallet disconnected");
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Drop everything from an earlier connect and record the failure.
    fn fail(&self, error: WalletError) -> WalletError {
        self.unregister_listeners();
        self.state.send_replace(ConnectionState {
            status: ConnectionStatus::Failed(error.clone()),
            ..Default::default()
        });
        error
    }

    fn register_listeners(&self, provider: &dyn Provider) {
        let mut subscriptions = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        if !subscriptions.is_empty() {
            log::debug!("Provider listeners already registered");
            return;
        }

        let state = self.state.clone();
        let on_accounts: Listener = Arc::new(move |event: &ProviderEvent| {
            if let ProviderEvent::AccountsChanged(accounts) = event {
                apply_accounts(&state, accounts);
            }
        });
        let state = self.state.clone();
        let on_chain: Listener = Arc::new(move |event: &ProviderEvent| {
            if let ProviderEvent::ChainChanged(raw) = event {
                apply_chain(&state, raw);
            }
        });

        subscriptions.push((
            EventKind::AccountsChanged,
            provider.on(EventKind::AccountsChanged, on_accounts),
        ));
        subscriptions.push((
            EventKind::ChainChanged,
            provider.on(EventKind::ChainChanged, on_chain),
        ));
    }

    fn unregister_listeners(&self) {
        let mut subscriptions = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(provider) = &self.provider {
            for (kind, id) in subscriptions.drain(..) {
                if !provider.remove_listener(kind, id) {
                    log::warn!("Listener for {} was already removed", kind.as_str());
                }
            }
        }
    }
}

impl Drop for WalletConnection {
    fn drop(&mut self) {
        self.unregister_listeners();
    }
}

fn apply_accounts(state: &watch::Sender<ConnectionState>, accounts: &[String]) {
    let account = accounts.first().cloned();
    log::info!(
        "Accounts changed: {}",
        account.as_deref().unwrap_or("<none>")
    );
    state.send_modify(|s| {
        // An empty list means the wallet revoked access or was locked
        s.status = if account.is_some() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        s.account = account;
    });
}

fn apply_chain(state: &watch::Sender<ConnectionState>, raw: &str) {
    match parse_chain_id(raw) {
        Ok(chain_id) => {
            log::info!("Chain changed: {}", chain_id);
            state.send_modify(|s| s.chain_id = Some(chain_id));
        }
        Err(e) => log::warn!("Ignoring chainChanged notification: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ListenerRegistry, RpcRequest};
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::{json, Value};

    mock! {
        pub Rpc {}

        #[async_trait]
        impl Provider for Rpc {
            async fn request(&self, request: RpcRequest) -> Result<Value>;
            fn on(&self, kind: EventKind, listener: Listener) -> ListenerId;
            fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool;
        }
    }

    #[tokio::test]
    async fn test_no_provider_fails_quietly() {
        let connection = WalletConnection::new(None);
        let err = connection.connect().await.unwrap_err();

        assert_eq!(err, WalletError::NoProvider);
        let state = connection.snapshot();
        assert_eq!(state.account, None);
        assert_eq!(state.chain_id, None);
        assert_eq!(state.status, ConnectionStatus::Failed(WalletError::NoProvider));
    }

    #[tokio::test]
    async fn test_rejected_authorization_registers_nothing() {
        let mut rpc = MockRpc::new();
        rpc.expect_request()
            .withf(|req| req.method == "eth_requestAccounts")
            .times(1)
            .returning(|_| Err(WalletError::from_rpc(4001, "User rejected the request.")));
        rpc.expect_on().never();

        let connection = WalletConnection::new(Some(Arc::new(rpc)));
        let err = connection.connect().await.unwrap_err();

        assert!(matches!(err, WalletError::AuthorizationDenied(_)));
        assert!(matches!(
            connection.snapshot().status,
            ConnectionStatus::Failed(WalletError::AuthorizationDenied(_))
        ));
        assert_eq!(connection.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_chain_request_failure_is_rpc_failure() {
        let mut rpc = MockRpc::new();
        rpc.expect_request().returning(|req| match req.method.as_str() {
            "eth_requestAccounts" => Ok(json!(["0xABC"])),
            _ => Err(WalletError::from_rpc(-32603, "internal error")),
        });

        let connection = WalletConnection::new(Some(Arc::new(rpc)));
        let err = connection.connect().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::RpcFailure);
        assert_eq!(connection.snapshot().account, None);
    }

    #[tokio::test]
    async fn test_listeners_drive_state() {
        let registry = Arc::new(ListenerRegistry::new());
        let mut rpc = MockRpc::new();
        rpc.expect_request().returning(|req| match req.method.as_str() {
            "eth_requestAccounts" => Ok(json!(["0xABC"])),
            "eth_chainId" => Ok(json!("0x1")),
            other => panic!("unexpected {}", other),
        });
        let on_registry = registry.clone();
        rpc.expect_on()
            .times(2)
            .returning(move |kind, listener| on_registry.add(kind, listener));
        let remove_registry = registry.clone();
        rpc.expect_remove_listener()
            .times(2)
            .returning(move |kind, id| remove_registry.remove(kind, id));

        let connection = WalletConnection::new(Some(Arc::new(rpc)));
        connection.connect().await.unwrap();

        registry.emit(&ProviderEvent::ChainChanged("0xaa36a7".to_string()));
        registry.emit(&ProviderEvent::AccountsChanged(vec!["0xDEF".to_string()]));
        let state = connection.snapshot();
        assert_eq!(state.account.as_deref(), Some("0xDEF"));
        assert_eq!(state.chain_id, Some(11155111));

        // Malformed chain ids leave the last good value in place
        registry.emit(&ProviderEvent::ChainChanged("bogus".to_string()));
        assert_eq!(connection.snapshot().chain_id, Some(11155111));

        drop(connection);
        assert_eq!(registry.count(EventKind::AccountsChanged), 0);
        assert_eq!(registry.count(EventKind::ChainChanged), 0);
    }
}
