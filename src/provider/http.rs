//! JSON-RPC provider
//!
//! Serves the EIP-1193 surface from a plain Ethereum JSON-RPC endpoint.
//! Change notifications are produced by polling, since HTTP endpoints
//! cannot push them.

use super::{
    EventKind, Listener, ListenerId, ListenerRegistry, Provider, ProviderEvent, RpcRequest,
    ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS,
};
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

pub struct HttpProvider {
    client: reqwest::Client,
    rpc_url: String,
    next_id: AtomicU64,
    watch_accounts: Vec<String>,
    listeners: ListenerRegistry,
}

impl HttpProvider {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(rpc_url)
            .map_err(|e| WalletError::ConfigError(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WalletError::ConfigError(format!(
                "Unsupported RPC URL scheme: {}",
                parsed.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rpc_url: parsed.to_string(),
            next_id: AtomicU64::new(1),
            watch_accounts: Vec::new(),
            listeners: ListenerRegistry::new(),
        })
    }

    /// Answer account requests from a fixed watch-only list instead of the node.
    pub fn with_watch_accounts(mut self, accounts: Vec<String>) -> Self {
        self.watch_accounts = accounts;
        self
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call(&self, method: &str, params: &Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        log::debug!("JSON-RPC #{} {} -> {}", id, method, self.rpc_url);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::rpc(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        let response: JsonRpcResponse = response.json().await.map_err(|e| {
            WalletError::rpc(format!(
                "Failed to parse {} response (HTTP {}): {}",
                method, status, e
            ))
        })?;

        if let Some(error) = response.error {
            return Err(WalletError::from_rpc(error.code, error.message));
        }
        response
            .result
            .ok_or_else(|| WalletError::InvalidResponse(format!("{} returned no result", method)))
    }

    async fn accounts(&self) -> Result<Value> {
        if self.watch_accounts.is_empty() {
            self.call(ETH_ACCOUNTS, &json!([])).await
        } else {
            Ok(json!(self.watch_accounts))
        }
    }

    /// Poll accounts and chain id, emitting change notifications when either
    /// differs from the last value seen. The first successful poll always
    /// emits, so a change made before polling began is still delivered.
    ///
    /// The returned future holds only a weak reference and completes once the
    /// provider is dropped; spawn it on the runtime of your choice.
    pub fn watch_changes(
        self: &Arc<Self>,
        interval: Duration,
    ) -> impl Future<Output = ()> + Send + 'static {
        let weak: Weak<Self> = Arc::downgrade(self);
        async move {
            let mut last_accounts: Option<Vec<String>> = None;
            let mut last_chain: Option<String> = None;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(provider) = weak.upgrade() else {
                    log::debug!("Provider dropped, stopping change watcher");
                    break;
                };

                match provider.accounts().await {
                    Ok(value) => match serde_json::from_value::<Vec<String>>(value) {
                        Ok(accounts) => {
                            if last_accounts.as_ref() != Some(&accounts) {
                                provider
                                    .listeners
                                    .emit(&ProviderEvent::AccountsChanged(accounts.clone()));
                            }
                            last_accounts = Some(accounts);
                        }
                        Err(e) => log::warn!("Ignoring malformed eth_accounts result: {}", e),
                    },
                    Err(e) => log::warn!("Account poll failed: {}", e),
                }

                match provider.call(ETH_CHAIN_ID, &json!([])).await {
                    Ok(Value::String(chain)) => {
                        if last_chain.as_ref() != Some(&chain) {
                            provider
                                .listeners
                                .emit(&ProviderEvent::ChainChanged(chain.clone()));
                        }
                        last_chain = Some(chain);
                    }
                    Ok(other) => log::warn!("Ignoring malformed eth_chainId result: {}", other),
                    Err(e) => log::warn!("Chain id poll failed: {}", e),
                }
            }
        }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn request(&self, request: RpcRequest) -> Result<Value> {
        match request.method.as_str() {
            // Nodes have no authorization prompt; the account list is the grant
            ETH_REQUEST_ACCOUNTS | ETH_ACCOUNTS => self.accounts().await,
            method => self.call(method, &request.params).await,
        }
    }

    fn on(&self, kind: EventKind, listener: Listener) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        self.listeners.remove(kind, id)
    }
}
