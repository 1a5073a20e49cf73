//! Wallet provider capability
//!
//! The request/notification surface of an EIP-1193 provider, injected into
//! the connection and balance services instead of being looked up globally.

pub mod http;

use crate::error::{Result, WalletError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use http::HttpProvider;

pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            method: method.to_string(),
            params,
        }
    }

    pub fn without_params(method: &str) -> Self {
        Self::new(method, json!([]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "accountsChanged")]
    AccountsChanged,
    #[serde(rename = "chainChanged")]
    ChainChanged,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AccountsChanged => "accountsChanged",
            EventKind::ChainChanged => "chainChanged",
        }
    }
}

/// Notification payloads as the provider delivers them
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    /// Hex-encoded chain id, e.g. `"0x1"`
    ChainChanged(String),
}

impl ProviderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => EventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => EventKind::ChainChanged,
        }
    }
}

pub type Listener = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[async_trait]
pub trait Provider: Send + Sync {
    async fn request(&self, request: RpcRequest) -> Result<Value>;
    fn on(&self, kind: EventKind, listener: Listener) -> ListenerId;
    fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool;
}

/// Listener table shared by provider implementations
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, Listener)>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.entry(kind).or_default().push((id, listener));
        id
    }

    pub fn remove(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        match listeners.get_mut(&kind) {
            Some(entries) => {
                let before = entries.len();
                entries.retain(|(existing, _)| *existing != id);
                entries.len() != before
            }
            None => false,
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Deliver an event to every listener registered for its kind.
    pub fn emit(&self, event: &ProviderEvent) {
        // Snapshot first so listeners may (un)register without deadlocking
        let targets: Vec<Listener> = {
            let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners
                .get(&event.kind())
                .map(|entries| entries.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default()
        };

        log::debug!(
            "Emitting {} to {} listener(s)",
            event.kind().as_str(),
            targets.len()
        );
        for listener in targets {
            listener(event);
        }
    }
}

/// Typed wrappers around the raw `request` surface
#[async_trait]
pub trait ProviderExt: Provider {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        let value = self
            .request(RpcRequest::without_params(ETH_REQUEST_ACCOUNTS))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| WalletError::InvalidResponse(format!("accounts: {}", e)))
    }

    async fn chain_id(&self) -> Result<String> {
        let value = self.request(RpcRequest::without_params(ETH_CHAIN_ID)).await?;
        match value {
            Value::String(s) => Ok(s),
            // Some providers answer with a bare number
            Value::Number(n) => n.as_u64().map(|id| format!("0x{:x}", id)).ok_or_else(|| {
                WalletError::InvalidResponse(format!("chain id: {} is not a valid id", n))
            }),
            other => Err(WalletError::InvalidResponse(format!(
                "chain id: unexpected {}",
                other
            ))),
        }
    }

    async fn get_balance(&self, address: &str, block: &str) -> Result<String> {
        let value = self
            .request(RpcRequest::new(ETH_GET_BALANCE, json!([address, block])))
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WalletError::InvalidResponse(format!("balance: unexpected {}", value)))
    }
}

impl<P: Provider + ?Sized> ProviderExt for P {}
