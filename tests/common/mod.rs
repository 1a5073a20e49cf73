//! Scriptable in-memory provider shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use wallet_connect_lib::error::{Result, WalletError};
use wallet_connect_lib::provider::{
    EventKind, Listener, ListenerId, ListenerRegistry, Provider, ProviderEvent, RpcRequest,
};

pub const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

pub struct FakeProvider {
    listeners: ListenerRegistry,
    accounts: Mutex<Result<Vec<String>>>,
    chain_id: Mutex<String>,
    balances: Mutex<HashMap<String, String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<RpcRequest>>,
}

impl FakeProvider {
    pub fn new(accounts: &[&str], chain_id: &str) -> Self {
        Self {
            listeners: ListenerRegistry::new(),
            accounts: Mutex::new(Ok(accounts.iter().map(|a| a.to_string()).collect())),
            chain_id: Mutex::new(chain_id.to_string()),
            balances: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        let provider = Self::new(&[], "0x1");
        provider.reject_accounts();
        provider
    }

    /// Answer every later account request with a user rejection.
    pub fn reject_accounts(&self) {
        *self.accounts.lock().unwrap() = Err(WalletError::from_rpc(
            4001,
            "User rejected the request.",
        ));
    }

    pub fn with_balance(self, address: &str, wei_hex: &str) -> Self {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_lowercase(), wei_hex.to_string());
        self
    }

    /// Hold `eth_getBalance` for `address` until the returned handle is notified.
    pub fn gate(&self, address: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(address.to_lowercase(), notify.clone());
        notify
    }

    pub fn emit(&self, event: ProviderEvent) {
        self.listeners.emit(&event);
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.count(kind)
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn request(&self, request: RpcRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.clone());
        match request.method.as_str() {
            "eth_requestAccounts" => self.accounts.lock().unwrap().clone().map(|a| json!(a)),
            "eth_chainId" => Ok(json!(self.chain_id.lock().unwrap().clone())),
            "eth_getBalance" => {
                let address = request.params[0].as_str().unwrap_or_default().to_lowercase();
                let gate = self.gates.lock().unwrap().get(&address).cloned();
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                let balance = self.balances.lock().unwrap().get(&address).cloned();
                Ok(json!(balance.unwrap_or_else(|| "0x0".to_string())))
            }
            other => Err(WalletError::from_rpc(-32601, format!("method {} not found", other))),
        }
    }

    fn on(&self, kind: EventKind, listener: Listener) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        self.listeners.remove(kind, id)
    }
}
