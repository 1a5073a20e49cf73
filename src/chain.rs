use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parse a chain id as providers report it (`"0x1"`), tolerating plain decimal.
pub fn parse_chain_id(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse::<u64>(),
    };
    parsed.map_err(|e| WalletError::InvalidResponse(format!("chain id {:?}: {}", raw, e)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub chain_id: u64,
    pub name: String,
    pub symbol: String,
}

impl Network {
    fn new(chain_id: u64, name: &str, symbol: &str) -> Self {
        Self {
            chain_id,
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

pub const DEFAULT_SYMBOL: &str = "ETH";

const KNOWN_NETWORKS: &[(u64, &str, &str)] = &[
    (1, "Ethereum Mainnet", "ETH"),
    (10, "OP Mainnet", "ETH"),
    (56, "BNB Smart Chain", "BNB"),
    (137, "Polygon", "POL"),
    (1337, "Localhost", "ETH"),
    (8453, "Base", "ETH"),
    (17000, "Holesky", "ETH"),
    (31337, "Anvil / Hardhat", "ETH"),
    (42161, "Arbitrum One", "ETH"),
    (11155111, "Sepolia", "ETH"),
];

/// Chain id to display name lookup, extendable from configuration
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: HashMap<u64, Network>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        let networks = KNOWN_NETWORKS
            .iter()
            .map(|(id, name, symbol)| (*id, Network::new(*id, name, symbol)))
            .collect();
        Self { networks }
    }

    /// Built-in networks plus user entries; user entries win on conflict.
    pub fn with_overrides(overrides: &[Network]) -> Self {
        let mut registry = Self::new();
        for network in overrides {
            registry.networks.insert(network.chain_id, network.clone());
        }
        registry
    }

    pub fn get(&self, chain_id: u64) -> Option<&Network> {
        self.networks.get(&chain_id)
    }

    pub fn label(&self, chain_id: u64) -> String {
        match self.get(chain_id) {
            Some(network) => network.name.clone(),
            None => format!("Unknown network (chain {})", chain_id),
        }
    }

    pub fn symbol(&self, chain_id: Option<u64>) -> &str {
        chain_id
            .and_then(|id| self.get(id))
            .map(|n| n.symbol.as_str())
            .unwrap_or(DEFAULT_SYMBOL)
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
