//! Balance lookups through the provider.
//!
//! Every query takes a token from a monotonically increasing counter. Only the
//! response for the most recently issued token is published, so a slow reply
//! to an older query can never overwrite a newer one.

use crate::address::validate_address;
use crate::error::{Result, WalletError};
use crate::provider::{Provider, ProviderExt};
use crate::units::{format_ether, parse_quantity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

pub const LATEST_BLOCK: &str = "latest";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReading {
    pub address: String,
    /// Base units as a decimal string
    pub raw: String,
    pub formatted: String,
    pub symbol: String,
    pub checked_at: DateTime<Utc>,
}

impl BalanceReading {
    pub fn display(&self) -> String {
        format!("{} {}", self.formatted, self.symbol)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum QueryStatus {
    #[default]
    Idle,
    Pending,
    Ready(BalanceReading),
    Failed(WalletError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    pub input_address: String,
    pub token: u64,
    pub status: QueryStatus,
}

pub struct BalanceService {
    provider: Option<Arc<dyn Provider>>,
    issued: AtomicU64,
    latest: watch::Sender<BalanceQuery>,
}

impl BalanceService {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        let (latest, _) = watch::channel(BalanceQuery::default());
        Self {
            provider,
            issued: AtomicU64::new(0),
            latest,
        }
    }

    pub fn latest(&self) -> BalanceQuery {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BalanceQuery> {
        self.latest.subscribe()
    }

    /// Forget the last result, e.g. when the followed account goes away.
    pub fn clear(&self) {
        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.send_replace(BalanceQuery {
            token,
            ..Default::default()
        });
    }

    /// Query the balance of `address` at the latest block.
    ///
    /// The caller always receives the outcome of its own request; the
    /// published [`BalanceQuery`] only changes if no newer query was issued
    /// in the meantime.
    pub async fn check_balance(&self, address: &str, symbol: &str) -> Result<BalanceReading> {
        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let input_address = address.to_string();

        let outcome = self.fetch(address, symbol, token).await;
        let status = match &outcome {
            Ok(reading) => QueryStatus::Ready(reading.clone()),
            Err(e) => {
                log::error!("Balance check for {:?} failed: {}", address, e);
                QueryStatus::Failed(e.clone())
            }
        };
        self.publish(BalanceQuery {
            input_address,
            token,
            status,
        });
        outcome
    }

    async fn fetch(&self, address: &str, symbol: &str, token: u64) -> Result<BalanceReading> {
        let provider = self.provider.clone().ok_or(WalletError::NoProvider)?;
        let address = validate_address(address)?;

        self.publish(BalanceQuery {
            input_address: address.clone(),
            token,
            status: QueryStatus::Pending,
        });

        let raw = provider.get_balance(&address, LATEST_BLOCK).await?;
        let wei = parse_quantity(&raw)?;
        Ok(BalanceReading {
            address,
            raw: wei.to_string(),
            formatted: format_ether(wei),
            symbol: symbol.to_string(),
            checked_at: Utc::now(),
        })
    }

    /// Publish `query` unless a newer token has been issued. Returns whether
    /// the query was applied.
    fn publish(&self, query: BalanceQuery) -> bool {
        // Check and write under the channel lock so a newer query that
        // publishes concurrently cannot be overwritten
        self.latest.send_if_modified(|current| {
            let issued = self.issued.load(Ordering::SeqCst);
            if query.token != issued {
                log::debug!(
                    "Discarding stale balance response (token {} < {})",
                    query.token,
                    issued
                );
                return false;
            }
            *current = query;
            true
        })
    }
}
