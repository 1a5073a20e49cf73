//! Presentation of the wallet state for the front end.

use crate::chain::NetworkRegistry;
use crate::error::{ErrorKind, WalletError};
use crate::services::balance::{BalanceQuery, QueryStatus};
use crate::services::connection::{ConnectionState, ConnectionStatus};
use serde::Serialize;
use std::fmt;

pub const TITLE: &str = "Wallet Connection";
const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&WalletError> for ErrorNotice {
    fn from(e: &WalletError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub title: String,
    pub account_label: String,
    pub network_label: String,
    pub address_input: String,
    pub balance_label: String,
    pub account_balance_label: String,
    pub error: Option<ErrorNotice>,
}

impl ViewModel {
    pub fn render(
        connection: &ConnectionState,
        address_input: &str,
        lookup: &BalanceQuery,
        account_balance: &BalanceQuery,
        networks: &NetworkRegistry,
    ) -> Self {
        let account_label = match (&connection.status, &connection.account) {
            (ConnectionStatus::Connecting, _) => "Connecting...".to_string(),
            (_, Some(account)) => account.clone(),
            (_, None) => "Not connected".to_string(),
        };

        let network_label = connection
            .chain_id
            .map(|id| networks.label(id))
            .unwrap_or_else(|| PLACEHOLDER.to_string());

        // Connection problems take precedence over a failed lookup
        let error = connection
            .error()
            .or_else(|| query_error(lookup))
            .map(ErrorNotice::from);

        Self {
            title: TITLE.to_string(),
            account_label,
            network_label,
            address_input: address_input.to_string(),
            balance_label: balance_label(lookup),
            account_balance_label: balance_label(account_balance),
            error,
        }
    }
}

fn query_error(query: &BalanceQuery) -> Option<&WalletError> {
    match &query.status {
        QueryStatus::Failed(e) => Some(e),
        _ => None,
    }
}

fn balance_label(query: &BalanceQuery) -> String {
    match &query.status {
        QueryStatus::Idle => PLACEHOLDER.to_string(),
        QueryStatus::Pending => "Loading...".to_string(),
        QueryStatus::Ready(reading) => reading.display(),
        QueryStatus::Failed(_) => "Unavailable".to_string(),
    }
}

impl fmt::Display for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "Connected Account: {}", self.account_label)?;
        writeln!(f, "Account Balance: {}", self.account_balance_label)?;
        writeln!(f, "Network: {}", self.network_label)?;
        writeln!(f, "Address: {}", self.address_input)?;
        write!(f, "Balance: {}", self.balance_label)?;
        if let Some(error) = &self.error {
            write!(f, "\nError: {}", error.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::balance::BalanceReading;
    use chrono::Utc;

    fn connected(account: &str, chain_id: u64) -> ConnectionState {
        ConnectionState {
            account: Some(account.to_string()),
            chain_id: Some(chain_id),
            status: ConnectionStatus::Connected,
        }
    }

    fn ready(formatted: &str) -> BalanceQuery {
        BalanceQuery {
            input_address: "0xabc".to_string(),
            token: 1,
            status: QueryStatus::Ready(BalanceReading {
                address: "0xabc".to_string(),
                raw: "0".to_string(),
                formatted: formatted.to_string(),
                symbol: "ETH".to_string(),
                checked_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_initial_placeholders() {
        let view = ViewModel::render(
            &ConnectionState::default(),
            "",
            &BalanceQuery::default(),
            &BalanceQuery::default(),
            &NetworkRegistry::new(),
        );
        assert_eq!(view.title, "Wallet Connection");
        assert_eq!(view.account_label, "Not connected");
        assert_eq!(view.network_label, "-");
        assert_eq!(view.balance_label, "-");
        assert!(view.error.is_none());
    }

    #[test]
    fn test_connected_view() {
        let view = ViewModel::render(
            &connected("0xABC", 1),
            "0xabc",
            &ready("1.5"),
            &BalanceQuery {
                status: QueryStatus::Pending,
                ..Default::default()
            },
            &NetworkRegistry::new(),
        );
        assert_eq!(view.account_label, "0xABC");
        assert_eq!(view.network_label, "Ethereum Mainnet");
        assert_eq!(view.balance_label, "1.5 ETH");
        assert_eq!(view.account_balance_label, "Loading...");

        let text = view.to_string();
        assert!(text.contains("Connected Account: 0xABC"));
        assert!(text.contains("Balance: 1.5 ETH"));
    }

    #[test]
    fn test_errors_are_surfaced() {
        let failed_connection = ConnectionState {
            status: ConnectionStatus::Failed(WalletError::NoProvider),
            ..Default::default()
        };
        let failed_lookup = BalanceQuery {
            status: QueryStatus::Failed(WalletError::InvalidAddress("nope".to_string())),
            ..Default::default()
        };
        let networks = NetworkRegistry::new();

        let view = ViewModel::render(
            &failed_connection,
            "nope",
            &failed_lookup,
            &BalanceQuery::default(),
            &networks,
        );
        let error = view.error.unwrap();
        assert_eq!(error.kind, ErrorKind::NoProvider);
        assert_eq!(view.balance_label, "Unavailable");

        let view = ViewModel::render(
            &connected("0xABC", 1),
            "nope",
            &failed_lookup,
            &BalanceQuery::default(),
            &networks,
        );
        assert_eq!(view.error.unwrap().kind, ErrorKind::InvalidAddress);
    }

    #[test]
    fn test_serializes_camel_case() {
        let view = ViewModel::render(
            &connected("0xABC", 137),
            "",
            &BalanceQuery::default(),
            &BalanceQuery::default(),
            &NetworkRegistry::new(),
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["accountLabel"], "0xABC");
        assert_eq!(json["networkLabel"], "Polygon");
        assert!(json["error"].is_null());
    }
}
