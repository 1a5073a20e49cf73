use crate::chain::NetworkRegistry;
use crate::services::balance::BalanceService;
use crate::services::connection::ConnectionState;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Keep `balance` showing the connected account's balance.
///
/// Re-queries whenever the account or chain changes and clears the result
/// when the account goes away. Returns once the connection is dropped.
pub async fn follow_account_balance(
    mut connection: watch::Receiver<ConnectionState>,
    balance: Arc<BalanceService>,
    networks: Arc<RwLock<NetworkRegistry>>,
) {
    let mut followed: Option<(String, Option<u64>)> = None;

    loop {
        let current = {
            let state = connection.borrow_and_update();
            state.account.clone().map(|account| (account, state.chain_id))
        };

        if current != followed {
            match &current {
                Some((account, chain_id)) => {
                    let symbol = networks.read().await.symbol(*chain_id).to_string();
                    if let Err(e) = balance.check_balance(account, &symbol).await {
                        log::warn!("Could not refresh balance of {}: {}", account, e);
                    }
                }
                None => balance.clear(),
            }
            followed = current;
        }

        if connection.changed().await.is_err() {
            log::debug!("Connection closed, account balance follower exiting");
            break;
        }
    }
}
