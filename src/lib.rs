pub mod address;
pub mod chain;
#[cfg(feature = "desktop")]
mod commands;
pub mod error;
pub mod provider;
pub mod services;
pub mod state;
pub mod units;
pub mod view;

/// Initialize `env_logger` for headless use. Safe to call more than once.
pub fn init_logging(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
mod desktop {
    use crate::commands;
    use crate::services::account_watch::follow_account_balance;
    use crate::state::AppState;
    use std::time::Duration;
    use tauri::{Emitter, Manager};

    pub const STATE_CHANGED_EVENT: &str = "wallet-state-changed";

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        // Create shared app state
        let app_state = AppState::new();
        let app_config = app_state.config.blocking_read().get();
        let connection = app_state.connection.clone();
        let lookup = app_state.lookup.clone();
        let account_balance = app_state.account_balance.clone();
        let networks = app_state.networks.clone();
        let http_provider = app_state.http_provider.clone();

        let builder = tauri::Builder::default().plugin(
            tauri_plugin_log::Builder::default()
                .level(app_config.log_level_filter())
                .level_for("reqwest", log::LevelFilter::Warn)
                .level_for("hyper_util", log::LevelFilter::Warn)
                .build(),
        );

        let app = builder
            .manage(app_state)
            .invoke_handler(tauri::generate_handler![
                // Wallet commands
                commands::connect_wallet,
                commands::disconnect_wallet,
                commands::get_wallet_view,
                commands::set_address_input,
                commands::check_balance,
                // System commands
                commands::get_config,
                commands::save_config,
                commands::reset_config,
                commands::get_app_version,
            ])
            .setup(move |app| {
                log::info!("Wallet Connect v{} starting...", env!("CARGO_PKG_VERSION"));

                // Poll the JSON-RPC endpoint for account / chain changes
                if let Some(provider) = http_provider.as_ref() {
                    let interval =
                        Duration::from_secs(app_config.provider.poll_interval_secs.max(1));
                    // The watcher holds only a weak reference; AppState keeps it alive
                    tauri::async_runtime::spawn(provider.watch_changes(interval));
                    log::info!("Provider change watcher started ({:?} interval)", interval);
                }

                // Follow the connected account's balance
                let rx = connection.subscribe();
                let follower_balance = account_balance.clone();
                let follower_networks = networks.clone();
                tauri::async_runtime::spawn(async move {
                    follow_account_balance(rx, follower_balance, follower_networks).await;
                });

                // Push a fresh view to the front end on every state change
                let app_handle = app.handle().clone();
                let mut connection_rx = connection.subscribe();
                let mut lookup_rx = lookup.subscribe();
                let mut account_rx = account_balance.subscribe();
                tauri::async_runtime::spawn(async move {
                    loop {
                        let alive = tokio::select! {
                            changed = connection_rx.changed() => changed.is_ok(),
                            changed = lookup_rx.changed() => changed.is_ok(),
                            changed = account_rx.changed() => changed.is_ok(),
                        };
                        if !alive {
                            break;
                        }
                        let state = app_handle.state::<AppState>();
                        let view = state.view().await;
                        if let Err(e) = app_handle.emit(STATE_CHANGED_EVENT, &view) {
                            log::warn!("Failed to emit {}: {}", STATE_CHANGED_EVENT, e);
                        }
                    }
                });

                // Connect on launch, like mounting the wallet view
                if app_config.auto_connect {
                    let connection = connection.clone();
                    tauri::async_runtime::spawn(async move {
                        if let Err(e) = connection.connect().await {
                            log::error!("Auto-connect failed: {}", e);
                        }
                    });
                }

                Ok(())
            })
            .build(tauri::generate_context!())
            .expect("error building Wallet Connect");

        app.run(|app_handle, event| {
            if let tauri::RunEvent::Exit = event {
                log::info!("Application exiting, releasing provider listeners...");
                let state = app_handle.state::<AppState>();
                state.connection.disconnect();
            }
        });
    }
}
