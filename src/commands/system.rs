use crate::error::Result;
use crate::services::config::WalletConfig;
use crate::state::AppState;
use tauri::State;

#[tauri::command]
pub async fn get_config(state: State<'_, AppState>) -> Result<WalletConfig> {
    let config = state.config.read().await;
    Ok(config.get())
}

#[tauri::command]
pub async fn save_config(state: State<'_, AppState>, config: WalletConfig) -> Result<()> {
    let provider_changed = {
        let mut service = state.config.write().await;
        let changed = service.get().provider != config.provider;
        service.update(config.clone())?;
        changed
    };
    state.reload_networks(&config).await;

    if provider_changed {
        log::info!("Provider settings changed, they take effect on next launch");
    }
    Ok(())
}

#[tauri::command]
pub async fn reset_config(state: State<'_, AppState>) -> Result<WalletConfig> {
    let mut service = state.config.write().await;
    service.reset()?;
    let config = service.get();
    drop(service);

    state.reload_networks(&config).await;
    Ok(config)
}

#[tauri::command]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
