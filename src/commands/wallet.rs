use crate::error::Result;
use crate::services::balance::BalanceReading;
use crate::services::connection::ConnectionState;
use crate::state::AppState;
use crate::view::ViewModel;
use tauri::State;

#[tauri::command]
pub async fn connect_wallet(state: State<'_, AppState>) -> Result<ConnectionState> {
    state.connection.connect().await
}

#[tauri::command]
pub async fn disconnect_wallet(state: State<'_, AppState>) -> Result<ConnectionState> {
    state.connection.disconnect();
    Ok(state.connection.snapshot())
}

#[tauri::command]
pub async fn get_wallet_view(state: State<'_, AppState>) -> Result<ViewModel> {
    Ok(state.view().await)
}

#[tauri::command]
pub async fn set_address_input(state: State<'_, AppState>, address: String) -> Result<()> {
    state.set_address_input(address).await;
    Ok(())
}

/// Check the balance of the address currently in the input field
#[tauri::command]
pub async fn check_balance(state: State<'_, AppState>) -> Result<BalanceReading> {
    state.check_input_balance().await
}
