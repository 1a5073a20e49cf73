// Tauri command handlers

pub mod system;
pub mod wallet;

// Re-export all commands for registration
pub use system::*;
pub use wallet::*;
