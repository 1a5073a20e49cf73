// Service layer - wallet connection, balance lookups and settings

pub mod account_watch;
pub mod balance;
pub mod config;
pub mod connection;

pub use balance::BalanceService;
pub use config::ConfigService;
pub use connection::WalletConnection;
