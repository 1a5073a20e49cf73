use serde::{Serialize, Serializer};
use thiserror::Error;

/// Failure categories surfaced to the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NoProvider,
    AuthorizationDenied,
    RpcFailure,
    InvalidAddress,
    Config,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WalletError {
    #[error("No wallet provider available")]
    NoProvider,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("RPC request failed: {message}")]
    RpcFailure { code: Option<i64>, message: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// EIP-1193: the user rejected the request
pub const USER_REJECTED_REQUEST: i64 = 4001;
/// EIP-1193: the requested method or account has not been authorized
pub const UNAUTHORIZED: i64 = 4100;

impl WalletError {
    /// Classify a provider error object by its EIP-1193 code
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED_REQUEST | UNAUTHORIZED => WalletError::AuthorizationDenied(message),
            _ => WalletError::RpcFailure {
                code: Some(code),
                message,
            },
        }
    }

    pub fn rpc(message: impl Into<String>) -> Self {
        WalletError::RpcFailure {
            code: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::NoProvider => ErrorKind::NoProvider,
            WalletError::AuthorizationDenied(_) => ErrorKind::AuthorizationDenied,
            WalletError::RpcFailure { .. } | WalletError::InvalidResponse(_) => {
                ErrorKind::RpcFailure
            }
            WalletError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            WalletError::ConfigError(_) | WalletError::IoError(_) => ErrorKind::Config,
        }
    }
}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::IoError(e.to_string())
    }
}

impl From<config::ConfigError> for WalletError {
    fn from(e: config::ConfigError) -> Self {
        WalletError::ConfigError(e.to_string())
    }
}

// Command results cross the IPC boundary as plain strings
impl Serialize for WalletError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
