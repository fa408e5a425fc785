//! # Centralized Error Handling
//!
//! This module defines the error type [`WalletError`] returned by every wallet,
//! session and transfer operation. It follows the `thiserror` pattern for ergonomic
//! error handling.
//!
//! ## Error Categories
//!
//! Errors are grouped by what the user can do about them (see [`ErrorKind`]):
//!
//! 1. **Input Errors** - the user corrects the form
//!    - [`Validation`](WalletError::Validation)
//!
//! 2. **Wallet Errors** - the injected wallet refused or is missing
//!    - [`NoWallet`](WalletError::NoWallet)
//!    - [`Rejected`](WalletError::Rejected) → user declined a prompt (EIP-1193 code 4001)
//!    - [`UnsupportedChain`](WalletError::UnsupportedChain) → a chain switch is needed
//!    - [`NotConnected`](WalletError::NotConnected)
//!
//! 3. **Chain Errors** - the RPC node or the transaction itself failed
//!    - [`Provider`](WalletError::Provider)
//!    - [`Reverted`](WalletError::Reverted)
//!    - [`InclusionTimeout`](WalletError::InclusionTimeout)
//!
//! 4. **Programming Errors**
//!    - [`InvalidState`](WalletError::InvalidState) / [`Config`](WalletError::Config)
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{Result, ValidationError, WalletError};
//!
//! fn require_recipient(recipient: &str) -> Result<&str> {
//!     if recipient.is_empty() {
//!         return Err(ValidationError::MissingRecipient.into());
//!     }
//!     Ok(recipient)
//! }
//!
//! let err = require_recipient("").unwrap_err();
//! assert_eq!(err.user_message(), "Please input Receiver Address");
//! ```

use alloy_primitives::TxHash;
use thiserror::Error;

/// Convenience type alias for `Result<T, WalletError>`.
pub type Result<T> = std::result::Result<T, WalletError>;

/// EIP-1193 provider error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 / EIP-3326 error code for "unrecognized chain id".
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Form validation failures. The `Display` text is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please input Receiver Address")]
    MissingRecipient,

    #[error("Please input send amount")]
    MissingAmount,

    #[error("Invalid Receiver Address")]
    InvalidRecipient,

    #[error("Invalid send amount")]
    InvalidAmount,
}

/// Error type covering every wallet, session and transfer failure.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The transfer form is incomplete or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No injected wallet (`window.ethereum`) is present.
    #[error("No injected wallet found")]
    NoWallet,

    /// The user declined a wallet prompt.
    #[error("Request rejected by wallet: {0}")]
    Rejected(String),

    /// The wallet is on a chain outside the supported set.
    #[error("Unsupported chain: {chain_id}")]
    UnsupportedChain { chain_id: u64 },

    /// The operation needs a connected session.
    #[error("Wallet is not connected")]
    NotConnected,

    /// RPC, network or wallet transport failure.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The transaction was included but reverted on-chain.
    #[error("Transaction reverted: {tx_hash}")]
    Reverted { tx_hash: TxHash },

    /// The transaction was not included within the configured timeout.
    #[error("Transaction {tx_hash} not included after {secs}s")]
    InclusionTimeout { tx_hash: TxHash, secs: u64 },

    /// An operation was called from a state that does not allow it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure category, for callers that branch on the kind of error rather than
/// its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    WalletRejection,
    UnsupportedChain,
    Session,
    Provider,
    TransactionRevert,
    Internal,
}

impl WalletError {
    /// Map a raw EIP-1193 `{ code, message }` error to a variant.
    pub fn from_rpc(code: Option<i64>, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            Some(USER_REJECTED_CODE) => WalletError::Rejected(message),
            _ => WalletError::Provider(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Validation(_) => ErrorKind::Validation,
            WalletError::Rejected(_) => ErrorKind::WalletRejection,
            WalletError::UnsupportedChain { .. } => ErrorKind::UnsupportedChain,
            WalletError::NoWallet | WalletError::NotConnected => ErrorKind::Session,
            WalletError::Provider(_) | WalletError::InclusionTimeout { .. } => ErrorKind::Provider,
            WalletError::Reverted { .. } => ErrorKind::TransactionRevert,
            WalletError::InvalidState(_) | WalletError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Whether the user can retry (or correct input) and expect a different outcome.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, WalletError::Config(_))
    }

    /// Get a user-friendly error message for the widget.
    ///
    /// Provider details are not echoed back; they are in the logs.
    pub fn user_message(&self) -> String {
        match self {
            WalletError::Validation(e) => e.to_string(),
            WalletError::NoWallet => "Please install MetaMask or another injected wallet".to_string(),
            WalletError::Rejected(_) => "Request was rejected in your wallet".to_string(),
            WalletError::UnsupportedChain { chain_id } => {
                format!("Chain {} is not supported, please switch network", chain_id)
            }
            WalletError::NotConnected => "Please connect your wallet first".to_string(),
            WalletError::Provider(_) => "Network request failed, please try again".to_string(),
            WalletError::Reverted { .. } => "Transaction failed on-chain".to_string(),
            WalletError::InclusionTimeout { .. } => {
                "Transaction is taking too long to confirm".to_string()
            }
            WalletError::InvalidState(_) | WalletError::Config(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<alloy_primitives::utils::UnitsError> for WalletError {
    fn from(_: alloy_primitives::utils::UnitsError) -> Self {
        WalletError::Validation(ValidationError::InvalidAmount)
    }
}

impl From<alloy_sol_types::Error> for WalletError {
    fn from(err: alloy_sol_types::Error) -> Self {
        WalletError::Provider(format!("ABI decoding error: {}", err))
    }
}

/// Convert `serde_json::Error` to `WalletError`.
impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Provider(format!("JSON error: {}", err))
    }
}
