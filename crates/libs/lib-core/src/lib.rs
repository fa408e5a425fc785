//! # Core Library
//!
//! Configuration and the error taxonomy shared by the wallet libraries and the widget.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{Config, SupportedChains, TokenConfig};
pub use error::{ErrorKind, Result, ValidationError, WalletError};
