//! # EVM Wallet Library
//!
//! Session management and transfer initiation against an injected EIP-1193
//! wallet, independent of the browser.
//!
//! ## Modules
//!
//! - [`provider`] - traits for the wallet and the chain behind it
//! - [`session`] - connect handshake, wallet events and balance refresh
//! - [`transfer`] - validation, confirmation and submission of transfers
//! - [`token`] - token contract calldata
//! - [`units`] - amount parsing and display formatting

pub mod provider;
pub mod session;
pub mod token;
pub mod transfer;
pub mod units;

#[cfg(test)]
mod tests;

pub use provider::{ChainProvider, Signer, TransactionRequest, TxReceipt, WalletEvent, WalletProvider};
pub use session::{event_channel, Balances, ConnectOutcome, Session, SessionChange, SessionManager};
pub use transfer::{PreparedTransfer, TransferInitiator, TransferPhase, TransferReceipt};
