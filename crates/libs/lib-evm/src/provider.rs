//! # Wallet and Chain Boundary
//!
//! Traits for the two external collaborators the widget consumes but does not
//! implement: the injected wallet (account access, chain switching, signing) and
//! the chain RPC node reached through it.
//!
//! The browser binding in `wallet-web` implements these over `window.ethereum`;
//! tests implement them with a scripted in-memory wallet.
//!
//! All traits are `?Send`: JavaScript promises are single-threaded, and every
//! operation runs on the page's event loop.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use async_trait::async_trait;
use lib_core::Result;
use serde::{Deserialize, Serialize};

/// Transaction handed to the wallet for signing and submission
/// (`eth_sendTransaction` parameters).
///
/// Nonce, gas and fee fields are left to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub value: U256,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub data: Bytes,
    /// Chain the transaction is bound to; wallets refuse it on any other chain.
    pub chain_id: U64,
}

fn is_zero(value: &U256) -> bool {
    value.is_zero()
}

fn is_empty(data: &Bytes) -> bool {
    data.is_empty()
}

impl TransactionRequest {
    /// Plain value transfer.
    pub fn native(from: Address, to: Address, value: U256, chain_id: u64) -> Self {
        Self {
            from,
            to,
            value,
            data: Bytes::new(),
            chain_id: U64::from(chain_id),
        }
    }

    /// Contract call carrying no value.
    pub fn call(from: Address, to: Address, data: Bytes, chain_id: u64) -> Self {
        Self {
            from,
            to,
            value: U256::ZERO,
            data,
            chain_id: U64::from(chain_id),
        }
    }
}

/// Inclusion result of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// `false` when the transaction reverted.
    pub success: bool,
}

/// Push notifications emitted by the injected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// `accountsChanged`: the new account list, primary first. Empty when the
    /// user locked the wallet or revoked access.
    AccountsChanged(Vec<Address>),
    /// `chainChanged`: the new active chain id.
    ChainChanged(u64),
}

/// Read access to the chain through the wallet's RPC connection.
#[async_trait(?Send)]
pub trait ChainProvider {
    /// Native balance in wei (`eth_getBalance`, latest block).
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Gas limit of the latest block (`eth_getBlockByNumber("latest")`).
    async fn latest_gas_limit(&self) -> Result<u64>;

    /// Current gas price in wei (`eth_gasPrice`).
    async fn gas_price(&self) -> Result<u128>;

    /// Read-only contract call (`eth_call`, latest block).
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Wait until `tx_hash` is included or `timeout` elapses.
    ///
    /// Implementations return [`lib_core::WalletError::InclusionTimeout`] when the
    /// deadline passes.
    async fn wait_for_receipt(&self, tx_hash: TxHash, timeout: Duration) -> Result<TxReceipt>;
}

/// Handle able to authorize transactions for one account.
#[async_trait(?Send)]
pub trait Signer {
    fn address(&self) -> Address;

    /// Ask the wallet to sign and broadcast `tx`; returns the transaction hash as
    /// soon as it is submitted.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;
}

/// The injected wallet.
#[async_trait(?Send)]
pub trait WalletProvider: ChainProvider {
    type Signer: Signer;

    /// Whether a wallet is injected into the page at all.
    fn is_available(&self) -> bool;

    /// Request account access (`eth_requestAccounts`), primary account first.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Active chain id (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64>;

    /// Ask the wallet to switch chains (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;

    /// Signer bound to `account`.
    async fn signer(&self, account: Address) -> Result<Self::Signer>;
}
