//! Injected Wallet Integration via wasm-bindgen
//!
//! This module provides JavaScript interop for the EIP-1193 provider injected at
//! `window.ethereum` (MetaMask, Trust Wallet, Binance Wallet and compatibles),
//! and implements the `lib-evm` wallet traits on top of it.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use async_channel::Sender;
use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use lib_core::error::UNRECOGNIZED_CHAIN_CODE;
use lib_core::{Result, WalletError};
use lib_evm::{ChainProvider, Signer, TransactionRequest, TxReceipt, WalletEvent, WalletProvider};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ============================================================================
// EIP-1193 PROVIDER (JavaScript Interop)
// ============================================================================

#[wasm_bindgen(inline_js = "
export function hasEthereum() {
    return typeof window !== 'undefined' && !!window.ethereum;
}

export async function ethRequest(method, params) {
    if (!window.ethereum) {
        throw { code: null, message: 'No injected wallet found' };
    }
    try {
        const args = params == null ? { method: method } : { method: method, params: params };
        return await window.ethereum.request(args);
    } catch (error) {
        // Normalize to { code, message } so Rust can branch on the EIP-1193 code
        const code = error && typeof error.code === 'number' ? error.code : null;
        const message = error && error.message ? error.message : String(error);
        throw { code: code, message: message };
    }
}

export function onEthereumEvent(name, callback) {
    if (window.ethereum && typeof window.ethereum.on === 'function') {
        window.ethereum.on(name, callback);
        return true;
    }
    return false;
}
")]
extern "C" {
    /// Check if an injected provider is present
    fn hasEthereum() -> bool;

    /// Send one JSON-RPC request through the injected provider
    #[wasm_bindgen(catch)]
    async fn ethRequest(method: &str, params: JsValue) -> std::result::Result<JsValue, JsValue>;

    /// Register a provider event listener
    fn onEthereumEvent(name: &str, callback: &Closure<dyn FnMut(JsValue)>) -> bool;
}

/// Params of methods that take none; providers reject a `null` params value.
const NO_PARAMS: [(); 0] = [];

/// Normalized provider error thrown by `ethRequest`.
#[derive(Debug, Deserialize)]
struct ProviderError {
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

fn provider_error(err: JsValue) -> ProviderError {
    serde_wasm_bindgen::from_value(err.clone()).unwrap_or_else(|_| ProviderError {
        code: None,
        message: err.as_string().unwrap_or_else(|| format!("{:?}", err)),
    })
}

async fn request_raw<P: Serialize + ?Sized>(method: &str, params: &P) -> std::result::Result<JsValue, ProviderError> {
    let params = params
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ProviderError {
            code: None,
            message: format!("failed to encode {} params: {}", method, e),
        })?;
    ethRequest(method, params).await.map_err(provider_error)
}

async fn request<P, R>(method: &str, params: &P) -> Result<R>
where
    P: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let value = request_raw(method, params).await.map_err(|e| {
        log::warn!("{} failed: {} (code {:?})", method, e.message, e.code);
        WalletError::from_rpc(e.code, e.message)
    })?;
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| WalletError::Provider(format!("unexpected {} response: {}", method, e)))
}

// ============================================================================
// WALLET EVENTS
// ============================================================================

/// Forward `accountsChanged` and `chainChanged` into `events`.
///
/// Returns `false` when the provider does not support event listeners. The
/// listeners stay registered for the lifetime of the page.
pub fn subscribe_events(events: Sender<WalletEvent>) -> bool {
    let accounts_tx = events.clone();
    let on_accounts = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        match serde_wasm_bindgen::from_value::<Vec<Address>>(value) {
            Ok(accounts) => forward(&accounts_tx, WalletEvent::AccountsChanged(accounts)),
            Err(e) => log::warn!("ignoring malformed accountsChanged payload: {}", e),
        }
    });

    let on_chain = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        match serde_wasm_bindgen::from_value::<U64>(value) {
            Ok(chain_id) => forward(&events, WalletEvent::ChainChanged(chain_id.to::<u64>())),
            Err(e) => log::warn!("ignoring malformed chainChanged payload: {}", e),
        }
    });

    let subscribed = onEthereumEvent("accountsChanged", &on_accounts) && onEthereumEvent("chainChanged", &on_chain);
    on_accounts.forget();
    on_chain.forget();
    subscribed
}

fn forward(events: &Sender<WalletEvent>, event: WalletEvent) {
    if events.try_send(event).is_err() {
        log::debug!("wallet event dropped, session loop has stopped");
    }
}

// ============================================================================
// WALLET SERVICE
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockHeader {
    gas_limit: U64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    block_number: U64,
    /// `0x1` on success, `0x0` on revert.
    status: Option<U64>,
}

impl From<RpcReceipt> for TxReceipt {
    fn from(receipt: RpcReceipt) -> Self {
        TxReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.to::<u64>(),
            success: receipt.status.map_or(true, |status| status == U64::from(1u8)),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CallRequest {
    to: Address,
    data: Bytes,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParams {
    chain_id: U64,
}

/// The provider injected at `window.ethereum`.
pub struct InjectedWallet {
    poll_interval_ms: u32,
}

impl InjectedWallet {
    pub fn new(poll_interval_ms: u64) -> Self {
        Self {
            poll_interval_ms: u32::try_from(poll_interval_ms).unwrap_or(u32::MAX),
        }
    }
}

#[async_trait(?Send)]
impl ChainProvider for InjectedWallet {
    async fn get_balance(&self, address: Address) -> Result<U256> {
        request("eth_getBalance", &(address, "latest")).await
    }

    async fn latest_gas_limit(&self) -> Result<u64> {
        let block: Option<BlockHeader> = request("eth_getBlockByNumber", &("latest", false)).await?;
        block
            .map(|block| block.gas_limit.to::<u64>())
            .ok_or_else(|| WalletError::Provider("latest block unavailable".to_string()))
    }

    async fn gas_price(&self) -> Result<u128> {
        let price: U256 = request("eth_gasPrice", &NO_PARAMS).await?;
        u128::try_from(price).map_err(|_| WalletError::Provider(format!("gas price out of range: {}", price)))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        request("eth_call", &(CallRequest { to, data }, "latest")).await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash, timeout: Duration) -> Result<TxReceipt> {
        let deadline = js_sys::Date::now() + timeout.as_millis() as f64;
        loop {
            let receipt: Option<RpcReceipt> = request("eth_getTransactionReceipt", &[tx_hash]).await?;
            if let Some(receipt) = receipt {
                return Ok(receipt.into());
            }
            if js_sys::Date::now() >= deadline {
                return Err(WalletError::InclusionTimeout {
                    tx_hash,
                    secs: timeout.as_secs(),
                });
            }
            TimeoutFuture::new(self.poll_interval_ms).await;
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedWallet {
    type Signer = InjectedSigner;

    fn is_available(&self) -> bool {
        hasEthereum()
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        request("eth_requestAccounts", &NO_PARAMS).await
    }

    async fn chain_id(&self) -> Result<u64> {
        let chain_id: U64 = request("eth_chainId", &NO_PARAMS).await?;
        Ok(chain_id.to::<u64>())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        let params = [SwitchChainParams {
            chain_id: U64::from(chain_id),
        }];
        match request_raw("wallet_switchEthereumChain", &params).await {
            Ok(_) => Ok(()),
            // The wallet has never been configured for this chain
            Err(e) if e.code == Some(UNRECOGNIZED_CHAIN_CODE) => Err(WalletError::UnsupportedChain { chain_id }),
            Err(e) => Err(WalletError::from_rpc(e.code, e.message)),
        }
    }

    async fn signer(&self, account: Address) -> Result<InjectedSigner> {
        Ok(InjectedSigner { address: account })
    }
}

/// Signs through the injected provider with `from` set to one account.
pub struct InjectedSigner {
    address: Address,
}

#[async_trait(?Send)]
impl Signer for InjectedSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        request("eth_sendTransaction", &[tx]).await
    }
}
