//! # Wallet Library Tests
//!
//! Test suite for the session manager and transfer initiator, run against a
//! scripted in-memory wallet.

mod session;

use std::cell::{RefCell, RefMut};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use alloy_primitives::{address, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use lib_core::{Config, Result, WalletError};

use crate::provider::{ChainProvider, Signer, TransactionRequest, TxReceipt, WalletProvider};

pub const ALICE: Address = address!("0x1111111111111111111111111111111111111111");
pub const BOB: Address = address!("0x2222222222222222222222222222222222222222");
pub const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// `n` whole units of an 18-decimal currency.
pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u8))
}

/// Create test config
pub fn test_config() -> Config {
    Config {
        inclusion_timeout_secs: 30,
        ..Config::default()
    }
}

/// How the next receipt lookup resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Success,
    Revert,
    Timeout,
}

/// Everything the mock wallet knows and everything it was asked to do.
pub struct MockState {
    pub available: bool,
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub reject_accounts: bool,
    /// Whether `wallet_switchEthereumChain` moves the active chain.
    pub switch_succeeds: bool,
    pub reject_sends: bool,
    pub native_balances: HashMap<Address, U256>,
    pub token_balances: HashMap<Address, U256>,
    /// Native balances returned ahead of `native_balances`, one per call.
    pub scripted_balances: VecDeque<U256>,
    /// Number of scheduler yields inside each `get_balance` call, one per call.
    pub balance_yields: VecDeque<usize>,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub gas_price_fails: bool,
    pub receipts: VecDeque<ReceiptOutcome>,
    pub yield_on_receipt: bool,
    pub block_number: u64,
    /// RPC method names in call order.
    pub calls: Vec<&'static str>,
    /// `(signer, tx)` for every transaction sent.
    pub sent: Vec<(Address, TransactionRequest)>,
    pub signers_requested: Vec<Address>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            available: true,
            accounts: vec![ALICE],
            chain_id: 56,
            reject_accounts: false,
            switch_succeeds: true,
            reject_sends: false,
            native_balances: HashMap::from([(ALICE, ether(2)), (BOB, ether(7))]),
            token_balances: HashMap::from([(ALICE, ether(1_000)), (BOB, U256::ZERO)]),
            scripted_balances: VecDeque::new(),
            balance_yields: VecDeque::new(),
            gas_limit: 30_000_000,
            gas_price: 3_000_000_000,
            gas_price_fails: false,
            receipts: VecDeque::new(),
            yield_on_receipt: false,
            block_number: 100,
            calls: Vec::new(),
            sent: Vec::new(),
            signers_requested: Vec::new(),
        }
    }
}

impl MockState {
    pub fn calls_of(&self, method: &str) -> usize {
        self.calls.iter().filter(|m| **m == method).count()
    }
}

#[derive(Clone, Default)]
pub struct MockWallet {
    state: Rc<RefCell<MockState>>,
}

impl MockWallet {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn with_state(state: MockState) -> Rc<Self> {
        Rc::new(Self {
            state: Rc::new(RefCell::new(state)),
        })
    }

    pub fn state(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    fn record(&self, method: &'static str) {
        self.state().calls.push(method);
    }
}

#[async_trait(?Send)]
impl ChainProvider for MockWallet {
    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.record("eth_getBalance");
        let (balance, yields) = {
            let mut state = self.state();
            let balance = match state.scripted_balances.pop_front() {
                Some(balance) => balance,
                None => state.native_balances.get(&address).copied().unwrap_or_default(),
            };
            (balance, state.balance_yields.pop_front().unwrap_or(0))
        };
        for _ in 0..yields {
            tokio::task::yield_now().await;
        }
        Ok(balance)
    }

    async fn latest_gas_limit(&self) -> Result<u64> {
        self.record("eth_getBlockByNumber");
        Ok(self.state().gas_limit)
    }

    async fn gas_price(&self) -> Result<u128> {
        self.record("eth_gasPrice");
        let state = self.state();
        if state.gas_price_fails {
            return Err(WalletError::Provider("gas price unavailable".to_string()));
        }
        Ok(state.gas_price)
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes> {
        self.record("eth_call");
        // balanceOf(address): the owner is the last 20 bytes of the first argument
        let owner = Address::from_slice(&data[16..36]);
        let balance = self.state().token_balances.get(&owner).copied().unwrap_or_default();
        Ok(Bytes::from(balance.to_be_bytes::<32>().to_vec()))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash, timeout: Duration) -> Result<TxReceipt> {
        self.record("eth_getTransactionReceipt");
        if self.state().yield_on_receipt {
            tokio::task::yield_now().await;
        }
        let mut state = self.state();
        let outcome = state.receipts.pop_front().unwrap_or(ReceiptOutcome::Success);
        state.block_number += 1;
        match outcome {
            ReceiptOutcome::Timeout => Err(WalletError::InclusionTimeout {
                tx_hash,
                secs: timeout.as_secs(),
            }),
            outcome => Ok(TxReceipt {
                transaction_hash: tx_hash,
                block_number: state.block_number,
                success: outcome == ReceiptOutcome::Success,
            }),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    type Signer = MockSigner;

    fn is_available(&self) -> bool {
        self.state().available
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.record("eth_requestAccounts");
        let state = self.state();
        if state.reject_accounts {
            return Err(WalletError::from_rpc(Some(4001), "User rejected the request."));
        }
        Ok(state.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64> {
        self.record("eth_chainId");
        Ok(self.state().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        self.record("wallet_switchEthereumChain");
        let mut state = self.state();
        if state.switch_succeeds {
            state.chain_id = chain_id;
        }
        Ok(())
    }

    async fn signer(&self, account: Address) -> Result<MockSigner> {
        self.state().signers_requested.push(account);
        Ok(MockSigner {
            address: account,
            state: Rc::clone(&self.state),
        })
    }
}

pub struct MockSigner {
    address: Address,
    state: Rc<RefCell<MockState>>,
}

#[async_trait(?Send)]
impl Signer for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let mut state = self.state.borrow_mut();
        state.calls.push("eth_sendTransaction");
        if state.reject_sends {
            return Err(WalletError::from_rpc(Some(4001), "User denied transaction signature."));
        }
        state.sent.push((self.address, tx));
        Ok(TxHash::with_last_byte(state.sent.len() as u8))
    }
}
