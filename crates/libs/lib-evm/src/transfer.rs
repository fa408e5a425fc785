//! # Transfer Initiator
//!
//! Validates a transfer form, estimates fees for the confirmation prompt, and on
//! confirmation submits either a native value transfer or a token transfer
//! through the wallet, then waits for inclusion.
//!
//! ## State Machine
//!
//! ```text
//! Idle ─▶ Validating ─▶ AwaitingConfirmation ─▶ Submitting ─▶ PendingInclusion ─▶ Complete
//!           │                 ▲    │                 │                │
//!           └─ invalid ─▶ Idle│    └─ cancel ─▶ Idle │                │
//!                             └──────── failure ─────┴────────────────┘
//! ```
//!
//! The account and chain are captured by [`TransferInitiator::prepare`] and used
//! for the rest of the transfer, even if the wallet reports a different account
//! or chain before the user confirms.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, TxHash, U256};
use lib_core::{Config, Result, ValidationError, WalletError};
use shared::{CurrencyMode, FeeEstimate, TransferRequest};
use tracing::{debug, error, info, warn};

use crate::provider::{Signer, TransactionRequest, TxReceipt, WalletProvider};
use crate::session::Session;
use crate::{token, units};

/// Phase of the transfer in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferPhase {
    #[default]
    Idle,
    Validating,
    AwaitingConfirmation,
    Submitting,
    PendingInclusion,
    Complete,
}

impl TransferPhase {
    /// Whether the confirmation prompt is shown in this phase.
    pub fn prompt_open(&self) -> bool {
        matches!(
            self,
            TransferPhase::AwaitingConfirmation | TransferPhase::Submitting | TransferPhase::PendingInclusion
        )
    }

    pub fn in_flight(&self) -> bool {
        matches!(self, TransferPhase::Submitting | TransferPhase::PendingInclusion)
    }
}

/// A validated transfer waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransfer {
    pub request: TransferRequest,
    pub recipient: Address,
    /// Amount in the smallest unit of the selected currency.
    pub amount: U256,
    /// Account captured at preparation; its signer submits the transfer.
    pub account: Address,
    /// Chain captured at preparation; every transaction is bound to it.
    pub chain_id: u64,
    pub fee: FeeEstimate,
}

impl PreparedTransfer {
    pub fn mode(&self) -> CurrencyMode {
        self.request.mode
    }

    /// Confirmation prompt text.
    pub fn summary(&self, config: &Config) -> String {
        let symbol = match self.mode() {
            CurrencyMode::Native => config.native_symbol.as_str(),
            CurrencyMode::Token => config.token.symbol.as_str(),
        };
        format!(
            "Are you sure {} {} to {} user?",
            self.request.amount.trim(),
            symbol,
            self.request.recipient.trim()
        )
    }

    /// Gas price of the estimate in gwei.
    pub fn gas_price_gwei(&self) -> String {
        units::wei_to_gwei(U256::from(self.fee.gas_price)).unwrap_or_else(|_| "0".to_string())
    }
}

/// Report of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub mode: CurrencyMode,
    pub recipient: Address,
    pub amount: U256,
    /// Hash of the `approve` transaction that preceded a token transfer.
    pub approve_tx: Option<TxHash>,
}

/// Check a transfer form, returning the parsed recipient and amount.
///
/// Checks run in form order: recipient present, amount present and positive,
/// amount well formed, recipient well formed.
pub fn validate(request: &TransferRequest, config: &Config) -> std::result::Result<(Address, U256), ValidationError> {
    let recipient = request.recipient.trim();
    if recipient.is_empty() {
        return Err(ValidationError::MissingRecipient);
    }

    let decimals = match request.mode {
        CurrencyMode::Native => units::NATIVE_DECIMALS,
        CurrencyMode::Token => config.token.decimals,
    };
    let amount = units::parse_amount(&request.amount, decimals)?;

    let recipient = Address::from_str(recipient).map_err(|_| ValidationError::InvalidRecipient)?;
    Ok((recipient, amount))
}

pub struct TransferInitiator<W> {
    wallet: Rc<W>,
    config: Config,
    phase: Cell<TransferPhase>,
    pending: RefCell<Option<PreparedTransfer>>,
    observer: Option<Box<dyn Fn(TransferPhase)>>,
}

impl<W: WalletProvider> TransferInitiator<W> {
    pub fn new(wallet: Rc<W>, config: Config) -> Self {
        Self {
            wallet,
            config,
            phase: Cell::new(TransferPhase::Idle),
            pending: RefCell::new(None),
            observer: None,
        }
    }

    /// Call `observer` on every phase transition.
    pub fn with_observer(mut self, observer: impl Fn(TransferPhase) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase.get()
    }

    /// The transfer awaiting confirmation (or being submitted), if any.
    pub fn pending(&self) -> Option<PreparedTransfer> {
        self.pending.borrow().clone()
    }

    fn set_phase(&self, phase: TransferPhase) {
        self.phase.set(phase);
        debug!(?phase, "transfer phase");
        if let Some(observer) = &self.observer {
            observer(phase);
        }
    }

    /// Validate `request` against the current `session` and fetch the fee
    /// estimate for the confirmation prompt.
    ///
    /// Replaces any transfer already awaiting confirmation. Refused while a
    /// submission is in flight.
    pub async fn prepare(&self, request: TransferRequest, session: &Session) -> Result<PreparedTransfer> {
        if self.phase().in_flight() {
            return Err(WalletError::InvalidState(
                "a transfer is already being submitted".to_string(),
            ));
        }

        self.pending.borrow_mut().take();
        self.set_phase(TransferPhase::Validating);

        match self.validate_and_estimate(request, session).await {
            Ok(prepared) => {
                *self.pending.borrow_mut() = Some(prepared.clone());
                self.set_phase(TransferPhase::AwaitingConfirmation);
                Ok(prepared)
            }
            Err(e) => {
                warn!(error = %e, "transfer preparation failed");
                self.set_phase(TransferPhase::Idle);
                Err(e)
            }
        }
    }

    async fn validate_and_estimate(&self, request: TransferRequest, session: &Session) -> Result<PreparedTransfer> {
        let (recipient, amount) = validate(&request, &self.config)?;

        let account = session.account().ok_or(WalletError::NotConnected)?;
        let chain_id = session.chain_id();
        if !self.config.supported_chains.contains(chain_id) {
            return Err(WalletError::UnsupportedChain { chain_id });
        }

        let gas_limit = self.wallet.latest_gas_limit().await?;
        let gas_price = self.wallet.gas_price().await?;
        debug!(gas_limit, gas_price, "fee estimate");

        Ok(PreparedTransfer {
            request,
            recipient,
            amount,
            account,
            chain_id,
            fee: FeeEstimate { gas_limit, gas_price },
        })
    }

    /// Close the confirmation prompt without submitting.
    ///
    /// Returns `false` when there is nothing to cancel.
    pub fn cancel(&self) -> bool {
        if self.phase() != TransferPhase::AwaitingConfirmation {
            return false;
        }
        self.pending.borrow_mut().take();
        self.set_phase(TransferPhase::Idle);
        true
    }

    /// Submit the transfer awaiting confirmation and wait for its inclusion.
    ///
    /// On failure the transfer stays pending in `AwaitingConfirmation` so the
    /// user can retry.
    pub async fn confirm(&self) -> Result<TransferReceipt> {
        if self.phase() != TransferPhase::AwaitingConfirmation {
            return Err(WalletError::InvalidState(format!(
                "cannot confirm a transfer while {:?}",
                self.phase()
            )));
        }
        let prepared = self
            .pending()
            .ok_or_else(|| WalletError::InvalidState("no transfer awaiting confirmation".to_string()))?;

        self.set_phase(TransferPhase::Submitting);

        match self.submit(&prepared).await {
            Ok(receipt) => {
                self.pending.borrow_mut().take();
                self.set_phase(TransferPhase::Complete);
                info!(
                    tx_hash = %receipt.tx_hash,
                    block = receipt.block_number,
                    mode = ?receipt.mode,
                    "transfer complete"
                );
                Ok(receipt)
            }
            Err(e) => {
                error!(error = %e, mode = ?prepared.mode(), "transfer failed");
                self.set_phase(TransferPhase::AwaitingConfirmation);
                Err(e)
            }
        }
    }

    async fn submit(&self, prepared: &PreparedTransfer) -> Result<TransferReceipt> {
        let signer = self.wallet.signer(prepared.account).await?;
        let timeout = Duration::from_secs(self.config.inclusion_timeout_secs);

        let (tx_hash, approve_tx) = match prepared.mode() {
            CurrencyMode::Native => {
                let tx = TransactionRequest::native(
                    prepared.account,
                    prepared.recipient,
                    prepared.amount,
                    prepared.chain_id,
                );
                (signer.send_transaction(tx).await?, None)
            }
            CurrencyMode::Token => {
                let token_address = self.config.token.address;

                let approve = TransactionRequest::call(
                    prepared.account,
                    token_address,
                    token::approve_calldata(self.config.spender(), prepared.amount),
                    prepared.chain_id,
                );
                let approve_hash = signer.send_transaction(approve).await?;
                info!(tx_hash = %approve_hash, spender = %self.config.spender(), "approve submitted");
                self.await_inclusion(approve_hash, timeout).await?;

                let transfer = TransactionRequest::call(
                    prepared.account,
                    token_address,
                    token::transfer_calldata(prepared.recipient, prepared.amount),
                    prepared.chain_id,
                );
                (signer.send_transaction(transfer).await?, Some(approve_hash))
            }
        };

        info!(%tx_hash, "transaction submitted");
        self.set_phase(TransferPhase::PendingInclusion);
        let receipt = self.await_inclusion(tx_hash, timeout).await?;

        Ok(TransferReceipt {
            tx_hash,
            block_number: receipt.block_number,
            mode: prepared.mode(),
            recipient: prepared.recipient,
            amount: prepared.amount,
            approve_tx,
        })
    }

    async fn await_inclusion(&self, tx_hash: TxHash, timeout: Duration) -> Result<TxReceipt> {
        let receipt = self.wallet.wait_for_receipt(tx_hash, timeout).await?;
        if !receipt.success {
            return Err(WalletError::Reverted { tx_hash });
        }
        Ok(receipt)
    }
}
