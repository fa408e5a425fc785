//! # Wallet Session Manager
//!
//! Owns the connection state (active account, active chain) and the handshake
//! with the injected wallet.
//!
//! ## Lifecycle
//!
//! ```text
//!            connect() on a supported chain
//! [empty] ─────────────────────────────────▶ [connected(account, chain)]
//!    ▲  │ connect() elsewhere:                   │   │ accountsChanged([b, ..]) → account b
//!    │  └─ switch requested, stays empty         │   │ chainChanged(c)          → chain c
//!    └───────────────────────────────────────────┘   │
//!          disconnect() / accountsChanged([])        ▼
//! ```
//!
//! Wallet notifications arrive as [`WalletEvent`] messages, either applied one by
//! one with [`SessionManager::apply`] or drained from a channel with
//! [`SessionManager::run`]. State lives in a `RefCell` that is never borrowed
//! across an `.await`, so events can be applied while a connect, refresh or
//! transfer on the same page is suspended.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use alloy_primitives::{Address, U256};
use async_channel::{Receiver, Sender};
use lib_core::{Config, Result, WalletError};
use shared::BalanceView;
use tracing::{debug, error, info, warn};

use crate::provider::{WalletEvent, WalletProvider};
use crate::{token, units};

/// Connection state. `account` is set iff the session is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    account: Option<Address>,
    chain_id: u64,
}

impl Session {
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// Active chain id, `0` until the wallet has reported one.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    fn establish(&mut self, account: Address, chain_id: u64) {
        self.account = Some(account);
        self.chain_id = chain_id;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of a [`SessionManager::connect`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(Session),
    /// The wallet was on an unsupported chain and a switch was requested. The
    /// session stays disconnected; call `connect()` again once the wallet has
    /// switched.
    SwitchRequested { from: u64, to: u64 },
}

/// What a wallet event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Unchanged,
    AccountChanged { account: Address },
    Disconnected,
    ChainChanged { chain_id: u64, supported: bool },
}

impl SessionChange {
    /// Whether balances and other account-dependent state must be reloaded.
    pub fn requires_reload(&self) -> bool {
        matches!(self, SessionChange::AccountChanged { .. } | SessionChange::ChainChanged { .. })
    }
}

/// Balances of the session account, as read by one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub account: Address,
    pub chain_id: u64,
    /// Native balance in wei.
    pub native: U256,
    /// Token balance in the token's smallest unit.
    pub token: U256,
    /// Gas price in wei.
    pub gas_price: u128,
}

impl Balances {
    pub fn view(&self, config: &Config) -> BalanceView {
        BalanceView {
            native: units::format_fixed(self.native, units::NATIVE_DECIMALS, config.display_decimals),
            token: units::format_fixed(self.token, config.token.decimals, config.display_decimals),
            gas_price_gwei: units::wei_to_gwei(U256::from(self.gas_price)).unwrap_or_else(|_| "0".to_string()),
        }
    }
}

/// Create the channel wallet notifications are delivered through.
pub fn event_channel() -> (Sender<WalletEvent>, Receiver<WalletEvent>) {
    async_channel::unbounded()
}

/// Single owner of the [`Session`].
pub struct SessionManager<W> {
    wallet: Rc<W>,
    config: Config,
    session: RefCell<Session>,
    balances: RefCell<Option<Balances>>,
    /// Ticket of the most recently started refresh.
    refresh_started: Cell<u64>,
    /// Ticket of the refresh whose result is currently stored.
    refresh_written: Cell<u64>,
}

impl<W: WalletProvider> SessionManager<W> {
    pub fn new(wallet: Rc<W>, config: Config) -> Self {
        Self {
            wallet,
            config,
            session: RefCell::new(Session::default()),
            balances: RefCell::new(None),
            refresh_started: Cell::new(0),
            refresh_written: Cell::new(0),
        }
    }

    pub fn wallet(&self) -> Rc<W> {
        Rc::clone(&self.wallet)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Session {
        *self.session.borrow()
    }

    /// Balances written by the latest successful refresh, if any.
    pub fn balances(&self) -> Option<Balances> {
        *self.balances.borrow()
    }

    /// Run the connect handshake.
    ///
    /// Already connected sessions are returned unchanged without prompting the
    /// wallet again.
    pub async fn connect(&self) -> Result<ConnectOutcome> {
        if !self.wallet.is_available() {
            warn!("connect requested but no injected wallet is present");
            return Err(WalletError::NoWallet);
        }

        let current = self.session();
        if current.is_connected() {
            return Ok(ConnectOutcome::Connected(current));
        }

        let accounts = self
            .wallet
            .request_accounts()
            .await
            .inspect_err(|e| warn!(error = %e, "account access request failed"))?;

        let chain_id = self
            .wallet
            .chain_id()
            .await
            .inspect_err(|e| error!(error = %e, "failed to read active chain"))?;

        if !self.config.supported_chains.contains(chain_id) {
            let target = self.config.switch_chain_id;
            info!(from = chain_id, to = target, "wallet on unsupported chain, requesting switch");
            self.session.borrow_mut().chain_id = chain_id;
            self.wallet
                .switch_chain(target)
                .await
                .inspect_err(|e| warn!(error = %e, to = target, "chain switch request failed"))?;
            return Ok(ConnectOutcome::SwitchRequested { from: chain_id, to: target });
        }

        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| WalletError::Provider("wallet granted access but returned no accounts".to_string()))?;

        self.session.borrow_mut().establish(account, chain_id);
        info!(%account, chain_id, "wallet connected");
        Ok(ConnectOutcome::Connected(self.session()))
    }

    /// Clear the session locally. Wallet permissions are left untouched.
    pub fn disconnect(&self) {
        self.session.borrow_mut().reset();
        self.balances.borrow_mut().take();
        info!("wallet disconnected");
    }

    /// Apply one wallet notification.
    pub fn apply(&self, event: WalletEvent) -> SessionChange {
        let change = match event {
            WalletEvent::AccountsChanged(accounts) => self.apply_accounts(&accounts),
            WalletEvent::ChainChanged(chain_id) => {
                self.session.borrow_mut().chain_id = chain_id;
                let supported = self.config.supported_chains.contains(chain_id);
                if !supported {
                    warn!(chain_id, "wallet switched to an unsupported chain");
                }
                SessionChange::ChainChanged { chain_id, supported }
            }
        };

        if change.requires_reload() || change == SessionChange::Disconnected {
            self.balances.borrow_mut().take();
        }
        debug!(?change, "applied wallet event");
        change
    }

    fn apply_accounts(&self, accounts: &[Address]) -> SessionChange {
        let mut session = self.session.borrow_mut();
        if !session.is_connected() {
            // Access is only established by the connect handshake
            return SessionChange::Unchanged;
        }

        match accounts.first().copied() {
            Some(account) if session.account == Some(account) => SessionChange::Unchanged,
            Some(account) => {
                session.account = Some(account);
                info!(%account, "active account changed");
                SessionChange::AccountChanged { account }
            }
            None => {
                session.reset();
                info!("wallet reported no accounts, session cleared");
                SessionChange::Disconnected
            }
        }
    }

    /// Drain wallet notifications until every sender is dropped, reporting each
    /// effective change to `on_change`.
    pub async fn run(&self, events: Receiver<WalletEvent>, mut on_change: impl FnMut(SessionChange)) {
        while let Ok(event) = events.recv().await {
            let change = self.apply(event);
            if change != SessionChange::Unchanged {
                on_change(change);
            }
        }
        debug!("wallet event channel closed");
    }

    /// Re-read balances and gas price for the session account.
    ///
    /// Returns `Ok(None)` without touching the wallet when disconnected. A result
    /// is only stored if the session is unchanged since the refresh started and
    /// no newer refresh has stored its result first; otherwise the stored
    /// balances are returned as they are.
    pub async fn refresh_balances(&self) -> Result<Option<Balances>> {
        let session = self.session();
        let Some(account) = session.account() else {
            return Ok(None);
        };

        let ticket = self.refresh_started.get() + 1;
        self.refresh_started.set(ticket);

        let balances = self
            .read_balances(account, session.chain_id())
            .await
            .inspect_err(|e| error!(error = %e, %account, "balance refresh failed"))?;

        if self.session() != session {
            debug!(ticket, "session changed during refresh, discarding result");
            return Ok(self.balances());
        }
        if ticket < self.refresh_written.get() {
            debug!(ticket, "newer refresh already stored, discarding result");
            return Ok(self.balances());
        }

        *self.balances.borrow_mut() = Some(balances);
        self.refresh_written.set(ticket);
        Ok(Some(balances))
    }

    async fn read_balances(&self, account: Address, chain_id: u64) -> Result<Balances> {
        let native = self.wallet.get_balance(account).await?;
        let token = token::token_balance(&*self.wallet, self.config.token.address, account).await?;
        let gas_price = self.wallet.gas_price().await?;
        debug!(%account, %native, %token, gas_price, "balances read");

        Ok(Balances {
            account,
            chain_id,
            native,
            token,
            gas_price,
        })
    }
}
