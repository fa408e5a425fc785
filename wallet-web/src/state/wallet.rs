//! Wallet state management
//!
//! [`WalletContext`] mirrors the session manager and transfer initiator into
//! signals the components read, and runs their async operations on the page's
//! event loop.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use lib_core::Config;
use lib_evm::{
    event_channel, ConnectOutcome, PreparedTransfer, Session, SessionChange, SessionManager, TransferInitiator,
    TransferPhase,
};
use shared::{BalanceView, CurrencyMode, TransferRequest};

use crate::services::wallet::{subscribe_events, InjectedWallet};

/// Owner of the wallet libraries for the page.
pub struct WalletController {
    pub session: SessionManager<InjectedWallet>,
    pub transfers: TransferInitiator<InjectedWallet>,
}

/// Global wallet context
#[derive(Clone, Copy)]
pub struct WalletContext {
    pub session: RwSignal<Session>,
    pub balances: RwSignal<Option<BalanceView>>,
    pub mode: RwSignal<CurrencyMode>,
    pub phase: RwSignal<TransferPhase>,
    pub prepared: RwSignal<Option<PreparedTransfer>>,
    pub error: RwSignal<Option<String>>,
    pub notice: RwSignal<Option<String>>,
    /// Set while a connect or chain switch prompt is open in the wallet.
    pub connecting: RwSignal<bool>,
    awaiting_switch: RwSignal<bool>,
    config: StoredValue<Config>,
    controller: StoredValue<Rc<WalletController>, LocalStorage>,
}

impl WalletContext {
    pub fn new(config: Config) -> Self {
        let wallet = Rc::new(InjectedWallet::new(config.receipt_poll_interval_ms));
        let phase = RwSignal::new(TransferPhase::Idle);

        let controller = WalletController {
            session: SessionManager::new(Rc::clone(&wallet), config.clone()),
            transfers: TransferInitiator::new(wallet, config.clone()).with_observer(move |p| phase.set(p)),
        };

        Self {
            session: RwSignal::new(Session::default()),
            balances: RwSignal::new(None),
            mode: RwSignal::new(CurrencyMode::Native),
            phase,
            prepared: RwSignal::new(None),
            error: RwSignal::new(None),
            notice: RwSignal::new(None),
            connecting: RwSignal::new(false),
            awaiting_switch: RwSignal::new(false),
            config: StoredValue::new(config),
            controller: StoredValue::new_local(Rc::new(controller)),
        }
    }

    fn controller(&self) -> Rc<WalletController> {
        self.controller.get_value()
    }

    pub fn config(&self) -> Config {
        self.config.get_value()
    }

    pub fn is_connected(&self) -> bool {
        self.session.with(|session| session.is_connected())
    }

    pub fn address(&self) -> Option<String> {
        self.session.with(|session| session.account().map(|a| a.to_string()))
    }

    pub fn symbol(&self, mode: CurrencyMode) -> String {
        self.config.with_value(|config| match mode {
            CurrencyMode::Native => config.native_symbol.clone(),
            CurrencyMode::Token => config.token.symbol.clone(),
        })
    }

    pub fn toggle_mode(&self) {
        self.mode.update(|mode| *mode = mode.toggled());
    }

    fn sync_session(&self) {
        self.session.set(self.controller().session.session());
    }

    fn report(&self, err: lib_core::WalletError) {
        log::error!("wallet operation failed: {}", err);
        self.error.set(Some(err.user_message()));
    }

    /// Start forwarding wallet notifications into the session manager.
    pub fn listen(self) {
        let (tx, rx) = event_channel();
        if !subscribe_events(tx) {
            log::warn!("injected wallet does not emit events, account and chain changes will be missed");
            return;
        }

        let controller = self.controller();
        spawn_local(async move {
            controller.session.run(rx, move |change| self.on_change(change)).await;
        });
    }

    fn on_change(self, change: SessionChange) {
        self.sync_session();
        match change {
            SessionChange::Disconnected => {
                self.balances.set(None);
                self.notice.set(Some("Wallet disconnected".to_string()));
            }
            SessionChange::ChainChanged { supported: false, chain_id } => {
                self.balances.set(None);
                self.error.set(Some(format!("Chain {} is not supported, please switch network", chain_id)));
            }
            SessionChange::ChainChanged { supported: true, .. } if self.awaiting_switch.get_untracked() => {
                self.awaiting_switch.set(false);
                self.connect();
            }
            change if change.requires_reload() => {
                self.error.set(None);
                self.refresh();
            }
            _ => {}
        }
    }

    /// Connect when disconnected, disconnect when connected.
    pub fn toggle_connection(self) {
        if self.session.get_untracked().is_connected() {
            self.disconnect();
        } else {
            self.connect();
        }
    }

    pub fn connect(self) {
        self.error.set(None);
        self.connecting.set(true);
        let controller = self.controller();
        spawn_local(async move {
            let outcome = controller.session.connect().await;
            self.connecting.set(false);
            self.sync_session();
            match outcome {
                Ok(ConnectOutcome::Connected(session)) => {
                    log::info!("connected {:?} on chain {}", session.account(), session.chain_id());
                    self.refresh();
                }
                Ok(ConnectOutcome::SwitchRequested { from, to }) => {
                    self.awaiting_switch.set(true);
                    self.notice.set(Some(format!("Chain {} is not supported, switching to {}", from, to)));
                }
                Err(e) => self.report(e),
            }
        });
    }

    pub fn disconnect(self) {
        self.controller().session.disconnect();
        self.sync_session();
        self.balances.set(None);
        self.prepared.set(None);
        self.controller().transfers.cancel();
    }

    /// Reload balances and gas price for the session account.
    pub fn refresh(self) {
        let controller = self.controller();
        spawn_local(async move {
            match controller.session.refresh_balances().await {
                Ok(balances) => {
                    let config = self.config();
                    self.balances.set(balances.map(|b| b.view(&config)));
                }
                Err(e) => self.report(e),
            }
        });
    }

    /// Validate the form and open the confirmation prompt.
    pub fn submit(self, recipient: String, amount: String) {
        self.error.set(None);
        self.notice.set(None);
        let request = TransferRequest::new(recipient, amount, self.mode.get_untracked());
        let controller = self.controller();
        spawn_local(async move {
            let session = controller.session.session();
            match controller.transfers.prepare(request, &session).await {
                Ok(prepared) => self.prepared.set(Some(prepared)),
                Err(e) => {
                    self.prepared.set(None);
                    self.report(e);
                }
            }
        });
    }

    pub fn confirm(self) {
        self.error.set(None);
        let controller = self.controller();
        spawn_local(async move {
            match controller.transfers.confirm().await {
                Ok(receipt) => {
                    self.prepared.set(None);
                    self.notice.set(Some(format!(
                        "Transfer included in block {}: {}",
                        receipt.block_number, receipt.tx_hash
                    )));
                    self.refresh();
                }
                Err(e) => self.report(e),
            }
        });
    }

    pub fn cancel(self) {
        if self.controller().transfers.cancel() {
            self.prepared.set(None);
        }
    }
}

pub fn provide_wallet_context(config: Config) -> WalletContext {
    let context = WalletContext::new(config);
    provide_context(context);
    context.listen();
    context
}

pub fn use_wallet_context() -> WalletContext {
    expect_context::<WalletContext>()
}
