//! # Session Manager Tests

use super::*;
use crate::provider::WalletEvent;
use crate::session::{event_channel, ConnectOutcome, SessionChange, SessionManager};

fn manager(wallet: &Rc<MockWallet>) -> SessionManager<MockWallet> {
    SessionManager::new(Rc::clone(wallet), test_config())
}

#[tokio::test]
async fn test_connect_on_supported_chain() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);

    let outcome = manager.connect().await.unwrap();

    let session = manager.session();
    assert_eq!(outcome, ConnectOutcome::Connected(session));
    assert_eq!(session.account(), Some(ALICE));
    assert_eq!(session.chain_id(), 56);
    assert_eq!(wallet.state().calls, vec!["eth_requestAccounts", "eth_chainId"]);
}

#[tokio::test]
async fn test_connect_picks_primary_account() {
    let wallet = MockWallet::with_state(MockState {
        accounts: vec![BOB, ALICE],
        ..MockState::default()
    });
    let manager = manager(&wallet);

    manager.connect().await.unwrap();

    assert_eq!(manager.session().account(), Some(BOB));
}

#[tokio::test]
async fn test_connect_on_unsupported_chain_requests_switch() {
    let wallet = MockWallet::with_state(MockState {
        chain_id: 137,
        ..MockState::default()
    });
    let manager = manager(&wallet);

    let outcome = manager.connect().await.unwrap();

    assert_eq!(outcome, ConnectOutcome::SwitchRequested { from: 137, to: 56 });
    assert!(!manager.session().is_connected());
    assert_eq!(manager.session().chain_id(), 137);
    assert_eq!(wallet.state().calls_of("wallet_switchEthereumChain"), 1);

    // The wallet reports the switch, then the user connects again
    let change = manager.apply(WalletEvent::ChainChanged(56));
    assert_eq!(change, SessionChange::ChainChanged { chain_id: 56, supported: true });
    assert!(!manager.session().is_connected());

    let outcome = manager.connect().await.unwrap();
    assert!(matches!(outcome, ConnectOutcome::Connected(_)));
    assert_eq!(manager.session().account(), Some(ALICE));
}

#[tokio::test]
async fn test_connect_rejected_leaves_session_empty() {
    let wallet = MockWallet::with_state(MockState {
        reject_accounts: true,
        ..MockState::default()
    });
    let manager = manager(&wallet);

    let err = manager.connect().await.unwrap_err();

    assert!(matches!(err, WalletError::Rejected(_)));
    assert!(!manager.session().is_connected());
    assert_eq!(wallet.state().calls_of("eth_chainId"), 0);
}

#[tokio::test]
async fn test_connect_without_wallet() {
    let wallet = MockWallet::with_state(MockState {
        available: false,
        ..MockState::default()
    });
    let manager = manager(&wallet);

    let err = manager.connect().await.unwrap_err();

    assert!(matches!(err, WalletError::NoWallet));
    assert!(wallet.state().calls.is_empty());
}

#[tokio::test]
async fn test_connect_twice_does_not_prompt_again() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);

    manager.connect().await.unwrap();
    manager.connect().await.unwrap();

    assert_eq!(wallet.state().calls_of("eth_requestAccounts"), 1);
}

#[tokio::test]
async fn test_accounts_changed() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();
    manager.refresh_balances().await.unwrap();

    assert_eq!(
        manager.apply(WalletEvent::AccountsChanged(vec![ALICE])),
        SessionChange::Unchanged
    );
    assert!(manager.balances().is_some());

    let change = manager.apply(WalletEvent::AccountsChanged(vec![BOB]));
    assert_eq!(change, SessionChange::AccountChanged { account: BOB });
    assert!(change.requires_reload());
    assert_eq!(manager.session().account(), Some(BOB));
    assert_eq!(manager.session().chain_id(), 56);
    assert!(manager.balances().is_none());
}

#[tokio::test]
async fn test_empty_accounts_clears_session() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();

    let change = manager.apply(WalletEvent::AccountsChanged(vec![]));

    assert_eq!(change, SessionChange::Disconnected);
    assert!(!manager.session().is_connected());
    assert_eq!(manager.session().chain_id(), 0);
}

#[test]
fn test_accounts_changed_while_disconnected_is_ignored() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);

    let change = manager.apply(WalletEvent::AccountsChanged(vec![BOB]));

    assert_eq!(change, SessionChange::Unchanged);
    assert!(!manager.session().is_connected());
}

#[tokio::test]
async fn test_chain_changed_to_unsupported_chain() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();

    let change = manager.apply(WalletEvent::ChainChanged(137));

    assert_eq!(change, SessionChange::ChainChanged { chain_id: 137, supported: false });
    assert_eq!(manager.session().account(), Some(ALICE));
    assert_eq!(manager.session().chain_id(), 137);
}

#[tokio::test]
async fn test_run_reports_effective_changes() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();

    let (tx, rx) = event_channel();
    tx.send(WalletEvent::AccountsChanged(vec![ALICE])).await.unwrap();
    tx.send(WalletEvent::ChainChanged(97)).await.unwrap();
    tx.send(WalletEvent::AccountsChanged(vec![BOB])).await.unwrap();
    drop(tx);

    let mut changes = Vec::new();
    manager.run(rx, |change| changes.push(change)).await;

    assert_eq!(
        changes,
        vec![
            SessionChange::ChainChanged { chain_id: 97, supported: true },
            SessionChange::AccountChanged { account: BOB },
        ]
    );
    assert_eq!(manager.session().account(), Some(BOB));
    assert_eq!(manager.session().chain_id(), 97);
}

#[tokio::test]
async fn test_refresh_balances() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();

    let balances = manager.refresh_balances().await.unwrap().unwrap();

    assert_eq!(balances.account, ALICE);
    assert_eq!(balances.native, ether(2));
    assert_eq!(balances.token, ether(1_000));
    assert_eq!(balances.gas_price, 3_000_000_000);

    let view = balances.view(manager.config());
    assert_eq!(view.native, "2.00000");
    assert_eq!(view.token, "1000.00000");
    assert_eq!(view.gas_price_gwei, "3");
}

#[tokio::test]
async fn test_refresh_twice_is_idempotent() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();

    let first = manager.refresh_balances().await.unwrap();
    let second = manager.refresh_balances().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(manager.balances(), second);
}

#[tokio::test]
async fn test_refresh_when_disconnected_makes_no_calls() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();
    manager.refresh_balances().await.unwrap();

    manager.disconnect();
    wallet.state().calls.clear();

    assert_eq!(manager.refresh_balances().await.unwrap(), None);
    assert!(manager.balances().is_none());
    assert!(wallet.state().calls.is_empty());
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_balances() {
    let wallet = MockWallet::new();
    let manager = manager(&wallet);
    manager.connect().await.unwrap();
    let stored = manager.refresh_balances().await.unwrap();

    wallet.state().gas_price_fails = true;
    let err = manager.refresh_balances().await.unwrap_err();

    assert!(matches!(err, WalletError::Provider(_)));
    assert_eq!(manager.balances(), stored);
}

#[tokio::test]
async fn test_older_refresh_does_not_overwrite_newer() {
    let wallet = MockWallet::new();
    {
        let mut state = wallet.state();
        state.scripted_balances = VecDeque::from([ether(1), ether(5)]);
        // The first refresh stalls inside eth_getBalance
        state.balance_yields = VecDeque::from([3, 0]);
    }
    let manager = manager(&wallet);
    manager.connect().await.unwrap();

    let (older, newer) = tokio::join!(manager.refresh_balances(), manager.refresh_balances());

    assert_eq!(newer.unwrap().unwrap().native, ether(5));
    assert_eq!(older.unwrap().unwrap().native, ether(5));
    assert_eq!(manager.balances().unwrap().native, ether(5));
}

#[tokio::test]
async fn test_refresh_discarded_after_account_change() {
    let wallet = MockWallet::new();
    wallet.state().balance_yields = VecDeque::from([2]);
    let manager = manager(&wallet);
    manager.connect().await.unwrap();

    let (result, change) = tokio::join!(manager.refresh_balances(), async {
        manager.apply(WalletEvent::AccountsChanged(vec![BOB]))
    });

    assert_eq!(change, SessionChange::AccountChanged { account: BOB });
    assert_eq!(result.unwrap(), None);
    assert!(manager.balances().is_none());

    let balances = manager.refresh_balances().await.unwrap().unwrap();
    assert_eq!(balances.account, BOB);
    assert_eq!(balances.native, ether(7));
}
