//! Wallet Connect Widget - Leptos Frontend

use leptos::prelude::*;
use lib_core::Config;

use crate::components::{BalancePanel, ConfirmModal, Navbar, TransferForm};
use crate::state::wallet::{provide_wallet_context, use_wallet_context};

#[component]
pub fn App(config: Config) -> impl IntoView {
    provide_wallet_context(config);

    view! {
        <div class="app-container">
            <Navbar/>
            <main style="max-width: 600px; margin: 0 auto; padding: 24px; display: flex; flex-direction: column; gap: 16px;">
                <Messages/>
                <BalancePanel/>
                <TransferForm/>
            </main>
            <ConfirmModal/>
        </div>
    }
}

#[component]
fn Messages() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        {move || wallet_ctx.error.get().map(|error| view! { <div class="error">{error}</div> })}
        {move || wallet_ctx.notice.get().map(|notice| view! { <div class="success">{notice}</div> })}
    }
}
