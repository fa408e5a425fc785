//! Connect / Disconnect toggle

use leptos::prelude::*;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn ConnectButton() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    let label = move || {
        if wallet_ctx.connecting.get() {
            "Connecting..."
        } else if wallet_ctx.is_connected() {
            "Disconnect"
        } else {
            "Connect Wallet"
        }
    };

    view! {
        <button
            class="btn"
            disabled=move || wallet_ctx.connecting.get()
            on:click=move |_| wallet_ctx.toggle_connection()
        >
            {label}
        </button>
    }
}
