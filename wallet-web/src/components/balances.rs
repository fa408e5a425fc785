//! Balance panel for the session account

use leptos::prelude::*;
use shared::CurrencyMode;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn BalancePanel() -> impl IntoView {
    let wallet_ctx = use_wallet_context();
    let native_symbol = wallet_ctx.symbol(CurrencyMode::Native);
    let token_symbol = wallet_ctx.symbol(CurrencyMode::Token);

    view! {
        <div class="card balances">
            {move || match wallet_ctx.balances.get() {
                Some(balances) => view! {
                    <div class="balance-row">
                        <span class="label">{native_symbol.clone()}</span>
                        <span class="value">{balances.native}</span>
                    </div>
                    <div class="balance-row">
                        <span class="label">{token_symbol.clone()}</span>
                        <span class="value">{balances.token}</span>
                    </div>
                    <div class="balance-row">
                        <span class="label">"Gas price"</span>
                        <span class="value">{format!("{} gwei", balances.gas_price_gwei)}</span>
                    </div>
                }
                .into_any(),
                None if wallet_ctx.is_connected() => view! { <p class="info">"Loading balances..."</p> }.into_any(),
                None => view! { <p class="info">"Connect your wallet to see balances"</p> }.into_any(),
            }}
        </div>
    }
}
