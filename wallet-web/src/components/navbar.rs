//! Navigation Bar Component

use leptos::prelude::*;
use shared::truncate_address;

use crate::components::ConnectButton;
use crate::state::wallet::use_wallet_context;

#[component]
pub fn Navbar() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        <nav>
            <div style="max-width: 1200px; margin: 0 auto; padding: 0 24px; display: flex; justify-content: space-between; align-items: center;">
                <span class="nav-title">"Wallet Connect"</span>
                <div style="display: flex; gap: 16px; align-items: center;">
                    {move || {
                        wallet_ctx.address().map(|address| {
                            let chain_id = wallet_ctx.session.with(|s| s.chain_id());
                            view! {
                                <span class="nav-address" title=address.clone()>
                                    {truncate_address(&address)}
                                </span>
                                <span class="nav-chain">{format!("Chain {}", chain_id)}</span>
                            }
                        })
                    }}
                    <ConnectButton/>
                </div>
            </div>
        </nav>
    }
}
