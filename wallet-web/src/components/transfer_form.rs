//! Transfer form: recipient, amount and currency toggle

use leptos::prelude::*;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn TransferForm() -> impl IntoView {
    let wallet_ctx = use_wallet_context();
    let (recipient, set_recipient) = signal(String::new());
    let (amount, set_amount) = signal(String::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        wallet_ctx.submit(recipient.get_untracked(), amount.get_untracked());
    };

    let symbol = move || wallet_ctx.symbol(wallet_ctx.mode.get());
    let busy = move || wallet_ctx.phase.get().in_flight();

    view! {
        <form class="card transfer-form" on:submit=on_submit>
            <label for="recipient">"Receiver Address"</label>
            <input
                id="recipient"
                type="text"
                placeholder="0x..."
                prop:value=recipient
                on:input=move |ev| set_recipient.set(event_target_value(&ev))
            />

            <label for="amount">{move || format!("Amount ({})", symbol())}</label>
            <div style="display: flex; gap: 8px;">
                <input
                    id="amount"
                    type="text"
                    inputmode="decimal"
                    placeholder="0.0"
                    prop:value=amount
                    on:input=move |ev| set_amount.set(event_target_value(&ev))
                />
                <button
                    type="button"
                    class="btn-secondary"
                    on:click=move |_| wallet_ctx.toggle_mode()
                >
                    {move || format!("Use {}", wallet_ctx.symbol(wallet_ctx.mode.get().toggled()))}
                </button>
            </div>

            <button type="submit" class="btn" disabled=busy>
                "Send"
            </button>
        </form>
    }
}
