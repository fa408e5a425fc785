//! Confirmation prompt shown between validation and submission

use leptos::prelude::*;
use lib_evm::TransferPhase;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn ConfirmModal() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    move || {
        let phase = wallet_ctx.phase.get();
        let prepared = wallet_ctx.prepared.get();

        match prepared {
            Some(prepared) if phase.prompt_open() => {
                let config = wallet_ctx.config();
                let status = match phase {
                    TransferPhase::Submitting => Some("Waiting for wallet signature..."),
                    TransferPhase::PendingInclusion => Some("Waiting for the transaction to be included..."),
                    _ => None,
                };

                view! {
                    <div class="wallet-overlay">
                        <div class="wallet-setup-card" style="max-width: 600px;">
                            <p class="confirm-summary">{prepared.summary(&config)}</p>
                            <div class="info" style="margin: 16px 0;">
                                <p>{format!("Gas limit: {}", prepared.fee.gas_limit)}</p>
                                <p>{format!("Gas price: {} gwei", prepared.gas_price_gwei())}</p>
                            </div>
                            {status.map(|text| view! {
                                <div class="status">
                                    <div class="spinner"></div>
                                    <span>{text}</span>
                                </div>
                            })}
                            <div style="display: flex; gap: 12px; justify-content: flex-end;">
                                <button
                                    class="btn-secondary"
                                    disabled=phase.in_flight()
                                    on:click=move |_| wallet_ctx.cancel()
                                >
                                    "Cancel"
                                </button>
                                <button
                                    class="btn"
                                    disabled=phase.in_flight()
                                    on:click=move |_| wallet_ctx.confirm()
                                >
                                    "Confirm"
                                </button>
                            </div>
                        </div>
                    </div>
                }
                .into_any()
            }
            _ => ().into_any(),
        }
    }
}
