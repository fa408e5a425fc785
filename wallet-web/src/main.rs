//! Browser widget for an injected EIP-1193 wallet
//!
//! Connects to `window.ethereum`, shows native and token balances, and sends
//! native or token transfers after a confirmation prompt.

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

mod app;
mod components;
mod services;
mod state;

use app::App;

#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Initialize logger
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Wallet widget starting...");

    if let Err(e) = lib_core::config::init_config() {
        log::error!("Invalid widget configuration: {}", e);
        return;
    }
    let config = lib_core::config::core_config().clone();
    log::info!(
        "Supported chains: {:?}, token {} at {}",
        config.supported_chains.iter().collect::<Vec<_>>(),
        config.token.symbol,
        config.token.address
    );

    leptos::mount::mount_to_body(move || view! { <App config=config/> });
}
