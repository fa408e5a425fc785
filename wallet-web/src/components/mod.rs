//! UI Components

pub mod balances;
pub mod confirm_modal;
pub mod connect_button;
pub mod navbar;
pub mod transfer_form;

pub use balances::BalancePanel;
pub use confirm_modal::ConfirmModal;
pub use connect_button::ConnectButton;
pub use navbar::Navbar;
pub use transfer_form::TransferForm;
