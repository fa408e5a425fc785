//! # Data Transfer Objects (DTOs)
//!
//! Plain data passed between the wallet libraries and the widget view.
//!
//! ## Module Organization
//!
//! - [`wallet`] - Transfer form, currency mode, fee estimate and balance display types
//!
//! ## Serialization Format
//!
//! - **Field naming**: snake_case (default serde behavior)
//! - **Enums**: Serialize to lowercase strings using `#[serde(rename_all = "lowercase")]`
//! - **All types**: Implement both `Serialize` and `Deserialize`

pub mod wallet;

pub use wallet::*;
