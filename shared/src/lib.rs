//! # Shared Data Types
//!
//! Plain, dependency-light types used by both the wallet libraries and the
//! browser widget.
//!
//! ## Structure
//!
//! - **[`dto`]**: Transfer form, currency mode, fee estimate and balance view
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::format_address`]**: Format addresses for display
//!   - **[`utils::truncate_address`]**: Truncate addresses with ellipsis
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::{CurrencyMode, TransferRequest};
//! use shared::utils::truncate_address;
//!
//! let request = TransferRequest::new(
//!     "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
//!     "0.01",
//!     CurrencyMode::Native,
//! );
//! assert_eq!(truncate_address(&request.recipient), "0x5aAe...eAed");
//! ```

pub mod dto;
pub mod utils;

// Wildcard re-exports: every item here is public API
pub use dto::*;
pub use utils::*;
