//! # Shared Utility Functions
//!
//! ## Address Formatting
//!
//! Functions for formatting `0x` account addresses for display:
//! - [`format_address`] - Format address with ellipsis (first N and last M characters)
//! - [`truncate_address`] - `format_address` with the widget's default 6/4 split
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::truncate_address;
//!
//! let address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
//! assert_eq!(truncate_address(address), "0x5aAe...eAed");
//! ```

/// Format an address by showing the first `prefix_len` and last `suffix_len` characters.
///
/// If the address is shorter than `prefix_len + suffix_len`, it is returned as-is.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_address;
///
/// let addr = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
/// assert_eq!(format_address(addr, 6, 4), "0x5aAe...eAed");
/// assert_eq!(format_address(addr, 4, 4), "0x5a...eAed");
/// assert_eq!(format_address("0xabc", 6, 4), "0xabc");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    // Hex addresses are ASCII, but user input may not be
    if address_len <= prefix_len + suffix_len || !address.is_ascii() {
        return address.to_string();
    }

    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Format an address with a 6-character prefix (`0x` plus four digits) and a
/// 4-character suffix.
pub fn truncate_address(address: &str) -> String {
    format_address(address, 6, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        let addr = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(format_address(addr, 6, 4), "0x5aAe...eAed");
        assert_eq!(format_address(addr, 2, 2), "0x...ed");
    }

    #[test]
    fn test_format_address_short() {
        assert_eq!(format_address("0x1234", 6, 4), "0x1234");
        assert_eq!(format_address("", 6, 4), "");
    }

    #[test]
    fn test_format_address_non_ascii() {
        let input = "0xé23456789abcdef";
        assert_eq!(format_address(input, 6, 4), input);
    }
}
