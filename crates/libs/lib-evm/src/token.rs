//! Fungible-token contract calls (`balanceOf`, `approve`, `transfer`).

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use lib_core::{Result, WalletError};

use crate::provider::ChainProvider;

sol! {
    /// The subset of the standard token interface the widget uses.
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

pub fn balance_of_calldata(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Decode a single `uint256` return word.
pub fn decode_uint256(data: &[u8]) -> Result<U256> {
    match data.get(..32) {
        Some(word) => Ok(U256::from_be_slice(word)),
        // An empty return usually means there is no contract at the address on this chain
        None => Err(WalletError::Provider(format!(
            "expected a 32-byte uint256 return, got {} bytes",
            data.len()
        ))),
    }
}

/// Token balance of `owner`, in the token's smallest unit.
pub async fn token_balance<P>(provider: &P, token: Address, owner: Address) -> Result<U256>
where
    P: ChainProvider + ?Sized,
{
    let output = provider.call(token, balance_of_calldata(owner)).await?;
    decode_uint256(&output)
}
