use serde::{Deserialize, Serialize};

/// Which asset a transfer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyMode {
    /// The chain's base currency (BNB, ETH).
    #[default]
    Native,
    /// The configured token contract.
    Token,
}

impl CurrencyMode {
    pub fn toggled(self) -> Self {
        match self {
            CurrencyMode::Native => CurrencyMode::Token,
            CurrencyMode::Token => CurrencyMode::Native,
        }
    }
}

/// Transfer form contents as typed by the user.
///
/// Transient: created per submit action and consumed once by the transfer initiator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransferRequest {
    pub recipient: String,
    /// Decimal amount in whole units (e.g. `"0.01"`).
    pub amount: String,
    pub mode: CurrencyMode,
}

impl TransferRequest {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>, mode: CurrencyMode) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
            mode,
        }
    }
}

/// Fee parameters fetched right before the confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeEstimate {
    /// Gas limit of the latest block.
    pub gas_limit: u64,
    /// Current gas price in wei.
    pub gas_price: u128,
}

/// Balances formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceView {
    pub native: String,
    pub token: String,
    pub gas_price_gwei: String,
}
