//! Protocol-wide constants and configuration defaults

/// Basis point denominator (10_000 = 100%)
pub const BPS: u64 = 10_000;

/// Seconds used to annualize interest rates
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Decimals of the common valuation unit (USD with 6 decimals)
pub const VALUE_DECIMALS: i32 = 6;

/// Upper bound for deposit and borrow rates (1000% APR)
pub const MAX_RATE_BPS: u64 = 100_000;

/// Default loan-to-value ratio applied to collateral (75%)
pub const DEFAULT_MAX_LTV_BPS: u64 = 7_500;

/// Default liquidation threshold (80%), stored for future liquidation support
pub const DEFAULT_LIQUIDATION_THRESHOLD_BPS: u64 = 8_000;

/// Default liquidation bonus (5%), stored for future liquidation support
pub const DEFAULT_LIQUIDATION_BONUS_BPS: u64 = 500;

/// Default maximum oracle quote age in seconds
pub const DEFAULT_MAX_PRICE_AGE: u64 = 100;

/// Maximum confidence interval accepted, relative to the price (5%)
pub const MAX_CONFIDENCE_BPS: u64 = 500;

/// Maximum number of distinct assets a user account can hold
pub const MAX_POSITIONS: usize = 8;
