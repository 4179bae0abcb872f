use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::{
    constants::*,
    error::LendingError,
    state::{ProgramAccount, DISCRIMINATOR_SIZE},
};

/// Reserve pool for one asset
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Bump of the bank PDA, which also signs for the treasury
    pub bump: u8,

    /// Bump of the treasury PDA
    pub treasury_bump: u8,

    /// Signer that created the bank
    pub authority: Pubkey,

    /// Asset mint
    pub mint: Pubkey,

    /// Decimals of the asset mint
    pub mint_decimals: u8,

    /// Token account holding the pool's tokens
    pub treasury: Pubkey,

    /// Deposits owed to depositors, interest included
    pub total_deposited: u64,
    pub total_deposit_shares: u64,

    /// Debt owed by borrowers, interest included
    pub total_borrowed: u64,
    pub total_borrow_shares: u64,

    /// Borrower interest retained by the pool
    pub total_reserves: u64,

    /// Annual rates in basis points
    pub deposit_interest_rate: u64,
    pub borrow_interest_rate: u64,

    /// Last time interest was accrued
    pub last_update_timestamp: UnixTimestamp,

    /// Risk and oracle parameters
    pub config: BankConfig,
}

/// Per-bank risk and oracle parameters, fixed at initialization
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct BankConfig {
    /// Maximum loan-to-value in basis points
    pub max_ltv: u64,

    /// Reserved for liquidation support
    pub liquidation_threshold: u64,

    /// Reserved for liquidation support
    pub liquidation_bonus: u64,

    /// Price feed account for this asset
    pub price_feed: Pubkey,

    /// Maximum quote age in seconds
    pub max_price_age: u64,
}

/// Addresses and bumps resolved by the caller before a bank is created
#[derive(Debug, Clone, Copy)]
pub struct BankSetup {
    pub authority: Pubkey,
    pub mint: Pubkey,
    pub mint_decimals: u8,
    pub treasury: Pubkey,
    pub bump: u8,
    pub treasury_bump: u8,
}

impl ProgramAccount for Bank {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_SIZE] = [76, 69, 78, 68, 66, 65, 78, 75]; // "LENDBANK"

    const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        1 + // bump
        1 + // treasury_bump
        32 + // authority
        32 + // mint
        1 + // mint_decimals
        32 + // treasury
        8 + // total_deposited
        8 + // total_deposit_shares
        8 + // total_borrowed
        8 + // total_borrow_shares
        8 + // total_reserves
        8 + // deposit_interest_rate
        8 + // borrow_interest_rate
        8 + // last_update_timestamp
        BankConfig::LEN +
        64; // padding
}

impl Bank {
    pub fn new(
        setup: BankSetup,
        deposit_interest_rate: u64,
        borrow_interest_rate: u64,
        config: BankConfig,
        now: UnixTimestamp,
    ) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            bump: setup.bump,
            treasury_bump: setup.treasury_bump,
            authority: setup.authority,
            mint: setup.mint,
            mint_decimals: setup.mint_decimals,
            treasury: setup.treasury,
            total_deposited: 0,
            total_deposit_shares: 0,
            total_borrowed: 0,
            total_borrow_shares: 0,
            total_reserves: 0,
            deposit_interest_rate,
            borrow_interest_rate,
            last_update_timestamp: now,
            config,
        }
    }

    /// Liquidity available for withdrawals and new borrows.
    pub fn available_liquidity(&self) -> u64 {
        self.total_deposited.saturating_sub(self.total_borrowed)
    }

    pub fn validate(&self) -> Result<(), LendingError> {
        if self.discriminator != Self::DISCRIMINATOR || !self.is_initialized {
            return Err(LendingError::InvalidAccountData);
        }
        if self.deposit_interest_rate > MAX_RATE_BPS || self.borrow_interest_rate > MAX_RATE_BPS {
            return Err(LendingError::InvalidConfiguration);
        }
        self.config.validate()
    }
}

impl BankConfig {
    pub const LEN: usize = 8 + // max_ltv
        8 + // liquidation_threshold
        8 + // liquidation_bonus
        32 + // price_feed
        8; // max_price_age

    /// Defaults from `constants` with the given price feed.
    pub fn new(price_feed: Pubkey) -> Self {
        Self {
            max_ltv: DEFAULT_MAX_LTV_BPS,
            liquidation_threshold: DEFAULT_LIQUIDATION_THRESHOLD_BPS,
            liquidation_bonus: DEFAULT_LIQUIDATION_BONUS_BPS,
            price_feed,
            max_price_age: DEFAULT_MAX_PRICE_AGE,
        }
    }

    pub fn validate(&self) -> Result<(), LendingError> {
        if self.max_ltv == 0 || self.max_ltv > BPS {
            return Err(LendingError::InvalidConfiguration);
        }

        if self.liquidation_threshold < self.max_ltv || self.liquidation_threshold > BPS {
            return Err(LendingError::InvalidConfiguration);
        }

        if self.liquidation_bonus > BPS {
            return Err(LendingError::InvalidConfiguration);
        }

        if self.price_feed == Pubkey::default() || self.max_price_age == 0 {
            return Err(LendingError::InvalidConfiguration);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> BankSetup {
        BankSetup {
            authority: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            mint_decimals: 6,
            treasury: Pubkey::new_unique(),
            bump: 254,
            treasury_bump: 253,
        }
    }

    #[test]
    fn test_bank_fits_allocated_len() {
        let bank = Bank::new(setup(), 1, 1, BankConfig::new(Pubkey::new_unique()), 0);
        let mut data = vec![0u8; Bank::LEN];
        bank.save(&mut data).unwrap();
        assert!(Bank::is_initialized(&data));
        assert_eq!(Bank::load(&data).unwrap(), bank);
    }

    #[test]
    fn test_load_optional_on_empty_account() {
        assert!(Bank::load_optional(&[0u8; Bank::LEN]).unwrap().is_none());
        assert!(Bank::load_optional(&[]).unwrap().is_none());
        assert!(Bank::load(&[1u8; 16]).is_err());
    }

    #[test]
    fn test_config_validation() {
        let feed = Pubkey::new_unique();
        assert!(BankConfig::new(feed).validate().is_ok());

        let mut config = BankConfig::new(feed);
        config.max_ltv = 0;
        assert_eq!(config.validate(), Err(LendingError::InvalidConfiguration));

        let mut config = BankConfig::new(feed);
        config.liquidation_threshold = config.max_ltv - 1;
        assert_eq!(config.validate(), Err(LendingError::InvalidConfiguration));

        assert_eq!(
            BankConfig::new(Pubkey::default()).validate(),
            Err(LendingError::InvalidConfiguration)
        );

        let bank = Bank::new(setup(), MAX_RATE_BPS + 1, 1, BankConfig::new(feed), 0);
        assert_eq!(bank.validate(), Err(LendingError::InvalidConfiguration));
    }
}
