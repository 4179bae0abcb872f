//! Collateral engine
//!
//! Values positions in a common unit (USD with `VALUE_DECIMALS` decimals) and
//! enforces that debt never exceeds the borrow capacity of the collateral.

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    constants::VALUE_DECIMALS,
    error::LendingError,
    ledger::Side,
    math::{apply_bps, scale_by_exponent, Rounding},
    oracle::PriceOracle,
    state::{Bank, UserAccount},
};

/// Aggregate valuation of a user account
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub collateral_value: u128,
    pub borrow_capacity: u128,
    pub debt_value: u128,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.debt_value <= self.borrow_capacity
    }
}

/// Prices user positions against a set of banks
pub struct CollateralEngine<'a, O: PriceOracle> {
    oracle: &'a O,
    banks: Vec<&'a Bank>,
}

impl<'a, O: PriceOracle> CollateralEngine<'a, O> {
    /// `banks` must hold an up-to-date bank for every asset the user holds.
    pub fn new(oracle: &'a O, banks: Vec<&'a Bank>) -> Self {
        Self { oracle, banks }
    }

    fn bank(&self, mint: &Pubkey) -> Result<&'a Bank, LendingError> {
        self.banks
            .iter()
            .copied()
            .find(|bank| bank.mint == *mint)
            .ok_or_else(|| {
                msg!("No bank supplied for mint {}", mint);
                LendingError::BankNotFound
            })
    }

    /// Price and decimal exponent that turn raw units of the bank's asset into value.
    fn valuation(&self, bank: &Bank) -> Result<(u128, i32), LendingError> {
        let quote = self
            .oracle
            .read_price(&bank.config.price_feed, bank.config.max_price_age)?;
        let exponent = quote
            .exponent
            .checked_add(VALUE_DECIMALS)
            .and_then(|exponent| exponent.checked_sub(bank.mint_decimals as i32))
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok((quote.price as u128, exponent))
    }

    /// Value of `amount` units of the bank's asset.
    pub fn quote_value(&self, bank: &Bank, amount: u64, rounding: Rounding) -> Result<u128, LendingError> {
        let (price, exponent) = self.valuation(bank)?;
        scale_by_exponent(amount as u128, price, exponent, rounding)
    }

    pub fn priced_collateral_value(&self, user: &UserAccount) -> Result<u128, LendingError> {
        Ok(self.health(user)?.collateral_value)
    }

    pub fn priced_debt_value(&self, user: &UserAccount) -> Result<u128, LendingError> {
        Ok(self.health(user)?.debt_value)
    }

    /// Sum of each collateral value weighted by its bank's `max_ltv`.
    pub fn borrow_capacity(&self, user: &UserAccount) -> Result<u128, LendingError> {
        Ok(self.health(user)?.borrow_capacity)
    }

    pub fn health(&self, user: &UserAccount) -> Result<Health, LendingError> {
        let mut health = Health::default();

        for position in &user.positions {
            let bank = self.bank(&position.mint)?;
            let (price, exponent) = self.valuation(bank)?;

            let deposited = user.position_value(bank, Side::Deposit)?;
            let borrowed = user.position_value(bank, Side::Borrow)?;

            let collateral = scale_by_exponent(deposited as u128, price, exponent, Rounding::Down)?;
            let debt = scale_by_exponent(borrowed as u128, price, exponent, Rounding::Up)?;
            let capacity = apply_bps(collateral, bank.config.max_ltv, Rounding::Down)?;

            health.collateral_value = health
                .collateral_value
                .checked_add(collateral)
                .ok_or(LendingError::ArithmeticOverflow)?;
            health.borrow_capacity = health
                .borrow_capacity
                .checked_add(capacity)
                .ok_or(LendingError::ArithmeticOverflow)?;
            health.debt_value = health
                .debt_value
                .checked_add(debt)
                .ok_or(LendingError::ArithmeticOverflow)?;
        }

        Ok(health)
    }

    /// Reject a borrow that left the account over its borrow capacity.
    ///
    /// `user` and `bank` are the staged state with the new debt already
    /// credited, so share rounding is part of what gets checked.
    pub fn check_borrow_allowed(&self, user: &UserAccount, bank: &Bank) -> Result<Health, LendingError> {
        self.require_healthy(user, bank, "Borrow")
    }

    /// Reject a withdrawal that left debt uncovered. Takes the staged state
    /// with the deposit shares already burned.
    pub fn check_withdraw_allowed(&self, user: &UserAccount, bank: &Bank) -> Result<Health, LendingError> {
        self.require_healthy(user, bank, "Withdraw")
    }

    fn require_healthy(&self, user: &UserAccount, bank: &Bank, action: &str) -> Result<Health, LendingError> {
        // The moved asset is priced even when its position is now closed
        self.valuation(bank)?;
        let health = self.health(user)?;

        if !health.is_healthy() {
            msg!(
                "{} rejected: debt {} exceeds capacity {}",
                action,
                health.debt_value,
                health.borrow_capacity
            );
            return Err(LendingError::InsufficientCollateral);
        }

        Ok(health)
    }
}
