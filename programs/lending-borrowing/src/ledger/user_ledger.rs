//! Per-user share accounting against a bank's exchange rates

use solana_program::msg;

use crate::{
    error::LendingError,
    math::Rounding,
    state::{Bank, UserAccount},
};

/// Which side of a position is being valued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Deposit,
    Borrow,
}

impl UserAccount {
    /// Credit deposit shares for `amount`, returning the shares minted.
    pub fn credit_deposit(&mut self, bank: &Bank, amount: u64) -> Result<u64, LendingError> {
        let shares = bank.deposit_shares_for(amount, Rounding::Down)?;
        if shares == 0 {
            msg!("Deposit of {} is worth no shares", amount);
            return Err(LendingError::InvalidAmount);
        }

        let position = self.position_or_insert(&bank.mint)?;
        position.deposited_shares = position
            .deposited_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok(shares)
    }

    /// Burn the deposit shares backing `amount`, returning the shares burned.
    pub fn debit_withdraw(&mut self, bank: &Bank, amount: u64) -> Result<u64, LendingError> {
        let balance = self.position_value(bank, Side::Deposit)?;
        if amount > balance {
            msg!("Withdraw of {} exceeds deposited balance {}", amount, balance);
            return Err(LendingError::InsufficientBalance);
        }

        let shares = bank.deposit_shares_for(amount, Rounding::Up)?;
        let position = self
            .position_mut(&bank.mint)
            .ok_or(LendingError::InsufficientBalance)?;
        position.deposited_shares = position
            .deposited_shares
            .checked_sub(shares)
            .ok_or(LendingError::InsufficientBalance)?;
        Ok(shares)
    }

    /// Credit debt shares for `amount`, returning the shares minted.
    pub fn credit_borrow(&mut self, bank: &Bank, amount: u64) -> Result<u64, LendingError> {
        let shares = bank.borrow_shares_for(amount, Rounding::Up)?;
        if shares == 0 {
            return Err(LendingError::InvalidAmount);
        }

        let position = self.position_or_insert(&bank.mint)?;
        position.borrowed_shares = position
            .borrowed_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok(shares)
    }

    /// Retire debt, returning `(repaid_amount, shares_burned)`.
    ///
    /// Amounts at or above the outstanding debt are clamped to it and burn
    /// every debt share of the position.
    pub fn debit_repay(&mut self, bank: &Bank, amount: u64) -> Result<(u64, u64), LendingError> {
        let owned_shares = self
            .position(&bank.mint)
            .map(|p| p.borrowed_shares)
            .unwrap_or(0);
        if owned_shares == 0 {
            msg!("No outstanding debt to repay");
            return Err(LendingError::OverRepay);
        }

        let debt = bank.borrow_amount_for(owned_shares, Rounding::Up)?;
        let (repaid, shares) = if amount >= debt {
            (debt, owned_shares)
        } else {
            let shares = bank.borrow_shares_for(amount, Rounding::Down)?;
            if shares == 0 {
                msg!("Repay of {} retires no debt share", amount);
                return Err(LendingError::InvalidAmount);
            }
            (amount, shares)
        };

        let position = self
            .position_mut(&bank.mint)
            .ok_or(LendingError::OverRepay)?;
        position.borrowed_shares -= shares;
        Ok((repaid, shares))
    }

    /// Live amount of one side of the position through the bank's exchange rate.
    pub fn position_value(&self, bank: &Bank, side: Side) -> Result<u64, LendingError> {
        let position = match self.position(&bank.mint) {
            Some(position) => position,
            None => return Ok(0),
        };
        match side {
            Side::Deposit => bank.deposit_amount_for(position.deposited_shares, Rounding::Down),
            Side::Borrow => bank.borrow_amount_for(position.borrowed_shares, Rounding::Up),
        }
    }

    /// Refresh the amount snapshots for `bank` and drop empty positions.
    pub fn refresh_position(&mut self, bank: &Bank) -> Result<(), LendingError> {
        let deposited = self.position_value(bank, Side::Deposit)?;
        let borrowed = self.position_value(bank, Side::Borrow)?;
        if let Some(position) = self.position_mut(&bank.mint) {
            position.deposited_amount = deposited;
            position.borrowed_amount = borrowed;
        }
        self.prune();
        Ok(())
    }
}
