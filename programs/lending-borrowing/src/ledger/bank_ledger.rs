//! Pool-level bookkeeping: accrual, share conversion and totals

use solana_program::{clock::UnixTimestamp, msg};

use crate::{
    constants::{BPS, SECONDS_PER_YEAR},
    error::LendingError,
    math::{mul_div, mul_div_u64, to_u64, Rounding},
    state::Bank,
};

/// Interest applied by a single accrual step
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    pub deposit_interest: u64,
    pub borrow_interest: u64,
}

impl Bank {
    /// Apply interest for the time elapsed since the last update.
    ///
    /// Borrowers are charged `borrow_interest_rate`, depositors are credited
    /// `deposit_interest_rate` but never more than borrowers were charged, and
    /// debt never grows past deposits. The spread goes to `total_reserves`.
    /// Both sides round down so that frequent accruals never charge dust.
    pub fn accrue(&mut self, now: UnixTimestamp) -> Result<Accrual, LendingError> {
        let elapsed = now.saturating_sub(self.last_update_timestamp);
        if elapsed <= 0 {
            return Ok(Accrual::default());
        }

        let denominator = BPS as u128 * SECONDS_PER_YEAR as u128;

        let borrow_interest = mul_div(
            self.total_borrowed as u128 * self.borrow_interest_rate as u128,
            elapsed as u128,
            denominator,
            Rounding::Down,
        )?;
        let deposit_interest = mul_div(
            self.total_deposited as u128 * self.deposit_interest_rate as u128,
            elapsed as u128,
            denominator,
            Rounding::Down,
        )?
        .min(borrow_interest);

        let headroom = (self.available_liquidity() as u128) + deposit_interest;
        let borrow_interest = borrow_interest.min(headroom);

        let deposit_interest = to_u64(deposit_interest)?;
        let borrow_interest = to_u64(borrow_interest)?;

        self.total_deposited = self
            .total_deposited
            .checked_add(deposit_interest)
            .ok_or(LendingError::ArithmeticOverflow)?;
        self.total_borrowed = self
            .total_borrowed
            .checked_add(borrow_interest)
            .ok_or(LendingError::ArithmeticOverflow)?;
        self.total_reserves = self
            .total_reserves
            .checked_add(borrow_interest - deposit_interest)
            .ok_or(LendingError::ArithmeticOverflow)?;
        self.last_update_timestamp = now;

        if borrow_interest > 0 {
            msg!(
                "Accrued {} borrow / {} deposit interest over {}s",
                borrow_interest,
                deposit_interest,
                elapsed
            );
        }

        Ok(Accrual {
            deposit_interest,
            borrow_interest,
        })
    }

    /// Accrued copy of the bank, used to value banks that are only read.
    pub fn accrued(&self, now: UnixTimestamp) -> Result<Bank, LendingError> {
        let mut bank = self.clone();
        bank.accrue(now)?;
        Ok(bank)
    }

    pub fn deposit_shares_for(&self, amount: u64, rounding: Rounding) -> Result<u64, LendingError> {
        if self.total_deposit_shares == 0 || self.total_deposited == 0 {
            return Ok(amount);
        }
        mul_div_u64(amount, self.total_deposit_shares, self.total_deposited, rounding)
    }

    pub fn deposit_amount_for(&self, shares: u64, rounding: Rounding) -> Result<u64, LendingError> {
        if self.total_deposit_shares == 0 {
            return Ok(shares);
        }
        mul_div_u64(shares, self.total_deposited, self.total_deposit_shares, rounding)
    }

    pub fn borrow_shares_for(&self, amount: u64, rounding: Rounding) -> Result<u64, LendingError> {
        if self.total_borrow_shares == 0 || self.total_borrowed == 0 {
            return Ok(amount);
        }
        mul_div_u64(amount, self.total_borrow_shares, self.total_borrowed, rounding)
    }

    pub fn borrow_amount_for(&self, shares: u64, rounding: Rounding) -> Result<u64, LendingError> {
        if self.total_borrow_shares == 0 {
            return Ok(shares);
        }
        mul_div_u64(shares, self.total_borrowed, self.total_borrow_shares, rounding)
    }

    pub fn record_deposit(&mut self, amount: u64, shares: u64) -> Result<(), LendingError> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;
        self.total_deposit_shares = self
            .total_deposit_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_withdraw(&mut self, amount: u64, shares: u64) -> Result<(), LendingError> {
        if amount > self.available_liquidity() {
            msg!(
                "Withdraw of {} exceeds available liquidity {}",
                amount,
                self.available_liquidity()
            );
            return Err(LendingError::InsufficientLiquidity);
        }
        self.total_deposited -= amount;
        self.total_deposit_shares = self
            .total_deposit_shares
            .checked_sub(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_borrow(&mut self, amount: u64, shares: u64) -> Result<(), LendingError> {
        if amount > self.available_liquidity() {
            msg!(
                "Borrow of {} exceeds available liquidity {}",
                amount,
                self.available_liquidity()
            );
            return Err(LendingError::InsufficientLiquidity);
        }
        self.total_borrowed += amount;
        self.total_borrow_shares = self
            .total_borrow_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_repay(&mut self, amount: u64, shares: u64) -> Result<(), LendingError> {
        self.total_borrowed = self
            .total_borrowed
            .checked_sub(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;
        self.total_borrow_shares = self
            .total_borrow_shares
            .checked_sub(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok(())
    }
}
