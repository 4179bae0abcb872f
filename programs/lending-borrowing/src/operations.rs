//! Protocol operations
//!
//! Each operation stages the bank and user account it touches, applies the
//! ledger changes to the staged copies, checks the resulting state, runs the
//! token transfer and commits only when all of them succeeded.

use solana_program::{clock::UnixTimestamp, msg, pubkey::Pubkey};

use crate::{
    engine::CollateralEngine,
    error::LendingError,
    oracle::PriceOracle,
    state::{Bank, BankConfig, BankSetup, ProtocolConfig, UserAccount},
    token::TokenTransfer,
    transaction::Transaction,
};

pub fn init_config(
    slot: &mut Option<ProtocolConfig>,
    admin: Pubkey,
    oracle_program: Pubkey,
    bump: u8,
    now: UnixTimestamp,
) -> Result<(), LendingError> {
    if slot.is_some() {
        msg!("Protocol config already exists");
        return Err(LendingError::ConfigAlreadyExists);
    }

    let config = ProtocolConfig::new(admin, oracle_program, bump, now);
    config.validate()?;

    msg!("Protocol config initialized: admin {}, oracle program {}", admin, oracle_program);
    *slot = Some(config);
    Ok(())
}

/// List a bank. Only the protocol admin may do so.
pub fn init_bank(
    slot: &mut Option<Bank>,
    protocol: &ProtocolConfig,
    setup: BankSetup,
    deposit_rate: u64,
    borrow_rate: u64,
    config: BankConfig,
    now: UnixTimestamp,
) -> Result<(), LendingError> {
    if setup.authority != protocol.admin {
        msg!("{} is not the protocol admin", setup.authority);
        return Err(LendingError::Unauthorized);
    }

    if slot.is_some() {
        msg!("Bank for mint {} already exists", setup.mint);
        return Err(LendingError::BankAlreadyExists);
    }

    let bank = Bank::new(setup, deposit_rate, borrow_rate, config, now);
    bank.validate()?;

    msg!(
        "Bank initialized for mint {} (deposit rate {} bps, borrow rate {} bps, max LTV {} bps)",
        bank.mint,
        deposit_rate,
        borrow_rate,
        bank.config.max_ltv
    );
    *slot = Some(bank);
    Ok(())
}

pub fn init_user(
    slot: &mut Option<UserAccount>,
    owner: Pubkey,
    reference_mint: Pubkey,
    bump: u8,
    now: UnixTimestamp,
) -> Result<(), LendingError> {
    if slot.is_some() {
        msg!("User account for {} already exists", owner);
        return Err(LendingError::UserAlreadyExists);
    }

    *slot = Some(UserAccount::new(owner, reference_mint, bump, now));
    msg!("User account initialized for {}", owner);
    Ok(())
}

/// Deposit, withdraw, borrow and repay for one instruction's collaborators
pub struct Protocol<'a, O: PriceOracle, T: TokenTransfer> {
    oracle: &'a O,
    tokens: &'a mut T,
    now: UnixTimestamp,
}

impl<'a, O: PriceOracle, T: TokenTransfer> Protocol<'a, O, T> {
    pub fn new(oracle: &'a O, tokens: &'a mut T, now: UnixTimestamp) -> Self {
        Self { oracle, tokens, now }
    }

    /// Returns the deposit shares minted.
    pub fn deposit(
        &mut self,
        bank: &mut Bank,
        user: &mut UserAccount,
        user_token: &Pubkey,
        amount: u64,
    ) -> Result<u64, LendingError> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }

        let mut tx = Transaction::begin(bank, user);
        let (bank, user) = tx.staged();

        bank.accrue(self.now)?;
        let shares = user.credit_deposit(bank, amount)?;
        bank.record_deposit(amount, shares)?;
        user.refresh_position(bank)?;
        user.last_updated = self.now;

        self.tokens.transfer(user_token, &bank.treasury, amount)?;

        msg!("Deposited {} for {} shares", amount, shares);
        tx.commit();
        Ok(shares)
    }

    /// Returns the deposit shares burned.
    pub fn withdraw(
        &mut self,
        bank: &mut Bank,
        user: &mut UserAccount,
        other_banks: &[Bank],
        user_token: &Pubkey,
        amount: u64,
    ) -> Result<u64, LendingError> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }

        let mut tx = Transaction::begin(bank, user);
        let (bank, user) = tx.staged();

        bank.accrue(self.now)?;
        let shares = user.debit_withdraw(bank, amount)?;
        bank.record_withdraw(amount, shares)?;
        user.refresh_position(bank)?;
        user.last_updated = self.now;

        let others = accrue_others(other_banks, &bank.mint, self.now)?;
        {
            let engine = CollateralEngine::new(self.oracle, bank_view(bank, &others));
            engine.check_withdraw_allowed(user, bank)?;
        }

        self.tokens.transfer(&bank.treasury, user_token, amount)?;

        msg!("Withdrew {} burning {} shares", amount, shares);
        tx.commit();
        Ok(shares)
    }

    /// Returns the debt shares minted.
    pub fn borrow(
        &mut self,
        bank: &mut Bank,
        user: &mut UserAccount,
        other_banks: &[Bank],
        user_token: &Pubkey,
        amount: u64,
    ) -> Result<u64, LendingError> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }

        let mut tx = Transaction::begin(bank, user);
        let (bank, user) = tx.staged();

        bank.accrue(self.now)?;
        let shares = user.credit_borrow(bank, amount)?;
        bank.record_borrow(amount, shares)?;
        user.refresh_position(bank)?;
        user.last_updated = self.now;

        let others = accrue_others(other_banks, &bank.mint, self.now)?;
        {
            let engine = CollateralEngine::new(self.oracle, bank_view(bank, &others));
            engine.check_borrow_allowed(user, bank)?;
        }

        self.tokens.transfer(&bank.treasury, user_token, amount)?;

        msg!("Borrowed {} for {} debt shares", amount, shares);
        tx.commit();
        Ok(shares)
    }

    /// Returns the amount actually repaid, which is clamped to the debt.
    pub fn repay(
        &mut self,
        bank: &mut Bank,
        user: &mut UserAccount,
        user_token: &Pubkey,
        amount: u64,
    ) -> Result<u64, LendingError> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }

        let mut tx = Transaction::begin(bank, user);
        let (bank, user) = tx.staged();

        bank.accrue(self.now)?;
        let (repaid, shares) = user.debit_repay(bank, amount)?;
        bank.record_repay(repaid, shares)?;
        user.refresh_position(bank)?;
        user.last_updated = self.now;

        self.tokens.transfer(user_token, &bank.treasury, repaid)?;

        if repaid < amount {
            msg!("Repay of {} clamped to outstanding debt {}", amount, repaid);
        }
        msg!("Repaid {} burning {} debt shares", repaid, shares);
        tx.commit();
        Ok(repaid)
    }
}

/// Accrued copies of the banks an operation only reads, excluding `active`.
fn accrue_others(
    banks: &[Bank],
    active: &Pubkey,
    now: UnixTimestamp,
) -> Result<Vec<Bank>, LendingError> {
    banks
        .iter()
        .filter(|bank| bank.mint != *active)
        .map(|bank| bank.accrued(now))
        .collect()
}

fn bank_view<'b>(active: &'b Bank, others: &'b [Bank]) -> Vec<&'b Bank> {
    let mut banks: Vec<&Bank> = others.iter().collect();
    banks.push(active);
    banks
}
