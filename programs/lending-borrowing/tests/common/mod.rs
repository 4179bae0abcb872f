#![allow(dead_code)]

use std::collections::HashMap;

use lending_borrowing::{
    error::LendingError,
    operations::{self, Protocol},
    oracle::{AccountPriceOracle, PriceFeed},
    state::{Bank, BankConfig, BankSetup, ProtocolConfig, UserAccount},
    token::TokenTransfer,
};
use solana_program::pubkey::Pubkey;

/// Token balances held in memory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryTokens {
    pub balances: HashMap<Pubkey, u64>,
    pub fail_transfers: bool,
}

impl MemoryTokens {
    pub fn balance(&self, account: &Pubkey) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn mint_to(&mut self, account: &Pubkey, amount: u64) {
        *self.balances.entry(*account).or_insert(0) += amount;
    }
}

impl TokenTransfer for MemoryTokens {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), LendingError> {
        if self.fail_transfers || self.balance(from) < amount {
            return Err(LendingError::TransferError);
        }
        *self.balances.entry(*from).or_insert(0) -= amount;
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

/// One asset: its bank, price feed address and price
pub struct Asset {
    pub bank: Bank,
    pub feed: Pubkey,
    pub price: i64,
    pub publish_time: i64,
}

impl Asset {
    pub fn new(decimals: u8, deposit_rate: u64, borrow_rate: u64, price: i64, now: i64) -> Self {
        let feed = Pubkey::new_unique();
        let setup = BankSetup {
            authority: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            mint_decimals: decimals,
            treasury: Pubkey::new_unique(),
            bump: 255,
            treasury_bump: 254,
        };
        let protocol = ProtocolConfig::new(setup.authority, Pubkey::new_unique(), 255, now);
        let mut slot = None;
        operations::init_bank(
            &mut slot,
            &protocol,
            setup,
            deposit_rate,
            borrow_rate,
            BankConfig::new(feed),
            now,
        )
        .unwrap();
        Self {
            bank: slot.unwrap(),
            feed,
            price,
            publish_time: now,
        }
    }

    pub fn feed_account(&self) -> (Pubkey, PriceFeed) {
        (
            self.feed,
            PriceFeed::new(self.feed.to_bytes(), self.price, 0, -8, self.publish_time),
        )
    }
}

/// USDC at $1 with 6 decimals and SOL at $150 with 9 decimals
pub struct Market {
    pub usdc: Asset,
    pub sol: Asset,
    pub tokens: MemoryTokens,
    pub now: i64,
}

pub const START: i64 = 1_700_000_000;
pub const USDC_PRICE: i64 = 100_000_000;
pub const SOL_PRICE: i64 = 15_000_000_000;

impl Market {
    pub fn new() -> Self {
        Self {
            usdc: Asset::new(6, 1, 1, USDC_PRICE, START),
            sol: Asset::new(9, 1, 1, SOL_PRICE, START),
            tokens: MemoryTokens::default(),
            now: START,
        }
    }

    pub fn oracle(&self) -> AccountPriceOracle {
        AccountPriceOracle::new(
            vec![self.usdc.feed_account(), self.sol.feed_account()],
            self.now,
        )
    }

    /// Move the clock and republish both prices at the new time.
    pub fn advance(&mut self, seconds: i64) {
        self.now += seconds;
        self.usdc.publish_time = self.now;
        self.sol.publish_time = self.now;
    }

    pub fn new_user(&mut self) -> Wallet {
        let owner = Pubkey::new_unique();
        let mut slot = None;
        operations::init_user(&mut slot, owner, self.usdc.bank.mint, 255, self.now).unwrap();
        Wallet {
            account: slot.unwrap(),
            usdc: Pubkey::new_unique(),
            sol: Pubkey::new_unique(),
        }
    }

    pub fn deposit_usdc(&mut self, wallet: &mut Wallet, amount: u64) -> Result<u64, LendingError> {
        let oracle = self.oracle();
        Protocol::new(&oracle, &mut self.tokens, self.now).deposit(
            &mut self.usdc.bank,
            &mut wallet.account,
            &wallet.usdc,
            amount,
        )
    }

    pub fn deposit_sol(&mut self, wallet: &mut Wallet, amount: u64) -> Result<u64, LendingError> {
        let oracle = self.oracle();
        Protocol::new(&oracle, &mut self.tokens, self.now).deposit(
            &mut self.sol.bank,
            &mut wallet.account,
            &wallet.sol,
            amount,
        )
    }

    pub fn withdraw_usdc(&mut self, wallet: &mut Wallet, amount: u64) -> Result<u64, LendingError> {
        let oracle = self.oracle();
        let others = [self.sol.bank.clone()];
        Protocol::new(&oracle, &mut self.tokens, self.now).withdraw(
            &mut self.usdc.bank,
            &mut wallet.account,
            &others,
            &wallet.usdc,
            amount,
        )
    }

    pub fn withdraw_sol(&mut self, wallet: &mut Wallet, amount: u64) -> Result<u64, LendingError> {
        let oracle = self.oracle();
        let others = [self.usdc.bank.clone()];
        Protocol::new(&oracle, &mut self.tokens, self.now).withdraw(
            &mut self.sol.bank,
            &mut wallet.account,
            &others,
            &wallet.sol,
            amount,
        )
    }

    pub fn borrow_sol(&mut self, wallet: &mut Wallet, amount: u64) -> Result<u64, LendingError> {
        let oracle = self.oracle();
        let others = [self.usdc.bank.clone()];
        Protocol::new(&oracle, &mut self.tokens, self.now).borrow(
            &mut self.sol.bank,
            &mut wallet.account,
            &others,
            &wallet.sol,
            amount,
        )
    }

    pub fn borrow_usdc(&mut self, wallet: &mut Wallet, amount: u64) -> Result<u64, LendingError> {
        let oracle = self.oracle();
        let others = [self.sol.bank.clone()];
        Protocol::new(&oracle, &mut self.tokens, self.now).borrow(
            &mut self.usdc.bank,
            &mut wallet.account,
            &others,
            &wallet.usdc,
            amount,
        )
    }

    pub fn repay_sol(&mut self, wallet: &mut Wallet, amount: u64) -> Result<u64, LendingError> {
        let oracle = self.oracle();
        Protocol::new(&oracle, &mut self.tokens, self.now).repay(
            &mut self.sol.bank,
            &mut wallet.account,
            &wallet.sol,
            amount,
        )
    }

    /// Fund a second user's SOL deposit so the SOL bank has liquidity to lend.
    pub fn seed_sol_liquidity(&mut self, amount: u64) -> Wallet {
        let mut provider = self.new_user();
        self.tokens.mint_to(&provider.sol, amount);
        self.deposit_sol(&mut provider, amount).unwrap();
        provider
    }

    pub fn snapshot(&self, wallet: &Wallet) -> (Bank, Bank, UserAccount, MemoryTokens) {
        (
            self.usdc.bank.clone(),
            self.sol.bank.clone(),
            wallet.account.clone(),
            self.tokens.clone(),
        )
    }
}

/// A user account together with its token accounts
pub struct Wallet {
    pub account: UserAccount,
    pub usdc: Pubkey,
    pub sol: Pubkey,
}
