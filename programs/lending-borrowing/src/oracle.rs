//! Price feed reader
//!
//! Feeds are Pyth-style accounts holding a signed price with a decimal
//! exponent, a confidence interval and a publish time. Each bank pins the
//! address of its feed in `BankConfig::price_feed`.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{account_info::AccountInfo, clock::UnixTimestamp, msg, pubkey::Pubkey};

use crate::{
    constants::{BPS, MAX_CONFIDENCE_BPS},
    error::LendingError,
    state::{ProgramAccount, DISCRIMINATOR_SIZE},
};

/// Validated price of one asset unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: i64,
    pub confidence: u64,
    pub exponent: i32,
    pub publish_time: UnixTimestamp,
}

/// On-chain layout of a price feed account
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PriceFeed {
    pub discriminator: [u8; 8],
    pub feed_id: [u8; 32],
    pub price: i64,
    pub confidence: u64,
    pub exponent: i32,
    pub publish_time: UnixTimestamp,
}

impl ProgramAccount for PriceFeed {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_SIZE] = [80, 82, 73, 67, 69, 70, 69, 68]; // "PRICEFED"

    const LEN: usize = 8 + // discriminator
        32 + // feed_id
        8 + // price
        8 + // confidence
        4 + // exponent
        8; // publish_time
}

impl PriceFeed {
    pub fn new(feed_id: [u8; 32], price: i64, confidence: u64, exponent: i32, publish_time: UnixTimestamp) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            feed_id,
            price,
            confidence,
            exponent,
            publish_time,
        }
    }

    pub fn quote(&self) -> PriceQuote {
        PriceQuote {
            price: self.price,
            confidence: self.confidence,
            exponent: self.exponent,
            publish_time: self.publish_time,
        }
    }
}

/// Source of validated price quotes
pub trait PriceOracle {
    /// Quote for `feed`, rejected when older than `max_staleness` seconds.
    fn read_price(&self, feed: &Pubkey, max_staleness: u64) -> Result<PriceQuote, LendingError>;
}

/// Check a raw quote against the current time and the confidence bound.
pub fn validate_quote(
    quote: &PriceQuote,
    now: UnixTimestamp,
    max_staleness: u64,
) -> Result<(), LendingError> {
    if quote.price <= 0 {
        msg!("Invalid oracle price: {}", quote.price);
        return Err(LendingError::InvalidPrice);
    }

    let age = now.saturating_sub(quote.publish_time);
    if age > 0 && age as u64 > max_staleness {
        msg!("Price data is stale: {}s old, max {}s", age, max_staleness);
        return Err(LendingError::StalePrice);
    }

    let max_confidence = (quote.price as u128) * MAX_CONFIDENCE_BPS as u128;
    if (quote.confidence as u128) * BPS as u128 > max_confidence {
        msg!(
            "Price confidence {} too wide for price {}",
            quote.confidence,
            quote.price
        );
        return Err(LendingError::PriceConfidenceTooWide);
    }

    Ok(())
}

/// Oracle backed by the feed accounts passed to an instruction
pub struct AccountPriceOracle {
    feeds: Vec<(Pubkey, PriceFeed)>,
    now: UnixTimestamp,
}

impl AccountPriceOracle {
    pub fn new(feeds: Vec<(Pubkey, PriceFeed)>, now: UnixTimestamp) -> Self {
        Self { feeds, now }
    }

    /// Collect every account carrying the feed discriminator, skipping others.
    ///
    /// A feed account must be owned by `oracle_program`; anything else that
    /// looks like a feed is rejected rather than skipped.
    pub fn from_accounts(
        accounts: &[AccountInfo],
        oracle_program: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<Self, LendingError> {
        let mut feeds = Vec::new();
        for account in accounts {
            let data = account
                .try_borrow_data()
                .map_err(|_| LendingError::InvalidAccountData)?;
            if !PriceFeed::is_initialized(&data) {
                continue;
            }
            if account.owner != oracle_program {
                msg!(
                    "Price feed {} is owned by {}, expected {}",
                    account.key,
                    account.owner,
                    oracle_program
                );
                return Err(LendingError::UntrustedPriceFeed);
            }
            let feed = PriceFeed::load(&data).map_err(|_| LendingError::InvalidAccountData)?;
            feeds.push((*account.key, feed));
        }
        Ok(Self::new(feeds, now))
    }
}

impl PriceOracle for AccountPriceOracle {
    fn read_price(&self, feed: &Pubkey, max_staleness: u64) -> Result<PriceQuote, LendingError> {
        let (_, account) = self
            .feeds
            .iter()
            .find(|(key, _)| key == feed)
            .ok_or_else(|| {
                msg!("Price feed {} not provided", feed);
                LendingError::PriceFeedMissing
            })?;

        let quote = account.quote();
        validate_quote(&quote, self.now, max_staleness)?;
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: i64, confidence: u64, publish_time: i64) -> PriceQuote {
        PriceQuote {
            price,
            confidence,
            exponent: -8,
            publish_time,
        }
    }

    #[test]
    fn test_quote_validation() {
        assert!(validate_quote(&quote(100_000_000, 0, 1_000), 1_060, 60).is_ok());
        assert_eq!(
            validate_quote(&quote(100_000_000, 0, 1_000), 1_061, 60),
            Err(LendingError::StalePrice)
        );
        assert_eq!(
            validate_quote(&quote(0, 0, 1_000), 1_000, 60),
            Err(LendingError::InvalidPrice)
        );
        assert_eq!(
            validate_quote(&quote(-5, 0, 1_000), 1_000, 60),
            Err(LendingError::InvalidPrice)
        );
        // 5% confidence is accepted, anything wider is not
        assert!(validate_quote(&quote(100_000_000, 5_000_000, 1_000), 1_000, 60).is_ok());
        assert_eq!(
            validate_quote(&quote(100_000_000, 5_000_001, 1_000), 1_000, 60),
            Err(LendingError::PriceConfidenceTooWide)
        );
        // Quotes published ahead of the local clock are not stale
        assert!(validate_quote(&quote(100_000_000, 0, 2_000), 1_000, 60).is_ok());
    }

    #[test]
    fn test_account_oracle_lookup() {
        let key = Pubkey::new_unique();
        let feed = PriceFeed::new([7u8; 32], 15_000_000_000, 1_000_000, -8, 500);
        let oracle = AccountPriceOracle::new(vec![(key, feed)], 510);

        let quote = oracle.read_price(&key, 100).unwrap();
        assert_eq!(quote.price, 15_000_000_000);
        assert_eq!(quote.exponent, -8);

        assert_eq!(
            oracle.read_price(&Pubkey::new_unique(), 100),
            Err(LendingError::PriceFeedMissing)
        );
        assert_eq!(oracle.read_price(&key, 5), Err(LendingError::StalePrice));
    }

    #[test]
    fn test_feed_accounts_must_belong_to_the_oracle_program() {
        let oracle_program = Pubkey::new_unique();
        let feed_key = Pubkey::new_unique();
        let other_key = Pubkey::new_unique();

        let mut feed_data = vec![0u8; PriceFeed::LEN];
        PriceFeed::new([3u8; 32], 100_000_000, 0, -8, 1_000)
            .save(&mut feed_data)
            .unwrap();
        let mut feed_lamports = 1;
        let mut other_data = vec![0u8; 16];
        let mut other_lamports = 1;

        let feed = AccountInfo::new(
            &feed_key,
            false,
            false,
            &mut feed_lamports,
            &mut feed_data,
            &oracle_program,
            false,
            0,
        );
        let unrelated = AccountInfo::new(
            &other_key,
            false,
            false,
            &mut other_lamports,
            &mut other_data,
            &other_key,
            false,
            0,
        );

        let accounts = [feed.clone(), unrelated];
        let oracle = AccountPriceOracle::from_accounts(&accounts, &oracle_program, 1_000).unwrap();
        assert_eq!(oracle.read_price(&feed_key, 100).unwrap().price, 100_000_000);

        let impostor_program = Pubkey::new_unique();
        assert!(matches!(
            AccountPriceOracle::from_accounts(&[feed], &impostor_program, 1_000),
            Err(LendingError::UntrustedPriceFeed)
        ));
    }

    #[test]
    fn test_feed_account_layout() {
        let feed = PriceFeed::new([1u8; 32], 1, 0, -6, 42);
        let mut data = vec![0u8; PriceFeed::LEN];
        feed.save(&mut data).unwrap();
        assert_eq!(PriceFeed::load(&data).unwrap(), feed);
    }
}
