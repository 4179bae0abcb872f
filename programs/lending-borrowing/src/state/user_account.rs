use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::{
    constants::MAX_POSITIONS,
    error::LendingError,
    state::{ProgramAccount, DISCRIMINATOR_SIZE},
};

/// Per-participant collateral and debt positions
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Bump of the user PDA
    pub bump: u8,

    /// Controlling signer
    pub owner: Pubkey,

    /// Mint recorded at creation for client display
    pub reference_mint: Pubkey,

    /// One entry per asset with a non-zero share balance
    pub positions: Vec<Position>,

    /// Last time any operation touched this account
    pub last_updated: UnixTimestamp,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub mint: Pubkey,

    /// Snapshot of the deposit value at the last touch
    pub deposited_amount: u64,
    pub deposited_shares: u64,

    /// Snapshot of the debt value at the last touch
    pub borrowed_amount: u64,
    pub borrowed_shares: u64,
}

impl ProgramAccount for UserAccount {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_SIZE] = [76, 69, 78, 68, 85, 83, 69, 82]; // "LENDUSER"

    const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        1 + // bump
        32 + // owner
        32 + // reference_mint
        4 + (MAX_POSITIONS * Position::LEN) + // positions vec
        8 + // last_updated
        64; // padding
}

impl Position {
    pub const LEN: usize = 32 + 8 + 8 + 8 + 8;

    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            deposited_amount: 0,
            deposited_shares: 0,
            borrowed_amount: 0,
            borrowed_shares: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deposited_shares == 0 && self.borrowed_shares == 0
    }
}

impl UserAccount {
    pub fn new(owner: Pubkey, reference_mint: Pubkey, bump: u8, now: UnixTimestamp) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            bump,
            owner,
            reference_mint,
            positions: Vec::new(),
            last_updated: now,
        }
    }

    pub fn position(&self, mint: &Pubkey) -> Option<&Position> {
        self.positions.iter().find(|p| p.mint == *mint)
    }

    pub fn position_mut(&mut self, mint: &Pubkey) -> Option<&mut Position> {
        self.positions.iter_mut().find(|p| p.mint == *mint)
    }

    /// Existing position for `mint`, or a new empty one if a slot is free.
    pub fn position_or_insert(&mut self, mint: &Pubkey) -> Result<&mut Position, LendingError> {
        if let Some(index) = self.positions.iter().position(|p| p.mint == *mint) {
            return Ok(&mut self.positions[index]);
        }
        if self.positions.len() >= MAX_POSITIONS {
            return Err(LendingError::TooManyPositions);
        }
        self.positions.push(Position::new(*mint));
        let last = self.positions.len() - 1;
        Ok(&mut self.positions[last])
    }

    /// Drop positions that no longer hold any shares.
    pub fn prune(&mut self) {
        self.positions.retain(|p| !p.is_empty());
    }

    pub fn has_debt(&self) -> bool {
        self.positions.iter().any(|p| p.borrowed_shares > 0)
    }

    pub fn validate(&self) -> Result<(), LendingError> {
        if self.discriminator != Self::DISCRIMINATOR || !self.is_initialized {
            return Err(LendingError::InvalidAccountData);
        }
        if self.positions.len() > MAX_POSITIONS {
            return Err(LendingError::InvalidAccountData);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_account_fits_allocated_len() {
        let mut user = UserAccount::new(Pubkey::new_unique(), Pubkey::new_unique(), 255, 0);
        for _ in 0..MAX_POSITIONS {
            let position = user.position_or_insert(&Pubkey::new_unique()).unwrap();
            position.deposited_shares = u64::MAX;
            position.borrowed_shares = u64::MAX;
        }

        let mut data = vec![0u8; UserAccount::LEN];
        user.save(&mut data).unwrap();
        assert_eq!(UserAccount::load(&data).unwrap(), user);
    }

    #[test]
    fn test_position_limit() {
        let mut user = UserAccount::new(Pubkey::new_unique(), Pubkey::new_unique(), 255, 0);
        for _ in 0..MAX_POSITIONS {
            user.position_or_insert(&Pubkey::new_unique()).unwrap();
        }
        assert_eq!(
            user.position_or_insert(&Pubkey::new_unique()).unwrap_err(),
            LendingError::TooManyPositions
        );

        // Existing mints still resolve when full
        let mint = user.positions[0].mint;
        assert!(user.position_or_insert(&mint).is_ok());
    }

    #[test]
    fn test_prune_removes_empty_positions() {
        let mut user = UserAccount::new(Pubkey::new_unique(), Pubkey::new_unique(), 255, 0);
        let kept = Pubkey::new_unique();
        user.position_or_insert(&kept).unwrap().deposited_shares = 10;
        user.position_or_insert(&Pubkey::new_unique()).unwrap();

        user.prune();

        assert_eq!(user.positions.len(), 1);
        assert_eq!(user.positions[0].mint, kept);
        assert!(!user.has_debt());
    }
}
