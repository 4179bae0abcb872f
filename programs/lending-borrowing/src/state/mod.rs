pub mod bank;
pub mod protocol_config;
pub mod user_account;

pub use bank::*;
pub use protocol_config::*;
pub use user_account::*;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{entrypoint::ProgramResult, msg, program_error::ProgramError};

use crate::error::LendingError;

/// Account discriminator size (8 bytes like Anchor)
pub const DISCRIMINATOR_SIZE: usize = 8;

/// Borsh-encoded program account with a leading discriminator.
///
/// Accounts are allocated at `LEN` bytes so the encoded state is a prefix of
/// the account data; the tail is zero padding left for growth.
pub trait ProgramAccount: BorshSerialize + BorshDeserialize + Sized {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_SIZE];
    const LEN: usize;

    /// True when the data starts with this account type's discriminator.
    fn is_initialized(data: &[u8]) -> bool {
        data.len() >= DISCRIMINATOR_SIZE && data[..DISCRIMINATOR_SIZE] == Self::DISCRIMINATOR
    }

    fn load(data: &[u8]) -> Result<Self, ProgramError> {
        if !Self::is_initialized(data) {
            msg!("Invalid account discriminator");
            return Err(LendingError::InvalidAccountData.into());
        }
        let mut slice: &[u8] = data;
        Ok(Self::deserialize(&mut slice)?)
    }

    /// `None` for empty or zeroed data, used by the init paths.
    fn load_optional(data: &[u8]) -> Result<Option<Self>, ProgramError> {
        if data.iter().all(|b| *b == 0) {
            return Ok(None);
        }
        Self::load(data).map(Some)
    }

    fn save(&self, data: &mut [u8]) -> ProgramResult {
        self.serialize(&mut &mut data[..])?;
        Ok(())
    }
}
