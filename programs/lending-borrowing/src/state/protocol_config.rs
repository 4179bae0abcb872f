use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::{
    error::LendingError,
    state::{ProgramAccount, DISCRIMINATOR_SIZE},
};

/// Program-wide settings, one per deployment
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Bump of the config PDA
    pub bump: u8,

    /// The only signer allowed to list banks
    pub admin: Pubkey,

    /// Program that owns every trusted price feed account
    pub oracle_program: Pubkey,

    pub created_at: UnixTimestamp,
}

impl ProgramAccount for ProtocolConfig {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_SIZE] = [76, 69, 78, 68, 67, 79, 78, 70]; // "LENDCONF"

    const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        1 + // bump
        32 + // admin
        32 + // oracle_program
        8 + // created_at
        32; // padding
}

impl ProtocolConfig {
    pub fn new(admin: Pubkey, oracle_program: Pubkey, bump: u8, now: UnixTimestamp) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            bump,
            admin,
            oracle_program,
            created_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), LendingError> {
        if self.discriminator != Self::DISCRIMINATOR || !self.is_initialized {
            return Err(LendingError::InvalidAccountData);
        }
        if self.oracle_program == Pubkey::default() {
            return Err(LendingError::InvalidConfiguration);
        }
        Ok(())
    }
}
