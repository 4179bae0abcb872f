use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program, sysvar,
};

use crate::{
    pda::{BankPDA, ConfigPDA, TreasuryPDA, UserPDA},
    state::BankConfig,
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum LendingInstruction {
    /// Create the bank and treasury for a mint
    /// Accounts:
    /// 0. `[signer, writable]` Authority (payer)
    /// 1. `[]` Mint
    /// 2. `[writable]` Bank PDA
    /// 3. `[writable]` Treasury PDA
    /// 4. `[]` Token program
    /// 5. `[]` System program
    /// 6. `[]` Rent sysvar
    /// 7. `[]` Protocol config PDA
    InitBank {
        deposit_rate: u64,
        borrow_rate: u64,
        config: BankConfig,
    },

    /// Create the caller's user account
    /// Accounts:
    /// 0. `[signer, writable]` Owner (payer)
    /// 1. `[writable]` User PDA
    /// 2. `[]` System program
    InitUser { reference_mint: Pubkey },

    /// Deposit collateral
    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[]` Mint
    /// 2. `[writable]` Bank PDA
    /// 3. `[writable]` Treasury PDA
    /// 4. `[writable]` User PDA
    /// 5. `[writable]` Owner token account
    /// 6. `[]` Token program
    /// 7. `[]` Protocol config PDA
    Deposit { amount: u64 },

    /// Withdraw collateral
    /// Accounts: as `Deposit`, followed by the price feed of every asset the
    /// user holds and the bank of every other asset the user holds.
    /// Feeds must be owned by the configured oracle program.
    Withdraw { amount: u64 },

    /// Borrow against collateral
    /// Accounts: as `Withdraw`
    Borrow { amount: u64 },

    /// Repay debt, clamped to the outstanding amount
    /// Accounts: as `Deposit`
    Repay { amount: u64 },

    /// Create the protocol config; the signer becomes the admin
    /// Accounts:
    /// 0. `[signer, writable]` Admin (payer)
    /// 1. `[writable]` Protocol config PDA
    /// 2. `[]` System program
    InitConfig { oracle_program: Pubkey },
}

impl LendingInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&variant, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match variant {
            0 => {
                let payload = InitBankPayload::try_from_slice(rest)?;
                Self::InitBank {
                    deposit_rate: payload.deposit_rate,
                    borrow_rate: payload.borrow_rate,
                    config: payload.config,
                }
            }
            1 => {
                let payload = InitUserPayload::try_from_slice(rest)?;
                Self::InitUser {
                    reference_mint: payload.reference_mint,
                }
            }
            2 => Self::Deposit {
                amount: AmountPayload::try_from_slice(rest)?.amount,
            },
            3 => Self::Withdraw {
                amount: AmountPayload::try_from_slice(rest)?.amount,
            },
            4 => Self::Borrow {
                amount: AmountPayload::try_from_slice(rest)?.amount,
            },
            5 => Self::Repay {
                amount: AmountPayload::try_from_slice(rest)?.amount,
            },
            6 => Self::InitConfig {
                oracle_program: InitConfigPayload::try_from_slice(rest)?.oracle_program,
            },
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct InitBankPayload {
    deposit_rate: u64,
    borrow_rate: u64,
    config: BankConfig,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct InitUserPayload {
    reference_mint: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct InitConfigPayload {
    oracle_program: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct AmountPayload {
    amount: u64,
}

// Helper functions to create instructions
pub fn init_bank(
    program_id: &Pubkey,
    authority: &Pubkey,
    mint: &Pubkey,
    deposit_rate: u64,
    borrow_rate: u64,
    config: BankConfig,
) -> Result<Instruction, ProgramError> {
    let (bank, _) = BankPDA::derive(program_id, mint);
    let (treasury, _) = TreasuryPDA::derive(program_id, mint);

    let accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bank, false),
        AccountMeta::new(treasury, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(ConfigPDA::derive(program_id).0, false),
    ];

    let data = LendingInstruction::InitBank {
        deposit_rate,
        borrow_rate,
        config,
    };

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: data.try_to_vec()?,
    })
}

pub fn init_user(
    program_id: &Pubkey,
    owner: &Pubkey,
    reference_mint: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let (user, _) = UserPDA::derive(program_id, owner);

    let accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(user, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    let data = LendingInstruction::InitUser {
        reference_mint: *reference_mint,
    };

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: data.try_to_vec()?,
    })
}

pub fn init_config(
    program_id: &Pubkey,
    admin: &Pubkey,
    oracle_program: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let (config, _) = ConfigPDA::derive(program_id);

    let accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new(config, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    let data = LendingInstruction::InitConfig {
        oracle_program: *oracle_program,
    };

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: data.try_to_vec()?,
    })
}

fn asset_accounts(program_id: &Pubkey, owner: &Pubkey, mint: &Pubkey, owner_token: &Pubkey) -> Vec<AccountMeta> {
    let (bank, _) = BankPDA::derive(program_id, mint);
    let (treasury, _) = TreasuryPDA::derive(program_id, mint);
    let (user, _) = UserPDA::derive(program_id, owner);

    vec![
        AccountMeta::new_readonly(*owner, true),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bank, false),
        AccountMeta::new(treasury, false),
        AccountMeta::new(user, false),
        AccountMeta::new(*owner_token, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(ConfigPDA::derive(program_id).0, false),
    ]
}

pub fn deposit(
    program_id: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    owner_token: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: asset_accounts(program_id, owner, mint, owner_token),
        data: LendingInstruction::Deposit { amount }.try_to_vec()?,
    })
}

pub fn repay(
    program_id: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    owner_token: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: asset_accounts(program_id, owner, mint, owner_token),
        data: LendingInstruction::Repay { amount }.try_to_vec()?,
    })
}

/// `price_feeds` and `other_mints` cover every asset the user holds; the
/// banks of `other_mints` are derived here.
pub fn withdraw(
    program_id: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    owner_token: &Pubkey,
    price_feeds: &[Pubkey],
    other_mints: &[Pubkey],
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let accounts = priced_accounts(program_id, owner, mint, owner_token, price_feeds, other_mints);
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: LendingInstruction::Withdraw { amount }.try_to_vec()?,
    })
}

pub fn borrow(
    program_id: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    owner_token: &Pubkey,
    price_feeds: &[Pubkey],
    other_mints: &[Pubkey],
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let accounts = priced_accounts(program_id, owner, mint, owner_token, price_feeds, other_mints);
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: LendingInstruction::Borrow { amount }.try_to_vec()?,
    })
}

fn priced_accounts(
    program_id: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    owner_token: &Pubkey,
    price_feeds: &[Pubkey],
    other_mints: &[Pubkey],
) -> Vec<AccountMeta> {
    let mut accounts = asset_accounts(program_id, owner, mint, owner_token);
    accounts.extend(
        price_feeds
            .iter()
            .map(|feed| AccountMeta::new_readonly(*feed, false)),
    );
    accounts.extend(
        other_mints
            .iter()
            .map(|other| AccountMeta::new_readonly(BankPDA::derive(program_id, other).0, false)),
    );
    accounts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_unpack_to_the_same_instruction() {
        let program_id = crate::id();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let ix = init_bank(&program_id, &owner, &mint, 1, 1, BankConfig::new(Pubkey::new_unique())).unwrap();
        assert!(matches!(
            LendingInstruction::unpack(&ix.data).unwrap(),
            LendingInstruction::InitBank { deposit_rate: 1, borrow_rate: 1, .. }
        ));

        let feed = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let ix = borrow(&program_id, &owner, &mint, &Pubkey::new_unique(), &[feed], &[other], 2).unwrap();
        assert_eq!(LendingInstruction::unpack(&ix.data).unwrap(), LendingInstruction::Borrow { amount: 2 });
        assert_eq!(ix.accounts.len(), 10);
        assert_eq!(ix.accounts[7].pubkey, ConfigPDA::derive(&program_id).0);
        assert_eq!(ix.accounts[8].pubkey, feed);
        assert_eq!(ix.accounts[9].pubkey, BankPDA::derive(&program_id, &other).0);

        let oracle_program = Pubkey::new_unique();
        let ix = init_config(&program_id, &owner, &oracle_program).unwrap();
        assert_eq!(
            LendingInstruction::unpack(&ix.data).unwrap(),
            LendingInstruction::InitConfig { oracle_program }
        );
    }

    #[test]
    fn test_unpack_rejects_unknown_or_short_input() {
        assert_eq!(LendingInstruction::unpack(&[]), Err(ProgramError::InvalidInstructionData));
        assert_eq!(LendingInstruction::unpack(&[9, 0]), Err(ProgramError::InvalidInstructionData));
        assert!(LendingInstruction::unpack(&[2, 1, 0]).is_err());
    }
}
