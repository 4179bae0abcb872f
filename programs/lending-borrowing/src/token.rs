//! Token movement between user token accounts and bank treasuries

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    pubkey::Pubkey,
};
use spl_token::instruction as token_instruction;

use crate::{
    error::LendingError,
    pda::{with_bump, BankPDA},
};

/// Moves `amount` tokens between two token accounts of the same mint
pub trait TokenTransfer {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), LendingError>;
}

/// SPL Token CPI for the accounts of one instruction.
///
/// Transfers out of the owner's token account are authorized by the owner's
/// signature; transfers out of the treasury are signed by the bank PDA.
pub struct SplTokenTransfer<'a, 'info> {
    pub token_program: &'a AccountInfo<'info>,
    pub owner: &'a AccountInfo<'info>,
    pub owner_token: &'a AccountInfo<'info>,
    pub bank: &'a AccountInfo<'info>,
    pub treasury: &'a AccountInfo<'info>,
    pub mint: Pubkey,
    pub bank_bump: u8,
}

impl<'a, 'info> SplTokenTransfer<'a, 'info> {
    fn transfer_from_owner(&self, amount: u64) -> ProgramResult {
        let instruction = token_instruction::transfer(
            self.token_program.key,
            self.owner_token.key,
            self.treasury.key,
            self.owner.key,
            &[],
            amount,
        )?;
        invoke(
            &instruction,
            &[
                self.owner_token.clone(),
                self.treasury.clone(),
                self.owner.clone(),
                self.token_program.clone(),
            ],
        )
    }

    fn transfer_from_treasury(&self, amount: u64) -> ProgramResult {
        let instruction = token_instruction::transfer(
            self.token_program.key,
            self.treasury.key,
            self.owner_token.key,
            self.bank.key,
            &[],
            amount,
        )?;
        let signer_seeds = with_bump(BankPDA::seeds(&self.mint), self.bank_bump);
        let signer: Vec<&[u8]> = signer_seeds.iter().map(Vec::as_slice).collect();
        invoke_signed(
            &instruction,
            &[
                self.treasury.clone(),
                self.owner_token.clone(),
                self.bank.clone(),
                self.token_program.clone(),
            ],
            &[&signer[..]],
        )
    }
}

impl<'a, 'info> TokenTransfer for SplTokenTransfer<'a, 'info> {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), LendingError> {
        if amount == 0 {
            return Ok(());
        }

        let result = if from == self.owner_token.key && to == self.treasury.key {
            self.transfer_from_owner(amount)
        } else if from == self.treasury.key && to == self.owner_token.key {
            self.transfer_from_treasury(amount)
        } else {
            msg!("Unsupported transfer route {} -> {}", from, to);
            return Err(LendingError::TransferError);
        };

        result.map_err(|err| {
            msg!("Token transfer of {} failed: {}", amount, err);
            LendingError::TransferError
        })
    }
}
