//! System program CPI helpers

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
};

/// Create a PDA owned by `owner` with `space` bytes, signed by `signer_seeds`.
///
/// Anyone can send lamports to a PDA address before it is created, which makes
/// `create_account` fail. An address that already holds lamports is topped up
/// to rent exemption, then allocated and assigned instead.
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    account: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    system_program: &AccountInfo<'a>,
    rent: &Rent,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    if system_program.key != &system_program::ID {
        return Err(ProgramError::IncorrectProgramId);
    }

    let required = rent.minimum_balance(space);
    let current = account.lamports();

    if current == 0 {
        return invoke_signed(
            &system_instruction::create_account(
                payer.key,
                account.key,
                required,
                space as u64,
                owner,
            ),
            &[payer.clone(), account.clone(), system_program.clone()],
            &[signer_seeds],
        );
    }

    msg!("Account {} is pre-funded with {} lamports", account.key, current);
    if current < required {
        invoke(
            &system_instruction::transfer(payer.key, account.key, required - current),
            &[payer.clone(), account.clone(), system_program.clone()],
        )?;
    }

    invoke_signed(
        &system_instruction::allocate(account.key, space as u64),
        &[account.clone(), system_program.clone()],
        &[signer_seeds],
    )?;

    invoke_signed(
        &system_instruction::assign(account.key, owner),
        &[account.clone(), system_program.clone()],
        &[signer_seeds],
    )
}
