//! Account checks shared by the instruction handlers

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{error::LendingError, state::ProgramAccount};

/// Validate that an account is a signer
pub fn validate_signer(account: &AccountInfo) -> ProgramResult {
    if !account.is_signer {
        msg!("Account {} must be a signer", account.key);
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

/// Validate that an account is writable
pub fn validate_writable(account: &AccountInfo) -> ProgramResult {
    if !account.is_writable {
        msg!("Account {} must be writable", account.key);
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

/// Validate that an account is owned by the expected program
pub fn validate_owner(account: &AccountInfo, expected_owner: &Pubkey) -> ProgramResult {
    if account.owner != expected_owner {
        msg!(
            "Account owner mismatch. Expected: {}, Actual: {}",
            expected_owner,
            account.owner
        );
        return Err(ProgramError::IllegalOwner);
    }
    Ok(())
}

pub fn validate_token_program(account: &AccountInfo) -> ProgramResult {
    if *account.key != spl_token::id() {
        msg!("Expected the SPL Token program, got {}", account.key);
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

/// Validate PDA derivation, returning the bump
pub fn validate_pda(account: &AccountInfo, program_id: &Pubkey, seeds: &[&[u8]]) -> Result<u8, ProgramError> {
    let (expected_key, bump) = Pubkey::find_program_address(seeds, program_id);

    if account.key != &expected_key {
        msg!("PDA mismatch. Expected: {}, Actual: {}", expected_key, account.key);
        return Err(ProgramError::InvalidSeeds);
    }

    Ok(bump)
}

/// Load a program-owned account, reporting `missing` when it was never created.
pub fn load_program_account<T: ProgramAccount>(
    account: &AccountInfo,
    program_id: &Pubkey,
    missing: LendingError,
) -> Result<T, ProgramError> {
    if account.owner != program_id || account.data_is_empty() {
        msg!("Account {} is not initialized", account.key);
        return Err(missing.into());
    }
    let data = account.try_borrow_data()?;
    if !T::is_initialized(&data) {
        return Err(missing.into());
    }
    T::load(&data)
}

/// Existing state of an account that an init instruction is about to create.
pub fn load_init_slot<T: ProgramAccount>(
    account: &AccountInfo,
    program_id: &Pubkey,
) -> Result<Option<T>, ProgramError> {
    if account.owner != program_id {
        if account.lamports() > 0 && !account.data_is_empty() {
            msg!("Account {} is owned by another program", account.key);
            return Err(ProgramError::IllegalOwner);
        }
        return Ok(None);
    }
    T::load_optional(&account.try_borrow_data()?)
}
