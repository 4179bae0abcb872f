use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::invoke,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};
use spl_token::state::{Account as TokenAccount, Mint};

use crate::{
    account_validation::{
        load_init_slot, load_program_account, validate_owner, validate_pda, validate_signer,
        validate_token_program, validate_writable,
    },
    cpi::create_pda_account,
    error::LendingError,
    instructions::LendingInstruction,
    operations::{self, Protocol},
    oracle::AccountPriceOracle,
    pda::{seeds, with_bump, BankPDA, ConfigPDA, TreasuryPDA, UserPDA},
    state::{Bank, BankConfig, BankSetup, ProgramAccount, ProtocolConfig, UserAccount},
    token::SplTokenTransfer,
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = LendingInstruction::unpack(instruction_data)?;

    match instruction {
        LendingInstruction::InitBank {
            deposit_rate,
            borrow_rate,
            config,
        } => {
            msg!("Instruction: InitBank");
            process_init_bank(program_id, accounts, deposit_rate, borrow_rate, config)
        }

        LendingInstruction::InitUser { reference_mint } => {
            msg!("Instruction: InitUser");
            process_init_user(program_id, accounts, reference_mint)
        }

        LendingInstruction::Deposit { amount } => {
            msg!("Instruction: Deposit");
            process_asset_operation(program_id, accounts, AssetOperation::Deposit, amount)
        }

        LendingInstruction::Withdraw { amount } => {
            msg!("Instruction: Withdraw");
            process_asset_operation(program_id, accounts, AssetOperation::Withdraw, amount)
        }

        LendingInstruction::Borrow { amount } => {
            msg!("Instruction: Borrow");
            process_asset_operation(program_id, accounts, AssetOperation::Borrow, amount)
        }

        LendingInstruction::Repay { amount } => {
            msg!("Instruction: Repay");
            process_asset_operation(program_id, accounts, AssetOperation::Repay, amount)
        }

        LendingInstruction::InitConfig { oracle_program } => {
            msg!("Instruction: InitConfig");
            process_init_config(program_id, accounts, oracle_program)
        }
    }
}

/// Create the protocol config PDA with the signer as admin
fn process_init_config(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    oracle_program: Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let admin_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    validate_signer(admin_info)?;
    validate_writable(config_info)?;
    let bump = validate_pda(config_info, program_id, &[seeds::CONFIG])?;

    let now = Clock::get()?.unix_timestamp;
    let mut slot = load_init_slot::<ProtocolConfig>(config_info, program_id)?;
    operations::init_config(&mut slot, *admin_info.key, oracle_program, bump, now)?;
    let config = slot.ok_or(LendingError::ConfigNotFound)?;

    let rent = Rent::get()?;
    let config_seeds = with_bump(ConfigPDA::seeds(), bump);
    let config_signer: Vec<&[u8]> = config_seeds.iter().map(Vec::as_slice).collect();
    create_pda_account(
        admin_info,
        config_info,
        ProtocolConfig::LEN,
        program_id,
        system_program,
        &rent,
        &config_signer,
    )?;

    config.save(&mut config_info.try_borrow_mut_data()?)?;

    Ok(())
}

/// Load and validate the protocol config PDA
fn load_protocol_config(
    config_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<ProtocolConfig, ProgramError> {
    validate_pda(config_info, program_id, &[seeds::CONFIG])?;
    let config: ProtocolConfig =
        load_program_account(config_info, program_id, LendingError::ConfigNotFound)?;
    config.validate()?;
    Ok(config)
}

/// Create the bank PDA and its treasury token account
fn process_init_bank(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    deposit_rate: u64,
    borrow_rate: u64,
    config: BankConfig,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let authority_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let bank_info = next_account_info(account_info_iter)?;
    let treasury_info = next_account_info(account_info_iter)?;
    let token_program = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;
    let rent_sysvar = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;

    validate_signer(authority_info)?;
    validate_writable(bank_info)?;
    validate_writable(treasury_info)?;
    validate_token_program(token_program)?;
    validate_owner(mint_info, &spl_token::id())?;

    let bank_bump = validate_pda(bank_info, program_id, &[seeds::BANK, mint_info.key.as_ref()])?;
    let treasury_bump = validate_pda(
        treasury_info,
        program_id,
        &[seeds::TREASURY, mint_info.key.as_ref()],
    )?;

    let protocol = load_protocol_config(config_info, program_id)?;
    let mint = Mint::unpack(&mint_info.try_borrow_data()?)?;
    let now = Clock::get()?.unix_timestamp;

    let mut slot = load_init_slot::<Bank>(bank_info, program_id)?;
    let setup = BankSetup {
        authority: *authority_info.key,
        mint: *mint_info.key,
        mint_decimals: mint.decimals,
        treasury: *treasury_info.key,
        bump: bank_bump,
        treasury_bump,
    };
    operations::init_bank(&mut slot, &protocol, setup, deposit_rate, borrow_rate, config, now)?;
    let bank = slot.ok_or(LendingError::BankNotFound)?;

    let rent = Rent::from_account_info(rent_sysvar)?;
    let bank_seeds = with_bump(BankPDA::seeds(mint_info.key), bank_bump);
    let bank_signer: Vec<&[u8]> = bank_seeds.iter().map(Vec::as_slice).collect();
    let treasury_seeds = with_bump(TreasuryPDA::seeds(mint_info.key), treasury_bump);
    let treasury_signer: Vec<&[u8]> = treasury_seeds.iter().map(Vec::as_slice).collect();

    create_pda_account(
        authority_info,
        bank_info,
        Bank::LEN,
        program_id,
        system_program,
        &rent,
        &bank_signer,
    )?;
    create_pda_account(
        authority_info,
        treasury_info,
        TokenAccount::LEN,
        &spl_token::id(),
        system_program,
        &rent,
        &treasury_signer,
    )?;

    invoke(
        &spl_token::instruction::initialize_account3(
            &spl_token::id(),
            treasury_info.key,
            mint_info.key,
            bank_info.key,
        )?,
        &[
            treasury_info.clone(),
            mint_info.clone(),
            token_program.clone(),
        ],
    )?;

    bank.save(&mut bank_info.try_borrow_mut_data()?)?;

    msg!("Treasury {} created for bank {}", treasury_info.key, bank_info.key);

    Ok(())
}

/// Create the signer's user account PDA
fn process_init_user(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    reference_mint: Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let owner_info = next_account_info(account_info_iter)?;
    let user_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    validate_signer(owner_info)?;
    validate_writable(user_info)?;
    let bump = validate_pda(user_info, program_id, &[seeds::USER, owner_info.key.as_ref()])?;

    let now = Clock::get()?.unix_timestamp;
    let mut slot = load_init_slot::<UserAccount>(user_info, program_id)?;
    operations::init_user(&mut slot, *owner_info.key, reference_mint, bump, now)?;
    let user = slot.ok_or(LendingError::UserNotFound)?;

    let rent = Rent::get()?;
    let user_seeds = with_bump(UserPDA::seeds(owner_info.key), bump);
    let user_signer: Vec<&[u8]> = user_seeds.iter().map(Vec::as_slice).collect();
    create_pda_account(
        owner_info,
        user_info,
        UserAccount::LEN,
        program_id,
        system_program,
        &rent,
        &user_signer,
    )?;

    user.save(&mut user_info.try_borrow_mut_data()?)?;

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetOperation {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
}

/// Deposit, withdraw, borrow or repay against one bank
fn process_asset_operation(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    operation: AssetOperation,
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let owner_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let bank_info = next_account_info(account_info_iter)?;
    let treasury_info = next_account_info(account_info_iter)?;
    let user_info = next_account_info(account_info_iter)?;
    let owner_token_info = next_account_info(account_info_iter)?;
    let token_program = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let remaining = account_info_iter.as_slice();

    validate_signer(owner_info)?;
    validate_token_program(token_program)?;
    validate_writable(bank_info)?;
    validate_writable(user_info)?;

    let mut bank: Bank = load_program_account(bank_info, program_id, LendingError::BankNotFound)?;
    bank.validate()?;
    if bank.mint != *mint_info.key || bank.treasury != *treasury_info.key {
        msg!("Bank {} does not match mint or treasury", bank_info.key);
        return Err(LendingError::InvalidAccountData.into());
    }
    validate_pda(bank_info, program_id, &[seeds::BANK, mint_info.key.as_ref()])?;

    let mut user: UserAccount =
        load_program_account(user_info, program_id, LendingError::UserNotFound)?;
    user.validate()?;
    if user.owner != *owner_info.key {
        msg!("User account {} is not owned by {}", user_info.key, owner_info.key);
        return Err(LendingError::Unauthorized.into());
    }
    validate_pda(user_info, program_id, &[seeds::USER, owner_info.key.as_ref()])?;

    validate_owner(owner_token_info, &spl_token::id())?;
    let owner_token = TokenAccount::unpack(&owner_token_info.try_borrow_data()?)?;
    if owner_token.mint != bank.mint {
        msg!("Token account {} holds a different mint", owner_token_info.key);
        return Err(LendingError::InvalidAccountData.into());
    }

    let now = Clock::get()?.unix_timestamp;
    let protocol = load_protocol_config(config_info, program_id)?;
    let other_banks = load_other_banks(remaining, program_id, &bank.mint)?;
    let oracle = match operation {
        AssetOperation::Withdraw | AssetOperation::Borrow => {
            AccountPriceOracle::from_accounts(remaining, &protocol.oracle_program, now)?
        }
        AssetOperation::Deposit | AssetOperation::Repay => AccountPriceOracle::new(Vec::new(), now),
    };

    let mut tokens = SplTokenTransfer {
        token_program,
        owner: owner_info,
        owner_token: owner_token_info,
        bank: bank_info,
        treasury: treasury_info,
        mint: bank.mint,
        bank_bump: bank.bump,
    };
    let mut protocol = Protocol::new(&oracle, &mut tokens, now);

    match operation {
        AssetOperation::Deposit => {
            protocol.deposit(&mut bank, &mut user, owner_token_info.key, amount)?;
        }
        AssetOperation::Withdraw => {
            protocol.withdraw(&mut bank, &mut user, &other_banks, owner_token_info.key, amount)?;
        }
        AssetOperation::Borrow => {
            protocol.borrow(&mut bank, &mut user, &other_banks, owner_token_info.key, amount)?;
        }
        AssetOperation::Repay => {
            protocol.repay(&mut bank, &mut user, owner_token_info.key, amount)?;
        }
    }

    bank.save(&mut bank_info.try_borrow_mut_data()?)?;
    user.save(&mut user_info.try_borrow_mut_data()?)?;

    Ok(())
}

/// Banks among the remaining accounts, other than the one being operated on
fn load_other_banks(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    active_mint: &Pubkey,
) -> Result<Vec<Bank>, ProgramError> {
    let mut banks = Vec::new();
    for account in accounts {
        if account.owner != program_id || !Bank::is_initialized(&account.try_borrow_data()?) {
            continue;
        }
        let bank = Bank::load(&account.try_borrow_data()?)?;
        bank.validate()?;
        if bank.mint != *active_mint {
            banks.push(bank);
        }
    }
    Ok(banks)
}
