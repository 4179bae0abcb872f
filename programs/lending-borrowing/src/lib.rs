// Lending and borrowing protocol
// Native Solana implementation - NO ANCHOR

pub mod account_validation;
pub mod constants;
pub mod cpi;
pub mod engine;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod math;
pub mod operations;
pub mod oracle;
pub mod pda;
pub mod processor;
pub mod state;
pub mod token;
pub mod transaction;

// Declare program ID
solana_program::declare_id!("LendBorrow111111111111111111111111111111111");

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint {
    use solana_program::entrypoint;

    use crate::processor::process_instruction;

    entrypoint!(process_instruction);
}
