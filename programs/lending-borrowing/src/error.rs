use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, FromPrimitive)]
pub enum LendingError {
    // Account lifecycle (6000-6009)
    #[error("Bank already exists for this mint")]
    BankAlreadyExists = 6000,

    #[error("User account already exists")]
    UserAlreadyExists = 6001,

    #[error("Bank not found")]
    BankNotFound = 6002,

    #[error("User account not found")]
    UserNotFound = 6003,

    #[error("Invalid account data")]
    InvalidAccountData = 6004,

    #[error("Signer is not authorized for this account")]
    Unauthorized = 6005,

    #[error("Too many open positions")]
    TooManyPositions = 6006,

    #[error("Invalid bank configuration")]
    InvalidConfiguration = 6007,

    #[error("Protocol config already exists")]
    ConfigAlreadyExists = 6008,

    #[error("Protocol config not found")]
    ConfigNotFound = 6009,

    // Amounts and balances (6010-6019)
    #[error("Amount must be greater than zero")]
    InvalidAmount = 6010,

    #[error("Insufficient balance")]
    InsufficientBalance = 6011,

    #[error("Insufficient bank liquidity")]
    InsufficientLiquidity = 6012,

    #[error("Insufficient collateral")]
    InsufficientCollateral = 6013,

    #[error("Repay amount exceeds the outstanding debt")]
    OverRepay = 6014,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 6015,

    // Collaborators (6020-6029)
    #[error("Price data stale")]
    StalePrice = 6020,

    #[error("Invalid oracle price")]
    InvalidPrice = 6021,

    #[error("Price feed account missing")]
    PriceFeedMissing = 6022,

    #[error("Price confidence interval too wide")]
    PriceConfidenceTooWide = 6023,

    #[error("Token transfer failed")]
    TransferError = 6024,

    #[error("Price feed account is not owned by the oracle program")]
    UntrustedPriceFeed = 6025,
}

impl PrintProgramError for LendingError {
    fn print<E>(&self) {
        msg!("Lending Error: {}", self);
    }
}

impl From<LendingError> for ProgramError {
    fn from(e: LendingError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LendingError {
    fn type_of() -> &'static str {
        "LendingError"
    }
}

impl LendingError {
    /// Recover the error from a `ProgramError::Custom` code.
    pub fn from_program_error(error: &ProgramError) -> Option<Self> {
        match error {
            ProgramError::Custom(code) => num_traits::FromPrimitive::from_u32(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_code_round_trips() {
        let err: ProgramError = LendingError::InsufficientCollateral.into();
        assert_eq!(err, ProgramError::Custom(6013));
        assert_eq!(
            LendingError::from_program_error(&err),
            Some(LendingError::InsufficientCollateral)
        );
        assert_eq!(LendingError::from_program_error(&ProgramError::InvalidArgument), None);
    }
}
