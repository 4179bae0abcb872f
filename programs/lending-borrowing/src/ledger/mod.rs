pub mod bank_ledger;
pub mod user_ledger;

pub use bank_ledger::Accrual;
pub use user_ledger::Side;
