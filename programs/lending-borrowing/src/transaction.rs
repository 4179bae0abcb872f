//! All-or-nothing staging of the accounts an operation mutates

use crate::state::{Bank, UserAccount};

/// Working copies of a bank and a user account.
///
/// Operations mutate the staged copies and call [`Transaction::commit`] once
/// every check and transfer has succeeded. Dropping the transaction without
/// committing leaves the originals untouched.
#[must_use = "a transaction is discarded unless committed"]
pub struct Transaction<'a> {
    bank_slot: &'a mut Bank,
    user_slot: &'a mut UserAccount,
    bank: Bank,
    user: UserAccount,
}

impl<'a> Transaction<'a> {
    pub fn begin(bank: &'a mut Bank, user: &'a mut UserAccount) -> Self {
        let staged_bank = bank.clone();
        let staged_user = user.clone();
        Self {
            bank_slot: bank,
            user_slot: user,
            bank: staged_bank,
            user: staged_user,
        }
    }

    pub fn staged(&mut self) -> (&mut Bank, &mut UserAccount) {
        (&mut self.bank, &mut self.user)
    }

    pub fn commit(self) {
        let Transaction {
            bank_slot,
            user_slot,
            bank,
            user,
        } = self;
        *bank_slot = bank;
        *user_slot = user;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BankConfig, BankSetup};
    use solana_program::pubkey::Pubkey;

    fn accounts() -> (Bank, UserAccount) {
        let setup = BankSetup {
            authority: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            mint_decimals: 6,
            treasury: Pubkey::new_unique(),
            bump: 255,
            treasury_bump: 255,
        };
        let bank = Bank::new(setup, 1, 1, BankConfig::new(Pubkey::new_unique()), 0);
        let user = UserAccount::new(Pubkey::new_unique(), bank.mint, 255, 0);
        (bank, user)
    }

    #[test]
    fn test_commit_publishes_staged_state() {
        let (mut bank, mut user) = accounts();

        let mut tx = Transaction::begin(&mut bank, &mut user);
        let (staged_bank, staged_user) = tx.staged();
        staged_bank.total_deposited = 10;
        staged_user.last_updated = 99;
        tx.commit();

        assert_eq!(bank.total_deposited, 10);
        assert_eq!(user.last_updated, 99);
    }

    #[test]
    fn test_drop_discards_staged_state() {
        let (mut bank, mut user) = accounts();
        let (bank_before, user_before) = (bank.clone(), user.clone());

        {
            let mut tx = Transaction::begin(&mut bank, &mut user);
            let (staged_bank, staged_user) = tx.staged();
            staged_bank.total_deposited = 10;
            staged_user.last_updated = 99;
        }

        assert_eq!(bank, bank_before);
        assert_eq!(user, user_before);
    }
}
