//! Program Derived Address (PDA) derivation functions

use solana_program::pubkey::Pubkey;

/// PDA seed constants
pub mod seeds {
    pub const CONFIG: &[u8] = b"config";
    pub const BANK: &[u8] = b"bank";
    pub const TREASURY: &[u8] = b"treasury";
    pub const USER: &[u8] = b"user";
}

/// Protocol config PDA, one per deployment
#[derive(Debug, Clone)]
pub struct ConfigPDA;
impl ConfigPDA {
    pub fn derive(program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[seeds::CONFIG], program_id)
    }

    pub fn seeds() -> Vec<Vec<u8>> {
        vec![seeds::CONFIG.to_vec()]
    }
}

/// Bank PDA, one per asset mint. Also the token authority of the treasury.
#[derive(Debug, Clone)]
pub struct BankPDA;
impl BankPDA {
    pub fn derive(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[seeds::BANK, mint.as_ref()], program_id)
    }

    pub fn seeds(mint: &Pubkey) -> Vec<Vec<u8>> {
        vec![seeds::BANK.to_vec(), mint.as_ref().to_vec()]
    }
}

/// Treasury token account PDA
#[derive(Debug, Clone)]
pub struct TreasuryPDA;
impl TreasuryPDA {
    pub fn derive(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[seeds::TREASURY, mint.as_ref()], program_id)
    }

    pub fn seeds(mint: &Pubkey) -> Vec<Vec<u8>> {
        vec![seeds::TREASURY.to_vec(), mint.as_ref().to_vec()]
    }
}

/// User account PDA, one per owner
#[derive(Debug, Clone)]
pub struct UserPDA;
impl UserPDA {
    pub fn derive(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[seeds::USER, owner.as_ref()], program_id)
    }

    pub fn seeds(owner: &Pubkey) -> Vec<Vec<u8>> {
        vec![seeds::USER.to_vec(), owner.as_ref().to_vec()]
    }
}

/// Convert owned seeds plus a bump into the form `invoke_signed` expects
pub fn with_bump(mut seeds: Vec<Vec<u8>>, bump: u8) -> Vec<Vec<u8>> {
    seeds.push(vec![bump]);
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_match_derivation() {
        let program_id = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let (bank, bump) = BankPDA::derive(&program_id, &mint);
        let seeds = with_bump(BankPDA::seeds(&mint), bump);
        let seed_refs: Vec<&[u8]> = seeds.iter().map(|s| s.as_slice()).collect();
        assert_eq!(Pubkey::create_program_address(&seed_refs, &program_id).unwrap(), bank);

        let (treasury, _) = TreasuryPDA::derive(&program_id, &mint);
        assert_ne!(treasury, bank);

        let (config, bump) = ConfigPDA::derive(&program_id);
        let seeds = with_bump(ConfigPDA::seeds(), bump);
        let seed_refs: Vec<&[u8]> = seeds.iter().map(|s| s.as_slice()).collect();
        assert_eq!(Pubkey::create_program_address(&seed_refs, &program_id).unwrap(), config);

        let owner = Pubkey::new_unique();
        assert_ne!(UserPDA::derive(&program_id, &owner).0, UserPDA::derive(&program_id, &mint).0);
    }
}
