use anchor_lang::prelude::*;

use crate::errors::EscrowError;

/// Escrow account that stores all the exchange terms
#[account(discriminator = 1)]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Escrow {
    /// Seed used for PDA derivation
    pub seed: u64,
    /// The maker's wallet address (creator of the escrow)
    pub maker: Pubkey,
    /// Token A mint address (the token maker deposits)
    pub mint_a: Pubkey,
    /// Token B mint address (the token maker wants to receive)
    pub mint_b: Pubkey,
    /// Amount of Token B the maker wants to receive
    pub receive: u64,
    /// Canonical bump of the escrow PDA, re-verified on every take/refund
    pub bump: u8,
}

impl Escrow {
    /// Allocated size: discriminator + fields
    pub const SPACE: usize = Self::DISCRIMINATOR.len() + Self::INIT_SPACE;

    /// Checks the terms a maker proposes before anything is allocated.
    pub fn validate_terms(
        mint_a: &Pubkey,
        mint_b: &Pubkey,
        deposit: u64,
        receive: u64,
        allow_self_swap: bool,
    ) -> Result<()> {
        require_gt!(deposit, 0, EscrowError::InvalidAmount);
        require_gt!(receive, 0, EscrowError::InvalidAmount);
        if !allow_self_swap {
            require_keys_neq!(*mint_a, *mint_b, EscrowError::SelfSwap);
        }
        Ok(())
    }

    /// Both supplied mints must be the ones recorded at make time.
    pub fn check_mints(&self, mint_a: &Pubkey, mint_b: &Pubkey) -> Result<()> {
        require_keys_eq!(self.mint_a, *mint_a, EscrowError::MintMismatch);
        require_keys_eq!(self.mint_b, *mint_b, EscrowError::MintMismatch);
        Ok(())
    }
}
