//! Program-derived addresses for escrows, vaults and user token accounts.
//!
//! Every address the program trusts is re-derived here; a caller-supplied
//! address that differs from the canonical derivation is an `AddressMismatch`.

use anchor_lang::prelude::*;
use anchor_spl::{associated_token, token};

use crate::{constants::ESCROW_SEED, errors::EscrowError};

/// Escrow PDA for (program, maker, seed).
pub fn derive_escrow_address(program_id: &Pubkey, maker: &Pubkey, seed: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[ESCROW_SEED, maker.as_ref(), &seed.to_le_bytes()],
        program_id,
    )
}

/// Associated token account of `wallet` for `mint`.
pub fn derive_token_address(wallet: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[wallet.as_ref(), token::ID.as_ref(), mint.as_ref()],
        &associated_token::ID,
    )
}

/// Vault of an escrow: the escrow's own associated token account for mint_a.
pub fn derive_vault_address(escrow: &Pubkey, mint_a: &Pubkey) -> (Pubkey, u8) {
    derive_token_address(escrow, mint_a)
}

/// Re-derive the escrow address with a stored bump and compare. The bump must
/// be the canonical one.
pub fn verify_escrow_address(
    program_id: &Pubkey,
    maker: &Pubkey,
    seed: u64,
    bump: u8,
    supplied: &Pubkey,
) -> Result<()> {
    let expected = Pubkey::create_program_address(
        &[ESCROW_SEED, maker.as_ref(), &seed.to_le_bytes(), &[bump]],
        program_id,
    )
    .map_err(|_| error!(EscrowError::AddressMismatch))?;
    require_keys_eq!(expected, *supplied, EscrowError::AddressMismatch);

    let (_, canonical) = derive_escrow_address(program_id, maker, seed);
    require_eq!(bump, canonical, EscrowError::AddressMismatch);
    Ok(())
}

pub fn verify_vault_address(escrow: &Pubkey, mint_a: &Pubkey, supplied: &Pubkey) -> Result<()> {
    verify_token_address(escrow, mint_a, supplied)
}

pub fn verify_token_address(wallet: &Pubkey, mint: &Pubkey, supplied: &Pubkey) -> Result<()> {
    let (expected, _) = derive_token_address(wallet, mint);
    require_keys_eq!(expected, *supplied, EscrowError::AddressMismatch);
    Ok(())
}
