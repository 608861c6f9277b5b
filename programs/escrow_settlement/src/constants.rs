use anchor_lang::prelude::*;

/// Escrow PDA seed prefix: ["escrow", maker, seed]
#[constant]
pub const ESCROW_SEED: &[u8] = b"escrow";

/// SPL token account size
pub const TOKEN_ACCOUNT_SIZE: usize = 165;

/// Whether `make` accepts mint_a == mint_b
pub const ALLOW_SELF_SWAP: bool = cfg!(feature = "allow-self-swap");
