use anchor_lang::prelude::*;

/// Emitted when a maker opens an escrow and funds its vault.
#[event]
pub struct EscrowMade {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub seed: u64,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub deposit: u64,
    pub receive: u64,
}

/// Emitted when a taker settles an escrow.
#[event]
pub struct EscrowTaken {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub taker: Pubkey,
    /// mint_a released from the vault to the taker
    pub released: u64,
    /// mint_b paid by the taker to the maker
    pub paid: u64,
}

/// Emitted when the maker cancels an escrow.
#[event]
pub struct EscrowRefunded {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub refunded: u64,
}
