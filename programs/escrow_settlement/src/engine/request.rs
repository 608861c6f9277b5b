//! Typed transition requests: one variant per instruction, with every account
//! it touches named by role.

use anchor_lang::prelude::*;

use crate::pda;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MakeRequest {
    pub maker: Pubkey,
    pub escrow: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub maker_ata_a: Pubkey,
    pub vault: Pubkey,
    pub seed: u64,
    pub deposit_amount: u64,
    pub receive_amount: u64,
}

impl MakeRequest {
    /// Resolve every derived account the way a client would.
    pub fn new(
        program_id: &Pubkey,
        maker: Pubkey,
        mint_a: Pubkey,
        mint_b: Pubkey,
        seed: u64,
        deposit_amount: u64,
        receive_amount: u64,
    ) -> Self {
        let (escrow, _) = pda::derive_escrow_address(program_id, &maker, seed);
        Self {
            maker,
            escrow,
            mint_a,
            mint_b,
            maker_ata_a: pda::derive_token_address(&maker, &mint_a).0,
            vault: pda::derive_vault_address(&escrow, &mint_a).0,
            seed,
            deposit_amount,
            receive_amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TakeRequest {
    pub taker: Pubkey,
    pub maker: Pubkey,
    pub escrow: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub vault: Pubkey,
    pub taker_ata_a: Pubkey,
    pub taker_ata_b: Pubkey,
    pub maker_ata_b: Pubkey,
}

impl TakeRequest {
    pub fn new(taker: Pubkey, maker: Pubkey, escrow: Pubkey, mint_a: Pubkey, mint_b: Pubkey) -> Self {
        Self {
            taker,
            maker,
            escrow,
            mint_a,
            mint_b,
            vault: pda::derive_vault_address(&escrow, &mint_a).0,
            taker_ata_a: pda::derive_token_address(&taker, &mint_a).0,
            taker_ata_b: pda::derive_token_address(&taker, &mint_b).0,
            maker_ata_b: pda::derive_token_address(&maker, &mint_b).0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefundRequest {
    pub maker: Pubkey,
    pub escrow: Pubkey,
    pub mint_a: Pubkey,
    pub vault: Pubkey,
    pub maker_ata_a: Pubkey,
}

impl RefundRequest {
    pub fn new(maker: Pubkey, escrow: Pubkey, mint_a: Pubkey) -> Self {
        Self {
            maker,
            escrow,
            mint_a,
            vault: pda::derive_vault_address(&escrow, &mint_a).0,
            maker_ata_a: pda::derive_token_address(&maker, &mint_a).0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionRequest {
    Make(MakeRequest),
    Take(TakeRequest),
    Refund(RefundRequest),
}

impl TransitionRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Make(_) => "make",
            Self::Take(_) => "take",
            Self::Refund(_) => "refund",
        }
    }
}

impl From<MakeRequest> for TransitionRequest {
    fn from(request: MakeRequest) -> Self {
        Self::Make(request)
    }
}

impl From<TakeRequest> for TransitionRequest {
    fn from(request: TakeRequest) -> Self {
        Self::Take(request)
    }
}

impl From<RefundRequest> for TransitionRequest {
    fn from(request: RefundRequest) -> Self {
        Self::Refund(request)
    }
}
