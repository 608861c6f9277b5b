use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod pda;
pub mod state;

use instructions::*;

declare_id!("AniMw4zVJksBsEytEkgxsE1dDgpkCxviNoP9QuRLLSEa");

#[program]
pub mod escrow_settlement {
    use super::*;

    /// Open an escrow: maker deposits Token A and sets the Token B price
    #[instruction(discriminator = 0)]
    pub fn make(
        ctx: Context<Make>,
        seed: u64,
        deposit_amount: u64,
        receive_amount: u64,
    ) -> Result<()> {
        instructions::make::handler(ctx, seed, deposit_amount, receive_amount)
    }

    /// Settle the escrow: taker pays Token B, receives the vault's Token A
    #[instruction(discriminator = 1)]
    pub fn take(ctx: Context<Take>) -> Result<()> {
        instructions::take::handler(ctx)
    }

    /// Cancel the escrow: maker reclaims Token A
    #[instruction(discriminator = 2)]
    pub fn refund(ctx: Context<Refund>) -> Result<()> {
        instructions::refund::handler(ctx)
    }
}
