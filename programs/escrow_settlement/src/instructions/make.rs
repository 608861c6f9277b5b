use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{transfer_checked, Mint, Token, TokenAccount, TransferChecked},
};

use crate::{
    constants::{ALLOW_SELF_SWAP, ESCROW_SEED},
    errors::EscrowError,
    events::EscrowMade,
    state::Escrow,
};

#[derive(Accounts)]
#[instruction(seed: u64)]
pub struct Make<'info> {
    /// The maker who sets exchange terms and deposits Token A
    #[account(mut)]
    pub maker: Signer<'info>,

    /// Escrow account that stores all exchange conditions
    #[account(
        init,
        payer = maker,
        space = Escrow::SPACE,
        seeds = [ESCROW_SEED, maker.key().as_ref(), seed.to_le_bytes().as_ref()],
        bump,
    )]
    pub escrow: Account<'info, Escrow>,

    /// Token A mint (the token the maker will deposit)
    pub mint_a: Account<'info, Mint>,

    /// Token B mint (the token the maker wants to receive)
    pub mint_b: Account<'info, Mint>,

    /// Maker's associated token account for Token A (source of deposit)
    #[account(
        mut,
        associated_token::mint = mint_a,
        associated_token::authority = maker,
    )]
    pub maker_ata_a: Account<'info, TokenAccount>,

    /// Vault owned by the escrow, holding Token A
    #[account(
        init,
        payer = maker,
        associated_token::mint = mint_a,
        associated_token::authority = escrow,
    )]
    pub vault: Account<'info, TokenAccount>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

impl<'info> Make<'info> {
    /// Record the exchange terms
    pub fn init_escrow(&mut self, seed: u64, receive: u64, bumps: &MakeBumps) -> Result<()> {
        self.escrow.set_inner(Escrow {
            seed,
            maker: self.maker.key(),
            mint_a: self.mint_a.key(),
            mint_b: self.mint_b.key(),
            receive,
            bump: bumps.escrow,
        });
        Ok(())
    }

    /// Transfer Token A from maker to vault
    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        require_gte!(
            self.maker_ata_a.amount,
            amount,
            EscrowError::InsufficientFunds
        );

        let cpi_accounts = TransferChecked {
            from: self.maker_ata_a.to_account_info(),
            mint: self.mint_a.to_account_info(),
            to: self.vault.to_account_info(),
            authority: self.maker.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);

        transfer_checked(cpi_ctx, amount, self.mint_a.decimals)
    }
}

pub fn handler(
    ctx: Context<Make>,
    seed: u64,
    deposit_amount: u64,
    receive_amount: u64,
) -> Result<()> {
    Escrow::validate_terms(
        &ctx.accounts.mint_a.key(),
        &ctx.accounts.mint_b.key(),
        deposit_amount,
        receive_amount,
        ALLOW_SELF_SWAP,
    )?;

    ctx.accounts.init_escrow(seed, receive_amount, &ctx.bumps)?;
    ctx.accounts.deposit(deposit_amount)?;

    emit!(EscrowMade {
        escrow: ctx.accounts.escrow.key(),
        maker: ctx.accounts.maker.key(),
        seed,
        mint_a: ctx.accounts.mint_a.key(),
        mint_b: ctx.accounts.mint_b.key(),
        deposit: deposit_amount,
        receive: receive_amount,
    });
    msg!(
        "Escrow opened: {} deposited, {} requested",
        deposit_amount,
        receive_amount
    );
    Ok(())
}
