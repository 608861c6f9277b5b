use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{
        close_account, transfer_checked, CloseAccount, Mint, Token, TokenAccount, TransferChecked,
    },
};

use crate::{constants::ESCROW_SEED, errors::EscrowError, events::EscrowRefunded, state::Escrow};

#[derive(Accounts)]
pub struct Refund<'info> {
    /// The maker who created the escrow; checked ahead of every escrow constraint
    #[account(mut, constraint = maker.key() == escrow.maker @ EscrowError::Unauthorized)]
    pub maker: Signer<'info>,

    /// Escrow account storing exchange terms (closed to maker)
    #[account(
        mut,
        close = maker,
        has_one = mint_a @ EscrowError::MintMismatch,
        seeds = [ESCROW_SEED, maker.key().as_ref(), escrow.seed.to_le_bytes().as_ref()],
        bump = escrow.bump,
    )]
    pub escrow: Account<'info, Escrow>,

    pub mint_a: Account<'info, Mint>,

    /// Vault holding Token A (owned by escrow)
    #[account(
        mut,
        associated_token::mint = mint_a,
        associated_token::authority = escrow,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Maker's Token A account (receives refund), created on demand
    #[account(
        init_if_needed,
        payer = maker,
        associated_token::mint = mint_a,
        associated_token::authority = maker,
    )]
    pub maker_ata_a: Account<'info, TokenAccount>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

impl<'info> Refund<'info> {
    /// Return the whole vault to the maker and close it
    pub fn refund_and_close_vault(&mut self) -> Result<u64> {
        let maker_key = self.maker.key();
        let seed_bytes = self.escrow.seed.to_le_bytes();
        let signer_seeds: &[&[&[u8]]] = &[&[
            ESCROW_SEED,
            maker_key.as_ref(),
            seed_bytes.as_ref(),
            &[self.escrow.bump],
        ]];
        let refunded = self.vault.amount;

        let cpi_accounts = TransferChecked {
            from: self.vault.to_account_info(),
            mint: self.mint_a.to_account_info(),
            to: self.maker_ata_a.to_account_info(),
            authority: self.escrow.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
        transfer_checked(cpi_ctx, refunded, self.mint_a.decimals)?;

        let cpi_accounts = CloseAccount {
            account: self.vault.to_account_info(),
            destination: self.maker.to_account_info(),
            authority: self.escrow.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);
        close_account(cpi_ctx)?;

        Ok(refunded)
    }
}

pub fn handler(ctx: Context<Refund>) -> Result<()> {
    let refunded = ctx.accounts.refund_and_close_vault()?;

    emit!(EscrowRefunded {
        escrow: ctx.accounts.escrow.key(),
        maker: ctx.accounts.maker.key(),
        refunded,
    });
    msg!("Escrow refunded: {} returned", refunded);
    Ok(())
}
