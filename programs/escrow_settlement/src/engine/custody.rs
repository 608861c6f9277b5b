//! Capabilities the settlement engine consumes from its environment.
//!
//! On chain these are the token and system programs reached through CPI; the
//! in-memory [`Ledger`](super::ledger::Ledger) implements both for simulation.

use anchor_lang::prelude::*;

/// Token account contents, as the token program would report them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint: Pubkey,
    /// Transfer and close authority
    pub owner: Pubkey,
    pub amount: u64,
}

pub trait TokenCustody {
    /// Open (or find) the associated token account of `owner` for `mint`,
    /// rent paid by `payer`.
    fn open_account(&mut self, payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey>;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, authority: &Pubkey, amount: u64)
        -> Result<()>;

    /// Close an empty token account, returning its lamports to `rent_recipient`.
    fn close_account(
        &mut self,
        account: &Pubkey,
        authority: &Pubkey,
        rent_recipient: &Pubkey,
    ) -> Result<u64>;

    fn balance_of(&self, account: &Pubkey) -> Result<u64>;

    fn token_account(&self, account: &Pubkey) -> Option<TokenAccountState>;

    fn mint_decimals(&self, mint: &Pubkey) -> Option<u8>;
}

pub trait AccountAllocation {
    /// Allocate a zeroed, rent-exempt account of `size` bytes owned by `owner`.
    /// Lamports already held by a bare system account at `address` count
    /// towards rent; any other existing account is an `AddressCollision`.
    fn create_account(
        &mut self,
        address: &Pubkey,
        owner: &Pubkey,
        size: usize,
        funding_source: &Pubkey,
    ) -> Result<()>;

    /// Remove a data account, returning its lamports to `refund_recipient`.
    fn close_account(&mut self, address: &Pubkey, refund_recipient: &Pubkey) -> Result<u64>;

    fn account_owner(&self, address: &Pubkey) -> Option<Pubkey>;

    fn account_data(&self, address: &Pubkey) -> Option<&[u8]>;

    fn write_account_data(&mut self, address: &Pubkey, data: &[u8]) -> Result<()>;
}

/// Everything a transition needs; `Clone` lets the executor stage its writes.
pub trait SettlementLedger: TokenCustody + AccountAllocation + Clone {}

impl<T: TokenCustody + AccountAllocation + Clone> SettlementLedger for T {}
