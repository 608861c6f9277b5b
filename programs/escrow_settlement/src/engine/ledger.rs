//! In-memory account store: a flat map from address to account, with just
//! enough of the system and token programs to settle escrows.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program_error::ProgramError, system_program};
use anchor_spl::token;

use super::custody::{AccountAllocation, TokenAccountState, TokenCustody};
use crate::{constants::TOKEN_ACCOUNT_SIZE, errors::EscrowError, pda, state::Escrow};

/// SPL mint account size
const MINT_SIZE: usize = 82;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountKind {
    /// System-owned, holds lamports only
    Wallet,
    Mint { decimals: u8, supply: u64 },
    Token(TokenAccountState),
    /// Program-owned data account
    Data(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerAccount {
    pub lamports: u64,
    pub owner: Pubkey,
    pub kind: AccountKind,
}

#[derive(Clone, Debug, Default)]
pub struct Ledger {
    accounts: BTreeMap<Pubkey, LedgerAccount>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, address: &Pubkey) -> Option<&LedgerAccount> {
        self.accounts.get(address)
    }

    pub fn exists(&self, address: &Pubkey) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.accounts.get(address).map_or(0, |account| account.lamports)
    }

    /// Decoded escrow record at `address`, if this program owns one there.
    pub fn escrow(&self, address: &Pubkey) -> Option<Escrow> {
        let account = self.accounts.get(address)?;
        if account.owner != crate::ID {
            return None;
        }
        match &account.kind {
            AccountKind::Data(data) => Escrow::try_deserialize(&mut data.as_slice()).ok(),
            _ => None,
        }
    }

    /// Airdrop lamports to a wallet, creating it if needed.
    pub fn fund(&mut self, wallet: &Pubkey, lamports: u64) -> Result<()> {
        self.credit_lamports(wallet, lamports)
    }

    pub fn create_mint(&mut self, decimals: u8) -> Pubkey {
        let mint = Pubkey::new_unique();
        self.accounts.insert(
            mint,
            LedgerAccount {
                lamports: Rent::default().minimum_balance(MINT_SIZE),
                owner: token::ID,
                kind: AccountKind::Mint { decimals, supply: 0 },
            },
        );
        mint
    }

    /// Mint `amount` into the associated token account of `owner`, opening it
    /// rent-free if it does not exist yet.
    pub fn mint_to(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Result<Pubkey> {
        let (address, _) = pda::derive_token_address(owner, mint);
        match self.accounts.get_mut(mint).map(|account| &mut account.kind) {
            Some(AccountKind::Mint { supply, .. }) => {
                *supply = supply
                    .checked_add(amount)
                    .ok_or(EscrowError::MathOverflow)?;
            }
            _ => return err!(EscrowError::InvalidMint),
        }

        let entry = self.accounts.entry(address).or_insert_with(|| LedgerAccount {
            lamports: Rent::default().minimum_balance(TOKEN_ACCOUNT_SIZE),
            owner: token::ID,
            kind: AccountKind::Token(TokenAccountState {
                mint: *mint,
                owner: *owner,
                amount: 0,
            }),
        });
        match &mut entry.kind {
            AccountKind::Token(state) => {
                state.amount = state
                    .amount
                    .checked_add(amount)
                    .ok_or(EscrowError::MathOverflow)?;
            }
            _ => return err!(EscrowError::AddressCollision),
        }
        Ok(address)
    }

    fn credit_lamports(&mut self, to: &Pubkey, lamports: u64) -> Result<()> {
        let entry = self.accounts.entry(*to).or_insert_with(|| LedgerAccount {
            lamports: 0,
            owner: system_program::ID,
            kind: AccountKind::Wallet,
        });
        entry.lamports = entry
            .lamports
            .checked_add(lamports)
            .ok_or(EscrowError::MathOverflow)?;
        Ok(())
    }

    fn debit_lamports(&mut self, from: &Pubkey, lamports: u64) -> Result<()> {
        let account = self
            .accounts
            .get_mut(from)
            .ok_or(EscrowError::InsufficientFunds)?;
        account.lamports = account
            .lamports
            .checked_sub(lamports)
            .ok_or(EscrowError::InsufficientFunds)?;
        Ok(())
    }

    /// Lamports already sitting at `address` that a new account may absorb.
    /// Only a bare system account qualifies; anything else is a collision.
    fn claimable_lamports(&self, address: &Pubkey) -> Result<u64> {
        match self.accounts.get(address) {
            None => Ok(0),
            Some(LedgerAccount {
                lamports,
                kind: AccountKind::Wallet,
                ..
            }) => Ok(*lamports),
            Some(_) => err!(EscrowError::AddressCollision),
        }
    }

    /// Bring `address` up to `rent`, charging `payer` only for the shortfall.
    fn top_up_rent(&mut self, address: &Pubkey, rent: u64, payer: &Pubkey) -> Result<u64> {
        let existing = self.claimable_lamports(address)?;
        let shortfall = rent.saturating_sub(existing);
        if shortfall > 0 {
            self.debit_lamports(payer, shortfall)?;
        }
        Ok(existing + shortfall)
    }

    fn token_state_mut(&mut self, address: &Pubkey) -> Result<&mut TokenAccountState> {
        match self.accounts.get_mut(address).map(|account| &mut account.kind) {
            Some(AccountKind::Token(state)) => Ok(state),
            _ => err!(EscrowError::AccountNotFound),
        }
    }
}

impl TokenCustody for Ledger {
    fn open_account(&mut self, payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey> {
        let (address, _) = pda::derive_token_address(owner, mint);
        if let Some(AccountKind::Token(state)) = self.accounts.get(&address).map(|a| &a.kind) {
            require_keys_eq!(state.mint, *mint, EscrowError::AddressCollision);
            require_keys_eq!(state.owner, *owner, EscrowError::AddressCollision);
            return Ok(address);
        }
        require!(self.mint_decimals(mint).is_some(), EscrowError::InvalidMint);

        let rent = Rent::default().minimum_balance(TOKEN_ACCOUNT_SIZE);
        let lamports = self.top_up_rent(&address, rent, payer)?;
        self.accounts.insert(
            address,
            LedgerAccount {
                lamports,
                owner: token::ID,
                kind: AccountKind::Token(TokenAccountState {
                    mint: *mint,
                    owner: *owner,
                    amount: 0,
                }),
            },
        );
        Ok(address)
    }

    fn transfer(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        authority: &Pubkey,
        amount: u64,
    ) -> Result<()> {
        let source = self
            .token_account(from)
            .ok_or(EscrowError::AccountNotFound)?;
        let destination = self.token_account(to).ok_or(EscrowError::AccountNotFound)?;

        require_keys_eq!(source.owner, *authority, EscrowError::Unauthorized);
        require_keys_eq!(source.mint, destination.mint, EscrowError::MintMismatch);
        require_gte!(source.amount, amount, EscrowError::InsufficientFunds);
        if from == to {
            return Ok(());
        }

        let credited = destination
            .amount
            .checked_add(amount)
            .ok_or(EscrowError::MathOverflow)?;
        self.token_state_mut(from)?.amount = source.amount - amount;
        self.token_state_mut(to)?.amount = credited;
        Ok(())
    }

    fn close_account(
        &mut self,
        account: &Pubkey,
        authority: &Pubkey,
        rent_recipient: &Pubkey,
    ) -> Result<u64> {
        let state = self
            .token_account(account)
            .ok_or(EscrowError::AccountNotFound)?;
        require_keys_eq!(state.owner, *authority, EscrowError::Unauthorized);
        if state.amount != 0 {
            return Err(ProgramError::InvalidAccountData.into());
        }

        let lamports = self.lamports(account);
        self.accounts.remove(account);
        self.credit_lamports(rent_recipient, lamports)?;
        Ok(lamports)
    }

    fn balance_of(&self, account: &Pubkey) -> Result<u64> {
        self.token_account(account)
            .map(|state| state.amount)
            .ok_or_else(|| error!(EscrowError::AccountNotFound))
    }

    fn token_account(&self, account: &Pubkey) -> Option<TokenAccountState> {
        match self.accounts.get(account)?.kind {
            AccountKind::Token(state) => Some(state),
            _ => None,
        }
    }

    fn mint_decimals(&self, mint: &Pubkey) -> Option<u8> {
        match self.accounts.get(mint)?.kind {
            AccountKind::Mint { decimals, .. } => Some(decimals),
            _ => None,
        }
    }
}

impl AccountAllocation for Ledger {
    fn create_account(
        &mut self,
        address: &Pubkey,
        owner: &Pubkey,
        size: usize,
        funding_source: &Pubkey,
    ) -> Result<()> {
        let rent = Rent::default().minimum_balance(size);
        let lamports = self.top_up_rent(address, rent, funding_source)?;
        self.accounts.insert(
            *address,
            LedgerAccount {
                lamports,
                owner: *owner,
                kind: AccountKind::Data(vec![0; size]),
            },
        );
        Ok(())
    }

    fn close_account(&mut self, address: &Pubkey, refund_recipient: &Pubkey) -> Result<u64> {
        match self.accounts.get(address) {
            Some(LedgerAccount {
                kind: AccountKind::Data(_),
                ..
            }) => {}
            _ => return err!(EscrowError::AccountNotFound),
        }

        let lamports = self.lamports(address);
        self.accounts.remove(address);
        self.credit_lamports(refund_recipient, lamports)?;
        Ok(lamports)
    }

    fn account_owner(&self, address: &Pubkey) -> Option<Pubkey> {
        self.accounts.get(address).map(|account| account.owner)
    }

    fn account_data(&self, address: &Pubkey) -> Option<&[u8]> {
        match &self.accounts.get(address)?.kind {
            AccountKind::Data(data) => Some(data.as_slice()),
            _ => None,
        }
    }

    fn write_account_data(&mut self, address: &Pubkey, data: &[u8]) -> Result<()> {
        match self.accounts.get_mut(address).map(|account| &mut account.kind) {
            Some(AccountKind::Data(stored)) => {
                if stored.len() < data.len() {
                    return Err(ProgramError::AccountDataTooSmall.into());
                }
                stored[..data.len()].copy_from_slice(data);
                Ok(())
            }
            _ => err!(EscrowError::AccountNotFound),
        }
    }
}
