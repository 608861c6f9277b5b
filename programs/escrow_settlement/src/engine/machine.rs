//! Escrow state machine: Absent -> Open (make) -> Absent (take | refund).
//!
//! Every check runs before the settlement plan is built; the plan itself is
//! applied by the executor as a single unit.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::system_program;

use super::{
    custody::{AccountAllocation, SettlementLedger, TokenCustody},
    executor::{SettlementPlan, SettlementStep},
    request::{MakeRequest, RefundRequest, TakeRequest, TransitionRequest},
};
use crate::{constants::ALLOW_SELF_SWAP, errors::EscrowError, pda, state::Escrow};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EscrowState {
    Absent,
    Open(Escrow),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    Made {
        escrow: Pubkey,
        vault: Pubkey,
        deposit: u64,
        receive: u64,
    },
    Taken {
        escrow: Pubkey,
        /// mint_a moved from the vault to the taker
        released: u64,
        /// mint_b moved from the taker to the maker
        paid: u64,
        rent_returned: u64,
    },
    Refunded {
        escrow: Pubkey,
        refunded: u64,
        rent_returned: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscrowEngine {
    program_id: Pubkey,
    allow_self_swap: bool,
}

impl EscrowEngine {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            allow_self_swap: ALLOW_SELF_SWAP,
        }
    }

    pub fn with_self_swap(mut self, allow: bool) -> Self {
        self.allow_self_swap = allow;
        self
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Current state of the escrow at `escrow`. Accounts not owned by this
    /// program are never treated as records.
    pub fn state<L: AccountAllocation>(&self, ledger: &L, escrow: &Pubkey) -> Result<EscrowState> {
        if ledger.account_owner(escrow) != Some(self.program_id) {
            return Ok(EscrowState::Absent);
        }
        match ledger.account_data(escrow) {
            Some(mut data) => Ok(EscrowState::Open(Escrow::try_deserialize(&mut data)?)),
            None => Ok(EscrowState::Absent),
        }
    }

    /// Dispatch a request signed by `signer`.
    pub fn process<L: SettlementLedger>(
        &self,
        ledger: &mut L,
        signer: &Pubkey,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome> {
        match request {
            TransitionRequest::Make(make) => self.make(ledger, signer, make),
            TransitionRequest::Take(take) => self.take(ledger, signer, take),
            TransitionRequest::Refund(refund) => self.refund(ledger, signer, refund),
        }
    }

    pub fn make<L: SettlementLedger>(
        &self,
        ledger: &mut L,
        signer: &Pubkey,
        request: &MakeRequest,
    ) -> Result<TransitionOutcome> {
        require_keys_eq!(*signer, request.maker, EscrowError::Unauthorized);
        Escrow::validate_terms(
            &request.mint_a,
            &request.mint_b,
            request.deposit_amount,
            request.receive_amount,
            self.allow_self_swap,
        )?;

        let (escrow, bump) =
            pda::derive_escrow_address(&self.program_id, &request.maker, request.seed);
        require_keys_eq!(escrow, request.escrow, EscrowError::AddressMismatch);
        pda::verify_vault_address(&escrow, &request.mint_a, &request.vault)?;
        pda::verify_token_address(&request.maker, &request.mint_a, &request.maker_ata_a)?;

        // a bare system account at either address is absorbed, not a collision
        require!(
            is_unclaimed(ledger, &escrow),
            EscrowError::AddressCollision
        );
        require!(
            is_unclaimed(ledger, &request.vault),
            EscrowError::AddressCollision
        );
        require!(
            ledger.mint_decimals(&request.mint_a).is_some(),
            EscrowError::InvalidMint
        );
        require!(
            ledger.mint_decimals(&request.mint_b).is_some(),
            EscrowError::InvalidMint
        );

        let available = ledger
            .token_account(&request.maker_ata_a)
            .map_or(0, |account| account.amount);
        require_gte!(
            available,
            request.deposit_amount,
            EscrowError::InsufficientFunds
        );

        let record = Escrow {
            seed: request.seed,
            maker: request.maker,
            mint_a: request.mint_a,
            mint_b: request.mint_b,
            receive: request.receive_amount,
            bump,
        };
        let mut data = Vec::with_capacity(Escrow::SPACE);
        record.try_serialize(&mut data)?;

        let receipt = SettlementPlan::new()
            .then(SettlementStep::AllocateRecord {
                address: escrow,
                owner: self.program_id,
                size: Escrow::SPACE,
                payer: request.maker,
            })
            .then(SettlementStep::WriteRecord {
                address: escrow,
                data,
            })
            .then(SettlementStep::OpenTokenAccount {
                payer: request.maker,
                owner: escrow,
                mint: request.mint_a,
            })
            .then(SettlementStep::Transfer {
                from: request.maker_ata_a,
                to: request.vault,
                authority: request.maker,
                amount: request.deposit_amount,
            })
            .execute(ledger)?;

        msg!(
            "Escrow {} opened: {} deposited, {} requested",
            escrow,
            receipt.transferred,
            record.receive
        );
        Ok(TransitionOutcome::Made {
            escrow,
            vault: request.vault,
            deposit: receipt.transferred,
            receive: record.receive,
        })
    }

    pub fn take<L: SettlementLedger>(
        &self,
        ledger: &mut L,
        signer: &Pubkey,
        request: &TakeRequest,
    ) -> Result<TransitionOutcome> {
        require_keys_eq!(*signer, request.taker, EscrowError::Unauthorized);
        let record = self.load_open(ledger, &request.escrow)?;

        require_keys_eq!(record.maker, request.maker, EscrowError::AddressMismatch);
        pda::verify_escrow_address(
            &self.program_id,
            &request.maker,
            record.seed,
            record.bump,
            &request.escrow,
        )?;
        record.check_mints(&request.mint_a, &request.mint_b)?;
        pda::verify_vault_address(&request.escrow, &record.mint_a, &request.vault)?;
        pda::verify_token_address(&request.taker, &record.mint_a, &request.taker_ata_a)?;
        pda::verify_token_address(&request.taker, &record.mint_b, &request.taker_ata_b)?;
        pda::verify_token_address(&request.maker, &record.mint_b, &request.maker_ata_b)?;

        let available = ledger
            .token_account(&request.taker_ata_b)
            .map_or(0, |account| account.amount);
        require_gte!(available, record.receive, EscrowError::InsufficientFunds);

        let receipt = SettlementPlan::new()
            .then(SettlementStep::OpenTokenAccount {
                payer: request.taker,
                owner: request.taker,
                mint: record.mint_a,
            })
            .then(SettlementStep::OpenTokenAccount {
                payer: request.taker,
                owner: request.maker,
                mint: record.mint_b,
            })
            .then(SettlementStep::Transfer {
                from: request.taker_ata_b,
                to: request.maker_ata_b,
                authority: request.taker,
                amount: record.receive,
            })
            .then(SettlementStep::Drain {
                from: request.vault,
                to: request.taker_ata_a,
                authority: request.escrow,
            })
            .then(SettlementStep::CloseTokenAccount {
                account: request.vault,
                authority: request.escrow,
                rent_recipient: request.maker,
            })
            .then(SettlementStep::CloseRecord {
                address: request.escrow,
                rent_recipient: request.maker,
            })
            .execute(ledger)?;

        msg!(
            "Escrow {} taken by {}: released {}, paid {}",
            request.escrow,
            request.taker,
            receipt.drained,
            receipt.transferred
        );
        Ok(TransitionOutcome::Taken {
            escrow: request.escrow,
            released: receipt.drained,
            paid: receipt.transferred,
            rent_returned: receipt.rent_returned,
        })
    }

    pub fn refund<L: SettlementLedger>(
        &self,
        ledger: &mut L,
        signer: &Pubkey,
        request: &RefundRequest,
    ) -> Result<TransitionOutcome> {
        let record = self.load_open(ledger, &request.escrow)?;
        require_keys_eq!(*signer, record.maker, EscrowError::Unauthorized);
        require_keys_eq!(request.maker, record.maker, EscrowError::Unauthorized);

        pda::verify_escrow_address(
            &self.program_id,
            &record.maker,
            record.seed,
            record.bump,
            &request.escrow,
        )?;
        require_keys_eq!(record.mint_a, request.mint_a, EscrowError::MintMismatch);
        pda::verify_vault_address(&request.escrow, &record.mint_a, &request.vault)?;
        pda::verify_token_address(&record.maker, &record.mint_a, &request.maker_ata_a)?;

        let receipt = SettlementPlan::new()
            .then(SettlementStep::OpenTokenAccount {
                payer: record.maker,
                owner: record.maker,
                mint: record.mint_a,
            })
            .then(SettlementStep::Drain {
                from: request.vault,
                to: request.maker_ata_a,
                authority: request.escrow,
            })
            .then(SettlementStep::CloseTokenAccount {
                account: request.vault,
                authority: request.escrow,
                rent_recipient: record.maker,
            })
            .then(SettlementStep::CloseRecord {
                address: request.escrow,
                rent_recipient: record.maker,
            })
            .execute(ledger)?;

        msg!("Escrow {} refunded: {} returned", request.escrow, receipt.drained);
        Ok(TransitionOutcome::Refunded {
            escrow: request.escrow,
            refunded: receipt.drained,
            rent_returned: receipt.rent_returned,
        })
    }

    fn load_open<L: AccountAllocation>(&self, ledger: &L, escrow: &Pubkey) -> Result<Escrow> {
        match self.state(ledger, escrow)? {
            EscrowState::Open(record) => Ok(record),
            EscrowState::Absent => err!(EscrowError::RecordNotFound),
        }
    }
}

/// Nothing lives at `address`, or only a system account holding lamports.
fn is_unclaimed<L: AccountAllocation>(ledger: &L, address: &Pubkey) -> bool {
    match ledger.account_owner(address) {
        None => true,
        Some(owner) => owner == system_program::ID && ledger.account_data(address).is_none(),
    }
}
