//! Shared fixtures for the engine tests: one maker, one taker, two mints.

#![allow(dead_code)]

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_error::ProgramError;
use escrow_settlement::{
    engine::{
        EscrowEngine, Ledger, MakeRequest, RefundRequest, TakeRequest, TokenCustody,
        TransitionOutcome,
    },
    errors::EscrowError,
    pda,
};

pub const SOL: u64 = 1_000_000_000;
pub const MAKER_A: u64 = 5_000_000;
pub const TAKER_B: u64 = 5_000_000;

pub struct Fixture {
    pub ledger: Ledger,
    pub engine: EscrowEngine,
    pub maker: Pubkey,
    pub taker: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
}

impl Fixture {
    pub fn new() -> Self {
        let mut ledger = Ledger::new();
        let maker = Pubkey::new_unique();
        let taker = Pubkey::new_unique();
        ledger.fund(&maker, 10 * SOL).unwrap();
        ledger.fund(&taker, 10 * SOL).unwrap();

        let mint_a = ledger.create_mint(6);
        let mint_b = ledger.create_mint(6);
        ledger.mint_to(&maker, &mint_a, MAKER_A).unwrap();
        ledger.mint_to(&taker, &mint_b, TAKER_B).unwrap();

        Self {
            ledger,
            engine: EscrowEngine::new(escrow_settlement::ID),
            maker,
            taker,
            mint_a,
            mint_b,
        }
    }

    pub fn escrow_address(&self, seed: u64) -> Pubkey {
        pda::derive_escrow_address(&escrow_settlement::ID, &self.maker, seed).0
    }

    pub fn vault_address(&self, seed: u64) -> Pubkey {
        pda::derive_vault_address(&self.escrow_address(seed), &self.mint_a).0
    }

    pub fn make_request(&self, seed: u64, deposit: u64, receive: u64) -> MakeRequest {
        MakeRequest::new(
            &escrow_settlement::ID,
            self.maker,
            self.mint_a,
            self.mint_b,
            seed,
            deposit,
            receive,
        )
    }

    pub fn take_request(&self, seed: u64) -> TakeRequest {
        TakeRequest::new(
            self.taker,
            self.maker,
            self.escrow_address(seed),
            self.mint_a,
            self.mint_b,
        )
    }

    pub fn refund_request(&self, seed: u64) -> RefundRequest {
        RefundRequest::new(self.maker, self.escrow_address(seed), self.mint_a)
    }

    pub fn make(&mut self, seed: u64, deposit: u64, receive: u64) -> Result<TransitionOutcome> {
        let request = self.make_request(seed, deposit, receive);
        let maker = self.maker;
        self.engine.make(&mut self.ledger, &maker, &request)
    }

    pub fn take(&mut self, seed: u64) -> Result<TransitionOutcome> {
        let request = self.take_request(seed);
        let taker = self.taker;
        self.engine.take(&mut self.ledger, &taker, &request)
    }

    pub fn refund(&mut self, seed: u64) -> Result<TransitionOutcome> {
        let request = self.refund_request(seed);
        let maker = self.maker;
        self.engine.refund(&mut self.ledger, &maker, &request)
    }

    /// Token balance of `owner`'s associated account for `mint`, zero if absent.
    pub fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        let (address, _) = pda::derive_token_address(owner, mint);
        self.ledger.balance_of(&address).unwrap_or(0)
    }
}

pub fn assert_escrow_error<T: std::fmt::Debug>(result: Result<T>, expected: EscrowError) {
    let err = result.expect_err("transition should have been rejected");
    assert_eq!(
        ProgramError::from(err),
        ProgramError::from(anchor_lang::error::Error::from(expected)),
        "expected {expected}"
    );
}
