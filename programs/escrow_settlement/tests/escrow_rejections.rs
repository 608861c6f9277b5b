//! Rejected transitions: each one fails with its own error and leaves the
//! ledger as it found it.

mod common;

use anchor_lang::prelude::*;
use common::{assert_escrow_error, Fixture, MAKER_A, SOL, TAKER_B};
use escrow_settlement::{
    engine::{AccountAllocation, EscrowState},
    errors::EscrowError,
    state::Escrow,
};

const SEED: u64 = 2002;
const DEPOSIT: u64 = 1_000_000;
const RECEIVE: u64 = 2_000_000;

fn opened() -> Fixture {
    let mut fx = Fixture::new();
    fx.make(SEED, DEPOSIT, RECEIVE).unwrap();
    fx
}

#[test]
fn zero_amounts_are_invalid() {
    let mut fx = Fixture::new();

    assert_escrow_error(fx.make(SEED, 0, RECEIVE), EscrowError::InvalidAmount);
    assert_escrow_error(fx.make(SEED, DEPOSIT, 0), EscrowError::InvalidAmount);

    assert!(!fx.ledger.exists(&fx.escrow_address(SEED)));
    assert!(!fx.ledger.exists(&fx.vault_address(SEED)));
    assert_eq!(fx.ledger.lamports(&fx.maker), 10 * SOL);
}

#[test]
fn make_beyond_balance_creates_nothing() {
    let mut fx = Fixture::new();

    assert_escrow_error(
        fx.make(SEED, MAKER_A + 1, RECEIVE),
        EscrowError::InsufficientFunds,
    );

    assert!(!fx.ledger.exists(&fx.escrow_address(SEED)));
    assert!(!fx.ledger.exists(&fx.vault_address(SEED)));
    assert_eq!(fx.balance(&fx.maker, &fx.mint_a), MAKER_A);
    assert_eq!(fx.ledger.lamports(&fx.maker), 10 * SOL);
}

#[test]
fn make_without_token_account_is_insufficient() {
    let mut fx = Fixture::new();
    // taker holds no mint_a account at all
    std::mem::swap(&mut fx.maker, &mut fx.taker);

    assert_escrow_error(fx.make(SEED, DEPOSIT, RECEIVE), EscrowError::InsufficientFunds);
}

#[test]
fn open_seed_cannot_be_made_twice() {
    let mut fx = opened();
    let maker_lamports = fx.ledger.lamports(&fx.maker);

    assert_escrow_error(fx.make(SEED, 1, 1), EscrowError::AddressCollision);

    let record = fx.ledger.escrow(&fx.escrow_address(SEED)).unwrap();
    assert_eq!(record.receive, RECEIVE);
    assert_eq!(fx.balance(&fx.escrow_address(SEED), &fx.mint_a), DEPOSIT);
    assert_eq!(fx.balance(&fx.maker, &fx.mint_a), MAKER_A - DEPOSIT);
    assert_eq!(fx.ledger.lamports(&fx.maker), maker_lamports);
}

#[test]
fn lamports_at_escrow_address_do_not_block_make() {
    let mut fx = Fixture::new();
    let escrow = fx.escrow_address(SEED);
    fx.ledger.fund(&escrow, 1).unwrap();

    assert_eq!(fx.engine.state(&fx.ledger, &escrow).unwrap(), EscrowState::Absent);
    assert_escrow_error(fx.take(SEED), EscrowError::RecordNotFound);

    fx.make(SEED, DEPOSIT, RECEIVE).unwrap();
    assert!(fx.ledger.escrow(&escrow).is_some());
    assert_eq!(
        fx.ledger.lamports(&escrow),
        Rent::default().minimum_balance(Escrow::SPACE)
    );
}

#[test]
fn lamports_at_vault_address_do_not_block_make() {
    let mut fx = Fixture::new();
    let vault = fx.vault_address(SEED);
    fx.ledger.fund(&vault, 1).unwrap();

    fx.make(SEED, DEPOSIT, RECEIVE).unwrap();
    assert_eq!(fx.balance(&fx.escrow_address(SEED), &fx.mint_a), DEPOSIT);
}

#[test]
fn program_owned_account_at_escrow_address_collides() {
    let mut fx = Fixture::new();
    let escrow = fx.escrow_address(SEED);
    let maker = fx.maker;
    fx.ledger
        .create_account(&escrow, &Pubkey::new_unique(), 8, &maker)
        .unwrap();

    assert_eq!(fx.engine.state(&fx.ledger, &escrow).unwrap(), EscrowState::Absent);
    assert_escrow_error(fx.make(SEED, DEPOSIT, RECEIVE), EscrowError::AddressCollision);
    assert_escrow_error(fx.take(SEED), EscrowError::RecordNotFound);
}

#[test]
fn same_mint_on_both_legs_is_rejected() {
    let mut fx = Fixture::new();
    fx.mint_b = fx.mint_a;

    assert_escrow_error(fx.make(SEED, DEPOSIT, RECEIVE), EscrowError::SelfSwap);
    assert!(!fx.ledger.exists(&fx.escrow_address(SEED)));
}

#[test]
fn unknown_mint_is_rejected() {
    let mut fx = Fixture::new();
    fx.mint_b = Pubkey::new_unique();

    assert_escrow_error(fx.make(SEED, DEPOSIT, RECEIVE), EscrowError::InvalidMint);
    assert!(!fx.ledger.exists(&fx.escrow_address(SEED)));
}

#[test]
fn make_with_non_canonical_addresses_is_rejected() {
    let mut fx = Fixture::new();
    let maker = fx.maker;

    let mut request = fx.make_request(SEED, DEPOSIT, RECEIVE);
    request.escrow = Pubkey::new_unique();
    assert_escrow_error(
        fx.engine.make(&mut fx.ledger, &maker, &request),
        EscrowError::AddressMismatch,
    );

    let mut request = fx.make_request(SEED, DEPOSIT, RECEIVE);
    request.vault = Pubkey::new_unique();
    assert_escrow_error(
        fx.engine.make(&mut fx.ledger, &maker, &request),
        EscrowError::AddressMismatch,
    );

    let mut request = fx.make_request(SEED, DEPOSIT, RECEIVE);
    request.maker_ata_a = fx.vault_address(SEED);
    assert_escrow_error(
        fx.engine.make(&mut fx.ledger, &maker, &request),
        EscrowError::AddressMismatch,
    );
    assert!(!fx.ledger.exists(&fx.escrow_address(SEED)));
}

#[test]
fn make_must_be_signed_by_maker() {
    let mut fx = Fixture::new();
    let request = fx.make_request(SEED, DEPOSIT, RECEIVE);
    let taker = fx.taker;

    assert_escrow_error(
        fx.engine.make(&mut fx.ledger, &taker, &request),
        EscrowError::Unauthorized,
    );
}

#[test]
fn only_the_maker_can_refund() {
    let mut fx = opened();
    let taker = fx.taker;

    let request = fx.refund_request(SEED);
    assert_escrow_error(
        fx.engine.refund(&mut fx.ledger, &taker, &request),
        EscrowError::Unauthorized,
    );

    // naming yourself as maker does not help either
    let mut request = fx.refund_request(SEED);
    request.maker = taker;
    assert_escrow_error(
        fx.engine.refund(&mut fx.ledger, &taker, &request),
        EscrowError::Unauthorized,
    );

    assert_eq!(fx.balance(&fx.escrow_address(SEED), &fx.mint_a), DEPOSIT);
    assert!(fx.ledger.escrow(&fx.escrow_address(SEED)).is_some());
}

#[test]
fn refund_with_wrong_mint_is_rejected() {
    let mut fx = opened();
    let maker = fx.maker;
    let request = escrow_settlement::engine::RefundRequest::new(
        maker,
        fx.escrow_address(SEED),
        fx.mint_b,
    );

    assert_escrow_error(
        fx.engine.refund(&mut fx.ledger, &maker, &request),
        EscrowError::MintMismatch,
    );
}

#[test]
fn closed_escrow_cannot_settle_again() {
    let mut fx = opened();
    fx.take(SEED).unwrap();

    assert_escrow_error(fx.take(SEED), EscrowError::RecordNotFound);
    assert_escrow_error(fx.refund(SEED), EscrowError::RecordNotFound);

    let mut fx = opened();
    fx.refund(SEED).unwrap();

    assert_escrow_error(fx.refund(SEED), EscrowError::RecordNotFound);
    assert_escrow_error(fx.take(SEED), EscrowError::RecordNotFound);
}

#[test]
fn never_made_escrow_is_not_found() {
    let mut fx = Fixture::new();

    assert_escrow_error(fx.take(SEED), EscrowError::RecordNotFound);
    assert_escrow_error(fx.refund(SEED), EscrowError::RecordNotFound);
}

#[test]
fn short_taker_leaves_escrow_open() {
    let mut fx = Fixture::new();
    fx.make(SEED, DEPOSIT, TAKER_B + 1).unwrap();

    assert_escrow_error(fx.take(SEED), EscrowError::InsufficientFunds);

    let escrow = fx.escrow_address(SEED);
    assert!(fx.ledger.escrow(&escrow).is_some());
    assert_eq!(fx.balance(&escrow, &fx.mint_a), DEPOSIT);
    assert_eq!(fx.balance(&fx.taker, &fx.mint_b), TAKER_B);
    assert_eq!(fx.balance(&fx.maker, &fx.mint_b), 0);
    assert!(!fx.ledger.exists(&fx.take_request(SEED).taker_ata_a));
    assert_eq!(fx.ledger.lamports(&fx.taker), 10 * SOL);
}

#[test]
fn take_with_other_mints_is_rejected() {
    let mut fx = opened();
    let taker = fx.taker;
    let other = fx.ledger.create_mint(6);

    let mut request = fx.take_request(SEED);
    request.mint_b = other;
    assert_escrow_error(
        fx.engine.take(&mut fx.ledger, &taker, &request),
        EscrowError::MintMismatch,
    );

    let mut request = fx.take_request(SEED);
    request.mint_a = other;
    assert_escrow_error(
        fx.engine.take(&mut fx.ledger, &taker, &request),
        EscrowError::MintMismatch,
    );
}

#[test]
fn take_naming_the_wrong_maker_is_rejected() {
    let mut fx = opened();
    let taker = fx.taker;

    let mut request = fx.take_request(SEED);
    request.maker = taker;
    assert_escrow_error(
        fx.engine.take(&mut fx.ledger, &taker, &request),
        EscrowError::AddressMismatch,
    );
}

#[test]
fn take_into_non_canonical_accounts_is_rejected() {
    let mut fx = opened();
    let taker = fx.taker;

    let mut request = fx.take_request(SEED);
    request.vault = Pubkey::new_unique();
    assert_escrow_error(
        fx.engine.take(&mut fx.ledger, &taker, &request),
        EscrowError::AddressMismatch,
    );

    // paying mint_b to the taker's own account instead of the maker's
    let mut request = fx.take_request(SEED);
    request.maker_ata_b = request.taker_ata_b;
    assert_escrow_error(
        fx.engine.take(&mut fx.ledger, &taker, &request),
        EscrowError::AddressMismatch,
    );

    assert_eq!(fx.balance(&fx.escrow_address(SEED), &fx.mint_a), DEPOSIT);
}

#[test]
fn take_must_be_signed_by_taker() {
    let mut fx = opened();
    let request = fx.take_request(SEED);
    let stranger = Pubkey::new_unique();

    assert_escrow_error(
        fx.engine.take(&mut fx.ledger, &stranger, &request),
        EscrowError::Unauthorized,
    );
    assert_eq!(fx.balance(&fx.taker, &fx.mint_b), TAKER_B);
}
