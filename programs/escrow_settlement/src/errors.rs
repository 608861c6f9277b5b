use anchor_lang::prelude::*;

#[error_code]
pub enum EscrowError {
    #[msg("Invalid amount: amount must be greater than zero")]
    InvalidAmount,
    #[msg("Insufficient funds: source balance is lower than the amount to move")]
    InsufficientFunds,
    #[msg("Address mismatch: account does not match its canonical derivation")]
    AddressMismatch,
    #[msg("Address collision: an escrow is already open at this address")]
    AddressCollision,
    #[msg("Record not found: no open escrow at this address")]
    RecordNotFound,
    #[msg("Unauthorized: signer does not match the required identity")]
    Unauthorized,
    #[msg("Mint mismatch: mint does not match the escrow record")]
    MintMismatch,
    #[msg("Self swap: mint_a and mint_b must differ")]
    SelfSwap,
    #[msg("Invalid mint: account is not a token mint")]
    InvalidMint,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Account not found")]
    AccountNotFound,
}
