//! Off-chain settlement engine.
//!
//! Runs the make/take/refund state machine against an explicit account store
//! instead of the runtime, sharing address derivation, the record layout and
//! the error codes with the on-chain program.

pub mod custody;
pub mod executor;
pub mod ledger;
pub mod machine;
pub mod request;

pub use custody::{AccountAllocation, SettlementLedger, TokenAccountState, TokenCustody};
pub use executor::{SettlementPlan, SettlementReceipt, SettlementStep};
pub use ledger::{AccountKind, Ledger, LedgerAccount};
pub use machine::{EscrowEngine, EscrowState, TransitionOutcome};
pub use request::{MakeRequest, RefundRequest, TakeRequest, TransitionRequest};
