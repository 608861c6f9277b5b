//! Settlement executor: applies a transition's mutations as one unit.
//!
//! A plan runs against a staged copy of the ledger and is committed only when
//! every step succeeded, so a failed transition leaves no trace.

use anchor_lang::prelude::*;

use super::custody::{AccountAllocation, SettlementLedger, TokenCustody};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettlementStep {
    /// Open the associated token account of `owner` for `mint` if absent
    OpenTokenAccount {
        payer: Pubkey,
        owner: Pubkey,
        mint: Pubkey,
    },
    AllocateRecord {
        address: Pubkey,
        owner: Pubkey,
        size: usize,
        payer: Pubkey,
    },
    WriteRecord { address: Pubkey, data: Vec<u8> },
    Transfer {
        from: Pubkey,
        to: Pubkey,
        authority: Pubkey,
        amount: u64,
    },
    /// Move whatever `from` holds when the step runs
    Drain {
        from: Pubkey,
        to: Pubkey,
        authority: Pubkey,
    },
    CloseTokenAccount {
        account: Pubkey,
        authority: Pubkey,
        rent_recipient: Pubkey,
    },
    CloseRecord { address: Pubkey, rent_recipient: Pubkey },
}

/// What a committed plan moved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementReceipt {
    /// Tokens moved by `Transfer` steps
    pub transferred: u64,
    /// Tokens moved by `Drain` steps
    pub drained: u64,
    /// Lamports returned by closed accounts
    pub rent_returned: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    steps: Vec<SettlementStep>,
}

impl SettlementPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: SettlementStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[SettlementStep] {
        &self.steps
    }

    /// Apply every step or none of them.
    pub fn execute<L: SettlementLedger>(&self, ledger: &mut L) -> Result<SettlementReceipt> {
        let mut staged = ledger.clone();
        let mut receipt = SettlementReceipt::default();
        for step in &self.steps {
            step.apply(&mut staged, &mut receipt)?;
        }
        *ledger = staged;
        Ok(receipt)
    }
}

impl SettlementStep {
    fn apply<L: SettlementLedger>(&self, ledger: &mut L, receipt: &mut SettlementReceipt) -> Result<()> {
        match self {
            Self::OpenTokenAccount { payer, owner, mint } => {
                ledger.open_account(payer, owner, mint)?;
            }
            Self::AllocateRecord {
                address,
                owner,
                size,
                payer,
            } => ledger.create_account(address, owner, *size, payer)?,
            Self::WriteRecord { address, data } => ledger.write_account_data(address, data)?,
            Self::Transfer {
                from,
                to,
                authority,
                amount,
            } => {
                ledger.transfer(from, to, authority, *amount)?;
                receipt.transferred += amount;
            }
            Self::Drain {
                from,
                to,
                authority,
            } => {
                let amount = ledger.balance_of(from)?;
                ledger.transfer(from, to, authority, amount)?;
                receipt.drained += amount;
            }
            Self::CloseTokenAccount {
                account,
                authority,
                rent_recipient,
            } => {
                receipt.rent_returned +=
                    TokenCustody::close_account(ledger, account, authority, rent_recipient)?;
            }
            Self::CloseRecord {
                address,
                rent_recipient,
            } => {
                receipt.rent_returned +=
                    AccountAllocation::close_account(ledger, address, rent_recipient)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ledger::Ledger;

    #[test]
    fn committed_plan_reports_movements() {
        let mut ledger = Ledger::new();
        let mint = ledger.create_mint(6);
        let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());
        ledger.fund(&bob, 1_000_000_000).unwrap();
        let from = ledger.mint_to(&alice, &mint, 70).unwrap();
        let to = crate::pda::derive_token_address(&bob, &mint).0;

        let plan = SettlementPlan::new()
            .then(SettlementStep::OpenTokenAccount {
                payer: bob,
                owner: bob,
                mint,
            })
            .then(SettlementStep::Transfer {
                from,
                to,
                authority: alice,
                amount: 20,
            })
            .then(SettlementStep::Drain {
                from,
                to,
                authority: alice,
            })
            .then(SettlementStep::CloseTokenAccount {
                account: from,
                authority: alice,
                rent_recipient: alice,
            });
        assert_eq!(plan.steps().len(), 4);
        assert!(matches!(plan.steps()[0], SettlementStep::OpenTokenAccount { .. }));

        let receipt = plan.execute(&mut ledger).unwrap();
        assert_eq!(receipt.transferred, 20);
        assert_eq!(receipt.drained, 50);
        assert!(receipt.rent_returned > 0);
        assert_eq!(ledger.balance_of(&to).unwrap(), 70);
        assert!(!ledger.exists(&from));
    }

    #[test]
    fn failing_step_leaves_ledger_untouched() {
        let mut ledger = Ledger::new();
        let mint = ledger.create_mint(6);
        let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());
        let from = ledger.mint_to(&alice, &mint, 10).unwrap();
        let to = ledger.mint_to(&bob, &mint, 0).unwrap();

        let result = SettlementPlan::new()
            .then(SettlementStep::Transfer {
                from,
                to,
                authority: alice,
                amount: 10,
            })
            // bob holds only 10 at this point
            .then(SettlementStep::Transfer {
                from: to,
                to: from,
                authority: bob,
                amount: 11,
            })
            .execute(&mut ledger);

        assert!(result.is_err());
        assert_eq!(ledger.balance_of(&from).unwrap(), 10);
        assert_eq!(ledger.balance_of(&to).unwrap(), 0);
    }
}
