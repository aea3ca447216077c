//! Balance-safe mutation planning.
//!
//! The engine never writes to the store piecemeal. This module produces
//! *plans*: complete descriptions of the rows to insert, the balance deltas
//! to apply, and the template fields to advance. The store executes a plan
//! as a single atomic unit, so a failure midway leaves state untouched and
//! an account's balance always matches its transaction set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use moneta_shared::types::{AccountId, TransactionId, UserId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::Transaction;
use crate::recurrence::next_occurrence;

/// Everything the store needs to materialize one due template atomically:
/// insert the entry, adjust the account balance, advance the template.
#[derive(Debug, Clone)]
pub struct MaterializationPlan {
    /// The template being materialized.
    pub template_id: TransactionId,
    /// Owning user.
    pub user_id: UserId,
    /// The account whose balance moves.
    pub account_id: AccountId,
    /// The new non-recurring ledger entry.
    pub entry: Transaction,
    /// Signed effective amount to add to the account balance.
    pub balance_delta: Decimal,
    /// New value for the template's `last_processed`.
    pub last_processed: DateTime<Utc>,
    /// New value for the template's `next_recurring_date`; strictly after
    /// `last_processed`.
    pub next_recurring_date: DateTime<Utc>,
    /// The template's `last_processed` as observed when planning. The store
    /// must compare-and-swap on this value inside the atomic unit so that two
    /// racing deliveries of the same work item cannot both materialize.
    pub observed_last_processed: Option<DateTime<Utc>>,
}

/// Plans the materialization of a due recurring template at `now`.
///
/// The new entry copies type, amount, category, account, and user from the
/// template, is dated `now`, is itself non-recurring, and carries a
/// description annotated as recurrence-derived.
///
/// # Errors
///
/// Returns an error if the transaction is not marked recurring or carries no
/// interval. Due-ness is deliberately not checked here: the store re-checks
/// it inside the atomic unit, where the answer cannot go stale.
pub fn plan_materialization(
    template: &Transaction,
    now: DateTime<Utc>,
) -> Result<MaterializationPlan, LedgerError> {
    if !template.is_recurring {
        return Err(LedgerError::NotRecurring(template.id));
    }
    let interval = template
        .recurring_interval
        .ok_or(LedgerError::MissingInterval(template.id))?;

    let entry = Transaction {
        id: TransactionId::new(),
        user_id: template.user_id,
        account_id: template.account_id,
        transaction_type: template.transaction_type,
        amount: template.amount,
        date: now,
        category: template.category.clone(),
        description: format!("{} (Recurring)", template.description),
        status: template.status,
        is_recurring: false,
        recurring_interval: None,
        last_processed: None,
        next_recurring_date: None,
    };

    Ok(MaterializationPlan {
        template_id: template.id,
        user_id: template.user_id,
        account_id: template.account_id,
        balance_delta: template.signed_amount(),
        entry,
        last_processed: now,
        next_recurring_date: next_occurrence(now, interval),
        observed_last_processed: template.last_processed,
    })
}

/// Computes the balance adjustments that reverse the effect of deleting the
/// given transactions.
///
/// Removing a transaction reverses its original effect, so each account's
/// adjustment is the *negative* of the sum of signed effective amounts being
/// removed. Rows against the same account coalesce into a single delta: the
/// store performs one balance write per distinct account touched, not one
/// per deleted row.
#[must_use]
pub fn reconcile_deltas<'a, I>(transactions: I) -> BTreeMap<AccountId, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut deltas: BTreeMap<AccountId, Decimal> = BTreeMap::new();
    for tx in transactions {
        *deltas.entry(tx.account_id).or_default() -= tx.signed_amount();
    }
    deltas
}
