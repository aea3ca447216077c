//! Property-based tests for mutation planning.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use moneta_shared::types::{AccountId, TransactionId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::mutation::{plan_materialization, reconcile_deltas};
use super::types::{Transaction, TransactionStatus, TransactionType};
use crate::recurrence::RecurringInterval;

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    // Magnitudes up to 1,000,000.00 with cent precision.
    (0i64..100_000_000).prop_map(|n| Decimal::new(n, 2))
}

fn type_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![Just(TransactionType::Income), Just(TransactionType::Expense)]
}

fn interval_strategy() -> impl Strategy<Value = RecurringInterval> {
    prop_oneof![
        Just(RecurringInterval::Daily),
        Just(RecurringInterval::Weekly),
        Just(RecurringInterval::Monthly),
        Just(RecurringInterval::Yearly),
    ]
}

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24).prop_map(|(y, m, d, h)| {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    })
}

fn row(
    account: AccountId,
    transaction_type: TransactionType,
    amount: Decimal,
) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        user_id: UserId::new(),
        account_id: account,
        transaction_type,
        amount,
        date: Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap(),
        category: "misc".to_string(),
        description: String::new(),
        status: TransactionStatus::Completed,
        is_recurring: false,
        recurring_interval: None,
        last_processed: None,
        next_recurring_date: None,
    }
}

proptest! {
    /// Reconciliation deltas sum to the exact negative of the signed effect
    /// of everything removed, with one delta per distinct account.
    #[test]
    fn test_reconcile_reverses_total_effect(
        rows in prop::collection::vec(
            (0usize..4, type_strategy(), amount_strategy()),
            1..32,
        )
    ) {
        let accounts: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
        let rows: Vec<Transaction> = rows
            .into_iter()
            .map(|(slot, tt, amount)| row(accounts[slot], tt, amount))
            .collect();

        let deltas = reconcile_deltas(&rows);

        let removed: Decimal = rows.iter().map(Transaction::signed_amount).sum();
        let adjusted: Decimal = deltas.values().copied().sum();
        prop_assert_eq!(adjusted, -removed);

        let touched: BTreeSet<AccountId> = rows.iter().map(|t| t.account_id).collect();
        prop_assert_eq!(deltas.len(), touched.len());
    }

    /// A materialization plan always advances the template strictly past the
    /// processing instant and its delta matches the signed-amount convention.
    #[test]
    fn test_plan_monotonic_advance(
        now in instant_strategy(),
        interval in interval_strategy(),
        transaction_type in type_strategy(),
        amount in amount_strategy(),
    ) {
        let mut template = row(AccountId::new(), transaction_type, amount);
        template.is_recurring = true;
        template.recurring_interval = Some(interval);

        let plan = plan_materialization(&template, now).unwrap();

        prop_assert_eq!(plan.last_processed, now);
        prop_assert!(plan.next_recurring_date > now);
        prop_assert_eq!(plan.balance_delta, template.signed_amount());
        prop_assert!(!plan.entry.is_recurring);
    }
}
