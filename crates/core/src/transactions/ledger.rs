//! Balance ledger: the pure effect algebra behind box balances.
//!
//! Every box balance must equal the fold of all applied transaction effects
//! referencing it. This module computes those effects; applying them is the
//! storage layer's job and happens atomically with the row mutation.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::{MovementType, Transaction};

/// Direction in which a transaction's effect is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSign {
    Apply,
    Reverse,
}

impl EffectSign {
    fn factor(self) -> Decimal {
        match self {
            EffectSign::Apply => Decimal::ONE,
            EffectSign::Reverse => -Decimal::ONE,
        }
    }
}

/// A single signed delta against one box balance.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEffect {
    pub box_id: String,
    pub delta: Decimal,
}

/// Balance deltas implied by a transaction, scaled by `sign`.
///
/// Income adds to the source box, expense subtracts from it, transfer moves
/// the amount from source to destination.
pub fn effects_for(tx: &Transaction, sign: EffectSign) -> Vec<BalanceEffect> {
    let factor = sign.factor();
    match tx.movement_type {
        MovementType::Income => vec![BalanceEffect {
            box_id: tx.source_box_id.clone(),
            delta: tx.amount * factor,
        }],
        MovementType::Expense => vec![BalanceEffect {
            box_id: tx.source_box_id.clone(),
            delta: -tx.amount * factor,
        }],
        MovementType::Transfer => {
            let mut effects = vec![BalanceEffect {
                box_id: tx.source_box_id.clone(),
                delta: -tx.amount * factor,
            }];
            if let Some(dest) = &tx.dest_box_id {
                effects.push(BalanceEffect {
                    box_id: dest.clone(),
                    delta: tx.amount * factor,
                });
            }
            effects
        }
    }
}

/// Effects of editing a transaction: full reversal of the original followed
/// by full application of the updated record. Two discrete effect sets rather
/// than a diff, because the box identities may differ between the two (e.g. a
/// transfer's destination box changed on edit).
pub fn edit_effects(original: &Transaction, updated: &Transaction) -> Vec<BalanceEffect> {
    let mut effects = effects_for(original, EffectSign::Reverse);
    effects.extend(effects_for(updated, EffectSign::Apply));
    effects
}

/// Folds every transaction's effect exactly once into per-box balances.
///
/// The fold is commutative and associative, so the result is independent of
/// transaction order. This is the authoritative rebuild used for integrity
/// repair and as the reference oracle in tests.
pub fn fold_balances(transactions: &[Transaction]) -> HashMap<String, Decimal> {
    let mut balances: HashMap<String, Decimal> = HashMap::new();
    for tx in transactions {
        for effect in effects_for(tx, EffectSign::Apply) {
            *balances.entry(effect.box_id).or_insert(Decimal::ZERO) += effect.delta;
        }
    }
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn tx(
        movement_type: MovementType,
        amount: Decimal,
        source: &str,
        dest: Option<&str>,
    ) -> Transaction {
        Transaction {
            id: "tx".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            description: String::new(),
            amount,
            movement_type,
            category: "general".to_string(),
            project_id: None,
            source_box_id: source.to_string(),
            dest_box_id: dest.map(str::to_string),
            third_party_id: None,
            support_ref: None,
            synced: false,
            created_at: "2026-03-10T09:00:00Z".to_string(),
        }
    }

    #[test]
    fn income_credits_the_source_box() {
        let effects = effects_for(&tx(MovementType::Income, dec!(100), "a", None), EffectSign::Apply);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].delta, dec!(100));
    }

    #[test]
    fn expense_debits_the_source_box() {
        let effects = effects_for(
            &tx(MovementType::Expense, dec!(40), "a", None),
            EffectSign::Apply,
        );
        assert_eq!(effects[0].delta, dec!(-40));
    }

    #[test]
    fn transfer_moves_between_boxes() {
        let effects = effects_for(
            &tx(MovementType::Transfer, dec!(20), "a", Some("b")),
            EffectSign::Apply,
        );
        assert_eq!(effects.len(), 2);
        assert_eq!((effects[0].box_id.as_str(), effects[0].delta), ("a", dec!(-20)));
        assert_eq!((effects[1].box_id.as_str(), effects[1].delta), ("b", dec!(20)));
    }

    #[test]
    fn reverse_negates_the_applied_effect() {
        let transaction = tx(MovementType::Transfer, dec!(20), "a", Some("b"));
        let applied = effects_for(&transaction, EffectSign::Apply);
        let reversed = effects_for(&transaction, EffectSign::Reverse);
        for (apply, reverse) in applied.iter().zip(&reversed) {
            assert_eq!(apply.delta, -reverse.delta);
        }
    }

    #[test]
    fn edit_is_full_reversal_plus_full_application() {
        // (10000, a -> b) edited to (15000, a -> b): net a -= 5000, b += 5000.
        let original = tx(MovementType::Transfer, dec!(10000), "a", Some("b"));
        let updated = tx(MovementType::Transfer, dec!(15000), "a", Some("b"));

        let mut net: HashMap<String, Decimal> = HashMap::new();
        for effect in edit_effects(&original, &updated) {
            *net.entry(effect.box_id).or_insert(Decimal::ZERO) += effect.delta;
        }
        assert_eq!(net["a"], dec!(-5000));
        assert_eq!(net["b"], dec!(5000));
    }

    #[test]
    fn edit_handles_a_changed_destination_box() {
        let original = tx(MovementType::Transfer, dec!(10000), "a", Some("b"));
        let updated = tx(MovementType::Transfer, dec!(10000), "a", Some("c"));

        let mut net: HashMap<String, Decimal> = HashMap::new();
        for effect in edit_effects(&original, &updated) {
            *net.entry(effect.box_id).or_insert(Decimal::ZERO) += effect.delta;
        }
        assert_eq!(net["a"], dec!(0));
        assert_eq!(net["b"], dec!(-10000));
        assert_eq!(net["c"], dec!(10000));
    }

    #[test]
    fn fold_is_order_independent() {
        // [INCOME 100 -> a, EXPENSE 40 from a, TRANSFER 20 a -> b]
        // must yield a = 40, b = 20 regardless of fold order.
        let mut transactions = vec![
            tx(MovementType::Income, dec!(100), "a", None),
            tx(MovementType::Expense, dec!(40), "a", None),
            tx(MovementType::Transfer, dec!(20), "a", Some("b")),
        ];

        let forward = fold_balances(&transactions);
        transactions.reverse();
        let backward = fold_balances(&transactions);

        assert_eq!(forward["a"], dec!(40));
        assert_eq!(forward["b"], dec!(20));
        assert_eq!(forward, backward);
    }
}
