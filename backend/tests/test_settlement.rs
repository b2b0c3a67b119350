//! Settlement Tests
//!
//! Greedy transfer minimization and the propose/agree/complete lifecycle.

use mrtz_betting_core_rs::{
    compute_transfers, EntryDraft, EntryStatus, EntryType, Ledger, LedgerError, PartyRole,
    Settlement, SettlementError, SettlementStatus, EPSILON,
};
use proptest::prelude::*;
use std::collections::HashMap;

// ============================================================================
// Test Helpers
// ============================================================================

fn balances(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries.iter().map(|(p, v)| (p.to_string(), *v)).collect()
}

fn debt_entry(ledger: &mut Ledger, from: &str, to: &str, amount: f64, now_ms: i64) -> String {
    ledger
        .create_entry(
            EntryDraft {
                entry_type: EntryType::BetWin,
                round_id: Some("r1".to_string()),
                from_player_id: Some(from.to_string()),
                to_player_id: Some(to.to_string()),
                participants: vec![],
                amount,
                status: EntryStatus::Confirmed,
                description: "round winnings".to_string(),
            },
            now_ms,
        )
        .unwrap()
}

/// Propose a settlement over a simple zero-sum plan and the given entries
fn pending_settlement(transaction_ids: Vec<String>) -> Settlement {
    let plan = compute_transfers(&balances(&[("p1", -4.0), ("p2", 4.0)]));
    Settlement::from_plan(&plan, transaction_ids, 1_000)
}

// ============================================================================
// Transfer Computation
// ============================================================================

#[test]
fn test_single_creditor_collects_from_each_debtor() {
    let plan = compute_transfers(&balances(&[("p1", 5.0), ("p2", -3.0), ("p3", -2.0)]));

    assert_eq!(plan.transfers.len(), 2);
    assert!(plan.transfers.iter().all(|t| t.to == "p1"));
    let total: f64 = plan.transfers.iter().map(|t| t.amount).sum();
    assert!((total - 5.0).abs() < EPSILON);
}

#[test]
fn test_largest_debtor_pays_largest_creditor_first() {
    let plan = compute_transfers(&balances(&[
        ("p1", 6.0),
        ("p2", 1.0),
        ("p3", -5.0),
        ("p4", -2.0),
    ]));

    assert_eq!(plan.transfers[0].from, "p3");
    assert_eq!(plan.transfers[0].to, "p1");
    assert_eq!(plan.transfers[0].amount, 5.0);
}

#[test]
fn test_transfer_order_is_deterministic_under_amount_ties() {
    let first = compute_transfers(&balances(&[("a", -2.0), ("b", -2.0), ("c", 4.0)]));
    let second = compute_transfers(&balances(&[("a", -2.0), ("b", -2.0), ("c", 4.0)]));

    assert_eq!(first.transfers, second.transfers);
    assert_eq!(first.transfers[0].from, "a"); // ID tie-break
}

#[test]
fn test_near_zero_balances_are_already_settled() {
    let plan = compute_transfers(&balances(&[("p1", 0.004), ("p2", -0.004)]));

    assert!(plan.transfers.is_empty());
}

#[test]
fn test_residual_surfaces_credit_only_imbalance() {
    // Skins credits with no matching debits: nothing to transfer internally
    let plan = compute_transfers(&balances(&[("p1", 3.0)]));

    assert!(plan.transfers.is_empty());
    assert_eq!(plan.residual, 3.0);
}

proptest! {
    /// For any zero-sum balance map, the plan pays every player down within
    /// tolerance and uses at most n-1 transfers.
    #[test]
    fn prop_zero_sum_balances_fully_settle(
        raw in proptest::collection::vec(-10_000i64..10_000, 2..8)
    ) {
        // Force zero-sum by making the last player absorb the rest
        let sum: i64 = raw.iter().take(raw.len() - 1).sum();
        let mut map = HashMap::new();
        for (i, cents) in raw.iter().take(raw.len() - 1).enumerate() {
            map.insert(format!("p{i}"), *cents as f64 / 100.0);
        }
        map.insert("last".to_string(), -sum as f64 / 100.0);

        let plan = compute_transfers(&map);

        let mut net = map.clone();
        for t in &plan.transfers {
            prop_assert!(t.amount > 0.0);
            *net.get_mut(&t.from).unwrap() += t.amount;
            *net.get_mut(&t.to).unwrap() -= t.amount;
        }
        // Players within EPSILON are never matched, so the worst residue is
        // one epsilon per player
        let tolerance = EPSILON * map.len() as f64;
        for (player, residue) in &net {
            prop_assert!(
                residue.abs() <= tolerance,
                "{player} left with {residue}"
            );
        }

        let nonzero = map.values().filter(|v| v.abs() > EPSILON).count();
        prop_assert!(plan.transfers.len() <= nonzero.saturating_sub(1));
        prop_assert!(plan.residual.abs() < EPSILON);
    }
}

// ============================================================================
// Settlement Lifecycle
// ============================================================================

#[test]
fn test_from_plan_aggregates_parties_per_player() {
    let plan = compute_transfers(&balances(&[("p1", 5.0), ("p2", -3.0), ("p3", -2.0)]));
    let settlement = Settlement::from_plan(&plan, vec![], 1_000);

    assert_eq!(settlement.status(), SettlementStatus::Pending);
    assert_eq!(settlement.parties().len(), 3);
    assert_eq!(settlement.total_mrtz(), 5.0);

    let receiver = settlement
        .parties()
        .iter()
        .find(|p| p.player_id == "p1")
        .unwrap();
    assert_eq!(receiver.role, PartyRole::Receiver);
    assert_eq!(receiver.amount, 5.0);
    assert!(!receiver.agreed);
}

#[test]
fn test_settlement_agreed_once_every_party_signs() {
    let mut settlement = pending_settlement(vec![]);

    settlement.record_agreement("p1", 2_000).unwrap();
    assert_eq!(settlement.status(), SettlementStatus::Pending);

    settlement.record_agreement("p2", 3_000).unwrap();
    assert_eq!(settlement.status(), SettlementStatus::Agreed);
}

#[test]
fn test_outsiders_cannot_agree() {
    let mut settlement = pending_settlement(vec![]);

    let result = settlement.record_agreement("stranger", 2_000);
    assert_eq!(
        result,
        Err(SettlementError::UnknownParty("stranger".to_string()))
    );
}

#[test]
fn test_complete_requires_full_agreement() {
    let mut ledger = Ledger::new();
    let mut settlement = pending_settlement(vec![]);

    let result = settlement.complete(&mut ledger, "p1", 2_000);
    assert_eq!(
        result,
        Err(SettlementError::WrongState(SettlementStatus::Pending))
    );
}

#[test]
fn test_complete_marks_referenced_entries_settled() {
    let mut ledger = Ledger::new();
    let txn = debt_entry(&mut ledger, "p1", "p2", 4.0, 1_000);
    let mut settlement = pending_settlement(vec![txn.clone()]);
    settlement.record_agreement("p1", 2_000).unwrap();
    settlement.record_agreement("p2", 2_000).unwrap();

    settlement.complete(&mut ledger, "p1", 3_000).unwrap();

    assert_eq!(settlement.status(), SettlementStatus::Completed);
    let entry = ledger.get_entry(&txn).unwrap();
    assert_eq!(entry.status(), EntryStatus::Settled);
    assert_eq!(entry.settlement_id(), Some(settlement.settlement_id()));
    assert_eq!(entry.settled_by(), Some("p1"));
}

#[test]
fn test_complete_validates_every_reference_before_touching_any() {
    let mut ledger = Ledger::new();
    let good = debt_entry(&mut ledger, "p1", "p2", 4.0, 1_000);
    let mut settlement = pending_settlement(vec![good.clone(), "ghost".to_string()]);
    settlement.record_agreement("p1", 2_000).unwrap();
    settlement.record_agreement("p2", 2_000).unwrap();

    let result = settlement.complete(&mut ledger, "p1", 3_000);

    assert_eq!(
        result,
        Err(SettlementError::Ledger(LedgerError::UnknownTransaction(
            "ghost".to_string()
        )))
    );
    // The good entry was not half-settled
    assert_eq!(ledger.get_entry(&good).unwrap().status(), EntryStatus::Confirmed);
    assert_eq!(settlement.status(), SettlementStatus::Agreed);
}

#[test]
fn test_completing_twice_fails() {
    let mut ledger = Ledger::new();
    let mut settlement = pending_settlement(vec![]);
    settlement.record_agreement("p1", 2_000).unwrap();
    settlement.record_agreement("p2", 2_000).unwrap();
    settlement.complete(&mut ledger, "p1", 3_000).unwrap();

    let result = settlement.complete(&mut ledger, "p1", 4_000);
    assert_eq!(
        result,
        Err(SettlementError::WrongState(SettlementStatus::Completed))
    );
}

#[test]
fn test_reject_blocks_completion() {
    let mut ledger = Ledger::new();
    let mut settlement = pending_settlement(vec![]);

    settlement.reject(2_000).unwrap();
    assert_eq!(settlement.status(), SettlementStatus::Rejected);

    assert!(settlement.record_agreement("p1", 3_000).is_err());
    assert!(settlement.complete(&mut ledger, "p1", 3_000).is_err());
    // A rejected settlement stays rejected
    assert_eq!(
        settlement.reject(4_000),
        Err(SettlementError::WrongState(SettlementStatus::Rejected))
    );
}
