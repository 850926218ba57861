//! Integrity verification for the ledger.
//!
//! The ledger keeps two views of the same fact: each item's `used` flag and
//! the stock's index of unused positions. Crafted Foobars also point back at
//! the Foo and Bar they consumed. This module checks that:
//!
//! 1. For every stock, the unused index matches the `used` flags exactly.
//! 2. Every Foobar's `foo_used` / `bar_used` names an existing, used item of
//!    the right kind.
//! 3. No Foo or Bar backs more than one Foobar.
//! 4. The id index points at every mined item and at nothing else.
//!
//! These hold by construction. A violation produces a [`LedgerAnomaly`].

use std::collections::BTreeSet;

use factory_types::{ItemId, MinedKind};

use crate::ledger::{Consumable, Ledger, Stock};
use crate::LedgerAnomaly;

/// The result of a ledger audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// Every check passed.
    Consistent,
    /// At least one check failed.
    Anomaly(LedgerAnomaly),
}

impl AuditResult {
    /// Whether every check passed.
    pub const fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent)
    }
}

/// Run every integrity check over `ledger`.
pub fn verify(ledger: &Ledger) -> AuditResult {
    let mut problems = Vec::new();

    check_index("foo", ledger.mined_stock(MinedKind::Foo), &mut problems);
    check_index("bar", ledger.mined_stock(MinedKind::Bar), &mut problems);
    check_index("foobar", ledger.foobar_stock(), &mut problems);
    check_id_index(ledger, &mut problems);
    check_back_references(ledger, &mut problems);

    if problems.is_empty() {
        AuditResult::Consistent
    } else {
        let message = format!("LEDGER_ANOMALY: {}", problems.join("; "));
        AuditResult::Anomaly(LedgerAnomaly { problems, message })
    }
}

fn check_index<T: Consumable>(name: &str, stock: &Stock<T>, problems: &mut Vec<String>) {
    let unused = stock.unused_positions();
    let mut flagged: usize = 0;
    let mut mismatched = false;
    for (position, item) in stock.items().iter().enumerate() {
        if !item.is_used() {
            flagged = flagged.saturating_add(1);
        }
        mismatched |= item.is_used() == unused.contains(&position);
    }

    if mismatched || flagged != unused.len() {
        problems.push(format!(
            "{name} unused index has {} entries but {flagged} items are unused",
            unused.len()
        ));
    }
}

fn check_id_index(ledger: &Ledger, problems: &mut Vec<String>) {
    let index = ledger.mined_index();
    let mut mined: usize = 0;
    for kind in [MinedKind::Foo, MinedKind::Bar] {
        for (position, item) in ledger.mined(kind).iter().enumerate() {
            mined = mined.saturating_add(1);
            if index.get(&item.id) != Some(&(kind, position)) {
                problems.push(format!("{kind:?} item {} is missing from the id index", item.id));
            }
        }
    }
    if index.len() != mined {
        problems.push(format!(
            "id index has {} entries for {mined} mined items",
            index.len()
        ));
    }
}

fn check_back_references(ledger: &Ledger, problems: &mut Vec<String>) {
    let mut seen: BTreeSet<ItemId> = BTreeSet::new();

    for foobar in ledger.foobars() {
        for (expected, id) in [
            (MinedKind::Foo, foobar.foo_used),
            (MinedKind::Bar, foobar.bar_used),
        ] {
            match ledger.mined_item(id) {
                None => problems.push(format!("foobar {} links missing item {id}", foobar.id)),
                Some(item) if item.kind != expected => problems.push(format!(
                    "foobar {} links item {id} of kind {:?}, expected {expected:?}",
                    foobar.id, item.kind
                )),
                Some(item) if !item.used => problems.push(format!(
                    "foobar {} links item {id} which is still unused",
                    foobar.id
                )),
                Some(_) => {}
            }
            if !seen.insert(id) {
                problems.push(format!("item {id} backs more than one foobar"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use factory_types::ItemKind;

    use super::*;

    #[test]
    fn empty_ledger_is_consistent() {
        assert_eq!(verify(&Ledger::new()), AuditResult::Consistent);
    }

    #[test]
    fn ledger_after_trading_is_consistent() {
        let mut ledger = Ledger::with_stock(8, 4, 3, 1).unwrap_or_default();
        let mut txn = ledger.begin();
        let _ = txn.use_up_to(ItemKind::Foo, 6);
        let _ = txn.use_up_to(ItemKind::Foobar, 2);
        if let (Some(foo), Some(bar)) = (txn.use_one(ItemKind::Foo), txn.use_one(ItemKind::Bar)) {
            txn.craft_foobar(foo, bar, None);
        }
        txn.commit();
        assert!(ledger.audit().is_consistent());
    }

    #[test]
    fn foobar_linked_to_unused_material_is_flagged() {
        let mut ledger = Ledger::with_stock(1, 1, 0, 0).unwrap_or_default();
        let mut txn = ledger.begin();
        let foo = txn.ledger().mined(MinedKind::Foo).first().map(Consumable::consumed);
        let bar = txn.ledger().mined(MinedKind::Bar).first().map(Consumable::consumed);
        // Link the foobar without consuming the materials.
        if let (Some(foo), Some(bar)) = (foo, bar) {
            txn.craft_foobar(foo, bar, None);
        }
        txn.commit();

        let result = ledger.audit();
        assert!(!result.is_consistent());
        if let AuditResult::Anomaly(anomaly) = result {
            assert_eq!(anomaly.problems.len(), 2);
            assert!(anomaly.message.starts_with("LEDGER_ANOMALY"));
        }
    }
}
