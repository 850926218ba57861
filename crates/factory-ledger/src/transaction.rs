//! Journaled ledger transactions.
//!
//! A [`LedgerTxn`] is the only way to mutate a [`Ledger`]. Each mutation is
//! recorded in an undo journal. [`LedgerTxn::commit`] discards the journal;
//! dropping the transaction without committing replays it in reverse, leaving
//! the ledger exactly as it was when the transaction began.
//!
//! This is what makes a robot's tick atomic: its effect runs inside one
//! transaction, and if anything after the effect fails, no material is
//! consumed and no currency moves.

use tracing::warn;

use factory_types::{ConsumedItem, FoobarId, ItemId, ItemKind, MinedKind, RobotId};

use crate::ledger::Ledger;
use crate::LedgerError;

/// One reversible ledger change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Undo {
    /// An item of this kind was appended.
    Pushed(ItemKind),
    /// The item at this position was flagged used.
    Used(ItemKind, usize),
    /// Currency was changed from this prior balance.
    Currency(i64),
}

/// An open, uncommitted set of ledger changes.
#[derive(Debug)]
#[must_use = "a transaction rolls back when dropped without commit"]
pub struct LedgerTxn<'a> {
    ledger: &'a mut Ledger,
    journal: Vec<Undo>,
}

impl<'a> LedgerTxn<'a> {
    pub(crate) const fn new(ledger: &'a mut Ledger) -> Self {
        Self {
            ledger,
            journal: Vec::new(),
        }
    }

    /// Read-only view of the ledger including uncommitted changes.
    pub fn ledger(&self) -> &Ledger {
        self.ledger
    }

    /// Number of unused items of `kind`.
    pub fn count_unused(&self, kind: ItemKind) -> u32 {
        self.ledger.count_unused(kind)
    }

    /// Current currency balance.
    pub fn currency(&self) -> i64 {
        self.ledger.currency()
    }

    /// Create one unused Foo or Bar.
    pub fn mine(&mut self, kind: MinedKind, producer_id: Option<RobotId>) -> ItemId {
        let id = self.ledger.push_mined(kind, producer_id);
        self.journal.push(Undo::Pushed(kind.into()));
        id
    }

    /// Create one unsold Foobar linked to the consumed materials.
    pub fn craft_foobar(
        &mut self,
        foo: ConsumedItem,
        bar: ConsumedItem,
        producer_id: Option<RobotId>,
    ) -> FoobarId {
        let id = self.ledger.push_foobar(foo, bar, producer_id);
        self.journal.push(Undo::Pushed(ItemKind::Foobar));
        id
    }

    /// Mark one unused item of `kind` as used and return it, or `None` if
    /// none are available.
    pub fn use_one(&mut self, kind: ItemKind) -> Option<ConsumedItem> {
        let (position, item) = self.ledger.take_one(kind)?;
        self.journal.push(Undo::Used(kind, position));
        Some(item)
    }

    /// Mark up to `n` unused items of `kind` as used. Returns how many were
    /// actually consumed, which never exceeds what was available.
    pub fn use_up_to(&mut self, kind: ItemKind, n: u32) -> u32 {
        let mut consumed: u32 = 0;
        while consumed < n {
            if self.use_one(kind).is_none() {
                break;
            }
            consumed = consumed.saturating_add(1);
        }
        consumed
    }

    /// Add `n` to the currency balance. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CurrencyOverflow`] if the balance would leave
    /// the `i64` range.
    pub fn add_currency(&mut self, n: u32) -> Result<i64, LedgerError> {
        let before = self.ledger.currency();
        let after = before
            .checked_add(i64::from(n))
            .ok_or(LedgerError::CurrencyOverflow {
                balance: before,
                delta: i64::from(n),
            })?;
        self.set_currency(before, after);
        Ok(after)
    }

    /// Subtract `n` from the currency balance. Returns the new balance.
    ///
    /// No floor is applied: the balance may go negative.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CurrencyOverflow`] if the balance would leave
    /// the `i64` range.
    pub fn sub_currency(&mut self, n: u32) -> Result<i64, LedgerError> {
        let before = self.ledger.currency();
        let delta = i64::from(n);
        let after = before
            .checked_sub(delta)
            .ok_or(LedgerError::CurrencyOverflow {
                balance: before,
                delta: delta.saturating_neg(),
            })?;
        self.set_currency(before, after);
        Ok(after)
    }

    /// Number of journaled changes so far.
    pub fn pending(&self) -> usize {
        self.journal.len()
    }

    /// Make every change permanent.
    pub fn commit(mut self) {
        self.journal.clear();
    }

    /// Undo every change now. Equivalent to dropping the transaction.
    pub fn rollback(self) {}

    fn set_currency(&mut self, before: i64, after: i64) {
        self.ledger.set_currency(after);
        self.journal.push(Undo::Currency(before));
    }

    fn undo_all(&mut self) -> Result<(), LedgerError> {
        while let Some(step) = self.journal.pop() {
            match step {
                Undo::Pushed(kind) => self.ledger.pop(kind)?,
                Undo::Used(kind, position) => self.ledger.restore(kind, position)?,
                Undo::Currency(before) => self.ledger.set_currency(before),
            }
        }
        Ok(())
    }
}

impl Drop for LedgerTxn<'_> {
    fn drop(&mut self) {
        if self.journal.is_empty() {
            return;
        }
        let steps = self.journal.len();
        if let Err(err) = self.undo_all() {
            warn!(%err, steps, "Ledger rollback incomplete");
        }
    }
}

#[cfg(test)]
mod tests {
    use factory_types::Counts;

    use super::*;

    #[test]
    fn use_one_returns_none_when_empty() {
        let mut ledger = Ledger::new();
        let mut txn = ledger.begin();
        assert!(txn.use_one(ItemKind::Foo).is_none());
        assert_eq!(txn.pending(), 0);
    }

    #[test]
    fn use_one_marks_exactly_one_item() {
        let mut ledger = Ledger::with_stock(2, 0, 0, 0).unwrap_or_default();
        let mut txn = ledger.begin();
        let item = txn.use_one(ItemKind::Foo);
        assert!(item.is_some());
        txn.commit();

        assert_eq!(ledger.count_unused(ItemKind::Foo), 1);
        let used = ledger
            .mined(MinedKind::Foo)
            .iter()
            .filter(|f| f.used)
            .count();
        assert_eq!(used, 1);
    }

    #[test]
    fn use_up_to_is_capped_by_availability() {
        let mut ledger = Ledger::with_stock(0, 0, 3, 0).unwrap_or_default();
        let mut txn = ledger.begin();
        assert_eq!(txn.use_up_to(ItemKind::Foobar, 5), 3);
        assert_eq!(txn.use_up_to(ItemKind::Foobar, 5), 0);
        txn.commit();
        assert_eq!(ledger.count_unused(ItemKind::Foobar), 0);
    }

    #[test]
    fn use_up_to_zero_consumes_nothing() {
        let mut ledger = Ledger::with_stock(4, 0, 0, 0).unwrap_or_default();
        let mut txn = ledger.begin();
        assert_eq!(txn.use_up_to(ItemKind::Foo, 0), 0);
        txn.commit();
        assert_eq!(ledger.count_unused(ItemKind::Foo), 4);
    }

    #[test]
    fn currency_can_go_negative() {
        let mut ledger = Ledger::new();
        let mut txn = ledger.begin();
        assert_eq!(txn.sub_currency(3).ok(), Some(-3));
        assert_eq!(txn.add_currency(1).ok(), Some(-2));
        txn.commit();
        assert_eq!(ledger.currency(), -2);
    }

    #[test]
    fn currency_overflow_is_an_error() {
        let mut ledger = Ledger::new();
        ledger.set_currency(i64::MAX);
        let mut txn = ledger.begin();
        let result = txn.add_currency(1);
        assert!(matches!(result, Err(LedgerError::CurrencyOverflow { .. })));
        assert_eq!(txn.currency(), i64::MAX);
    }

    #[test]
    fn drop_without_commit_rolls_everything_back() {
        let mut ledger = Ledger::with_stock(6, 1, 2, 3).unwrap_or_default();
        let before = ledger.clone();

        {
            let mut txn = ledger.begin();
            assert_eq!(txn.use_up_to(ItemKind::Foo, 6), 6);
            let bar = txn.use_one(ItemKind::Bar);
            let foo = txn.mine(MinedKind::Foo, None);
            assert_ne!(foo.into_inner(), uuid::Uuid::nil());
            if let (Some(bar), Some(foo)) = (bar, txn.use_one(ItemKind::Foo)) {
                txn.craft_foobar(foo, bar, None);
            }
            assert!(txn.sub_currency(3).is_ok());
            assert_eq!(txn.use_up_to(ItemKind::Foobar, 5), 3);
            assert!(txn.pending() > 0);
        }

        assert_eq!(ledger, before);
        assert_eq!(
            ledger.counts(),
            Counts {
                foo: 6,
                bar: 1,
                foobar: 2,
                currency: 3,
            }
        );
    }

    #[test]
    fn explicit_rollback_matches_drop() {
        let mut ledger = Ledger::with_stock(1, 0, 0, 0).unwrap_or_default();
        let before = ledger.clone();
        let mut txn = ledger.begin();
        let _ = txn.use_one(ItemKind::Foo);
        txn.rollback();
        assert_eq!(ledger, before);
    }

    #[test]
    fn commit_keeps_changes() {
        let mut ledger = Ledger::new();
        let mut txn = ledger.begin();
        txn.mine(MinedKind::Bar, None);
        assert!(txn.add_currency(2).is_ok());
        txn.commit();
        assert_eq!(ledger.count_unused(ItemKind::Bar), 1);
        assert_eq!(ledger.currency(), 2);
    }
}
