//! The resource ledger: every Foo, Bar and Foobar ever made, plus currency.
//!
//! The [`Ledger`] holds one [`Stock`] per item kind. A stock keeps its items
//! in creation order and maintains an index of the ones still unused, so
//! counting and consuming never scan the (ever-growing) used prefix.
//!
//! # Design
//!
//! - **Never destroyed**: items are only flagged used, never removed.
//! - **Monotonic**: `used` only goes from `false` to `true` outside of a
//!   transaction rollback.
//! - **Transactional**: all mutation goes through a [`LedgerTxn`], which
//!   journals every change and undoes them unless committed.
//! - **Indexed**: mined items are also indexed by id, so Foobar
//!   back-references resolve without scanning the whole history. The index
//!   is not serialized; it is rebuilt on deserialization.
//!
//! [`LedgerTxn`]: crate::transaction::LedgerTxn

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use factory_types::{
    ConsumedItem, Counts, CraftedItem, FoobarId, ItemId, ItemKind, MinedItem, MinedKind, RobotId,
    Serial,
};

use crate::audit::{self, AuditResult};
use crate::transaction::LedgerTxn;
use crate::LedgerError;

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

/// An item that can be flagged as consumed.
pub trait Consumable {
    /// Whether the item has been consumed.
    fn is_used(&self) -> bool;
    /// Set the consumed flag.
    fn set_used(&mut self, used: bool);
    /// The item's identity as seen by consumers.
    fn consumed(&self) -> ConsumedItem;
}

impl Consumable for MinedItem {
    fn is_used(&self) -> bool {
        self.used
    }

    fn set_used(&mut self, used: bool) {
        self.used = used;
    }

    fn consumed(&self) -> ConsumedItem {
        ConsumedItem {
            id: self.id.into_inner(),
            serial: self.serial,
        }
    }
}

impl Consumable for CraftedItem {
    fn is_used(&self) -> bool {
        self.used
    }

    fn set_used(&mut self, used: bool) {
        self.used = used;
    }

    fn consumed(&self) -> ConsumedItem {
        ConsumedItem {
            id: self.id.into_inner(),
            serial: self.serial,
        }
    }
}

/// Items of one kind, with an index of the unused ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock<T> {
    /// All items, in creation order.
    items: Vec<T>,
    /// Positions in `items` that are still unused.
    unused: BTreeSet<usize>,
}

impl<T> Default for Stock<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            unused: BTreeSet::new(),
        }
    }
}

impl<T: Consumable> Stock<T> {
    /// All items, used or not.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of unused items.
    pub fn count_unused(&self) -> u32 {
        u32::try_from(self.unused.len()).unwrap_or(u32::MAX)
    }

    /// Positions of unused items, for integrity checks.
    pub(crate) const fn unused_positions(&self) -> &BTreeSet<usize> {
        &self.unused
    }

    /// Append a new (unused) item and return its position.
    pub(crate) fn push(&mut self, item: T) -> usize {
        let position = self.items.len();
        self.items.push(item);
        self.unused.insert(position);
        position
    }

    /// Remove the most recently pushed item (rollback of a `push`).
    pub(crate) fn pop(&mut self) -> Result<(), LedgerError> {
        let position = self
            .items
            .len()
            .checked_sub(1)
            .ok_or(LedgerError::InternalError("pop on an empty stock"))?;
        self.items.pop();
        self.unused.remove(&position);
        Ok(())
    }

    /// Mark one unused item as used. Which one is unspecified.
    pub(crate) fn take_one(&mut self) -> Option<(usize, ConsumedItem)> {
        let position = self.unused.pop_first()?;
        let item = self.items.get_mut(position)?;
        item.set_used(true);
        Some((position, item.consumed()))
    }

    /// Flag the item at `position` as unused again (rollback of a take).
    pub(crate) fn restore(&mut self, position: usize) -> Result<(), LedgerError> {
        let item = self
            .items
            .get_mut(position)
            .ok_or(LedgerError::InternalError("restore of an unknown position"))?;
        item.set_used(false);
        self.unused.insert(position);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The fleet-wide record of items and currency.
///
/// Read access is direct; write access requires a [`LedgerTxn`] obtained
/// from [`Ledger::begin`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LedgerRecord", into = "LedgerRecord")]
pub struct Ledger {
    /// Mined Foo.
    foo: Stock<MinedItem>,
    /// Mined Bar.
    bar: Stock<MinedItem>,
    /// Crafted Foobars.
    foobars: Stock<CraftedItem>,
    /// Currency balance. Unbounded below.
    currency: i64,
    /// Kind and stock position of every mined item.
    mined_index: BTreeMap<ItemId, (MinedKind, usize)>,
}

/// Serialized form of a [`Ledger`]: the stocks and balance, no index.
#[derive(Serialize, Deserialize)]
struct LedgerRecord {
    foo: Stock<MinedItem>,
    bar: Stock<MinedItem>,
    foobars: Stock<CraftedItem>,
    currency: i64,
}

impl From<LedgerRecord> for Ledger {
    fn from(record: LedgerRecord) -> Self {
        let mut mined_index = BTreeMap::new();
        for (kind, stock) in [(MinedKind::Foo, &record.foo), (MinedKind::Bar, &record.bar)] {
            for (position, item) in stock.items.iter().enumerate() {
                mined_index.insert(item.id, (kind, position));
            }
        }
        Self {
            foo: record.foo,
            bar: record.bar,
            foobars: record.foobars,
            currency: record.currency,
            mined_index,
        }
    }
}

impl From<Ledger> for LedgerRecord {
    fn from(ledger: Ledger) -> Self {
        Self {
            foo: ledger.foo,
            bar: ledger.bar,
            foobars: ledger.foobars,
            currency: ledger.currency,
        }
    }
}

impl Ledger {
    /// Create an empty ledger with zero currency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-filled with unused stock.
    ///
    /// Each seeded Foobar is backed by its own Foo and Bar, which are
    /// consumed in the process and do not count as available.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the currency amount cannot be applied.
    pub fn with_stock(foo: u32, bar: u32, foobar: u32, currency: u32) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();
        let mut txn = ledger.begin();
        for _ in 0..foobar {
            let foo_id = txn.mine(MinedKind::Foo, None);
            let bar_id = txn.mine(MinedKind::Bar, None);
            let used_foo = txn.use_one(ItemKind::Foo);
            let used_bar = txn.use_one(ItemKind::Bar);
            match (used_foo, used_bar) {
                (Some(f), Some(b)) if f.id == foo_id.into_inner() && b.id == bar_id.into_inner() => {
                    txn.craft_foobar(f, b, None);
                }
                _ => return Err(LedgerError::InternalError("seeded materials went missing")),
            }
        }
        for _ in 0..foo {
            txn.mine(MinedKind::Foo, None);
        }
        for _ in 0..bar {
            txn.mine(MinedKind::Bar, None);
        }
        txn.add_currency(currency)?;
        txn.commit();
        Ok(ledger)
    }

    /// Open a transaction. Changes made through it are undone on drop
    /// unless [`LedgerTxn::commit`] is called.
    pub fn begin(&mut self) -> LedgerTxn<'_> {
        LedgerTxn::new(self)
    }

    /// Number of unused items of `kind`.
    pub fn count_unused(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::Foo => self.foo.count_unused(),
            ItemKind::Bar => self.bar.count_unused(),
            ItemKind::Foobar => self.foobars.count_unused(),
        }
    }

    /// Current currency balance.
    pub const fn currency(&self) -> i64 {
        self.currency
    }

    /// Unused counts and currency in one read.
    pub fn counts(&self) -> Counts {
        Counts {
            foo: self.foo.count_unused(),
            bar: self.bar.count_unused(),
            foobar: self.foobars.count_unused(),
            currency: self.currency,
        }
    }

    /// Every mined item of `kind`, used or not, in creation order.
    pub fn mined(&self, kind: MinedKind) -> &[MinedItem] {
        self.mined_stock(kind).items()
    }

    /// Every Foobar, sold or not, in creation order.
    pub fn foobars(&self) -> &[CraftedItem] {
        self.foobars.items()
    }

    /// Sold Foobars, in creation order.
    pub fn sold_foobars(&self) -> impl Iterator<Item = &CraftedItem> {
        self.foobars.items().iter().filter(|f| f.used)
    }

    /// Look up a mined item by id.
    pub fn mined_item(&self, id: ItemId) -> Option<&MinedItem> {
        let &(kind, position) = self.mined_index.get(&id)?;
        self.mined_stock(kind).items().get(position)
    }

    /// Check index and back-reference consistency.
    pub fn audit(&self) -> AuditResult {
        audit::verify(self)
    }

    // -----------------------------------------------------------------------
    // Crate-internal mutation (journaled by LedgerTxn)
    // -----------------------------------------------------------------------

    pub(crate) const fn mined_stock(&self, kind: MinedKind) -> &Stock<MinedItem> {
        match kind {
            MinedKind::Foo => &self.foo,
            MinedKind::Bar => &self.bar,
        }
    }

    pub(crate) const fn foobar_stock(&self) -> &Stock<CraftedItem> {
        &self.foobars
    }

    pub(crate) const fn mined_index(&self) -> &BTreeMap<ItemId, (MinedKind, usize)> {
        &self.mined_index
    }

    const fn mined_stock_mut(&mut self, kind: MinedKind) -> &mut Stock<MinedItem> {
        match kind {
            MinedKind::Foo => &mut self.foo,
            MinedKind::Bar => &mut self.bar,
        }
    }

    pub(crate) fn push_mined(&mut self, kind: MinedKind, producer_id: Option<RobotId>) -> ItemId {
        let id = ItemId::new();
        let position = self.mined_stock_mut(kind).push(MinedItem {
            id,
            kind,
            serial: Serial::generate(),
            used: false,
            producer_id,
        });
        self.mined_index.insert(id, (kind, position));
        id
    }

    pub(crate) fn push_foobar(
        &mut self,
        foo: ConsumedItem,
        bar: ConsumedItem,
        producer_id: Option<RobotId>,
    ) -> FoobarId {
        let id = FoobarId::new();
        self.foobars.push(CraftedItem {
            id,
            serial: Serial::generate(),
            used: false,
            foo_used: ItemId::from(foo.id),
            bar_used: ItemId::from(bar.id),
            producer_id,
        });
        id
    }

    pub(crate) fn take_one(&mut self, kind: ItemKind) -> Option<(usize, ConsumedItem)> {
        match kind {
            ItemKind::Foo => self.foo.take_one(),
            ItemKind::Bar => self.bar.take_one(),
            ItemKind::Foobar => self.foobars.take_one(),
        }
    }

    pub(crate) fn pop(&mut self, kind: ItemKind) -> Result<(), LedgerError> {
        let mined = match kind {
            ItemKind::Foo => MinedKind::Foo,
            ItemKind::Bar => MinedKind::Bar,
            ItemKind::Foobar => return self.foobars.pop(),
        };
        let stock = self.mined_stock_mut(mined);
        let last = stock.items().last().map(|item| item.id);
        stock.pop()?;
        if let Some(id) = last {
            self.mined_index.remove(&id);
        }
        Ok(())
    }

    pub(crate) fn restore(&mut self, kind: ItemKind, position: usize) -> Result<(), LedgerError> {
        match kind {
            ItemKind::Foo => self.foo.restore(position),
            ItemKind::Bar => self.bar.restore(position),
            ItemKind::Foobar => self.foobars.restore(position),
        }
    }

    pub(crate) const fn set_currency(&mut self, currency: i64) {
        self.currency = currency;
    }
}
