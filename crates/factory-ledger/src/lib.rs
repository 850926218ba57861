//! Resource ledger for the robot factory.
//!
//! Tracks every Foo, Bar and Foobar the fleet has ever produced, whether it
//! is still available, and the fleet's single currency balance.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: item stocks and currency, read API.
//! - [`transaction`] -- [`LedgerTxn`], the journaled write API.
//! - [`audit`] -- Integrity verification and anomaly reporting.
//!
//! # Operations
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | `count_unused(kind)` | Unused items of a kind |
//! | `currency()` | Current balance |
//! | `use_one(kind)` | Flag one unused item used and return it, or `None` |
//! | `use_up_to(kind, n)` | Flag up to `n` items used, return the actual count |
//! | `add_currency(n)` / `sub_currency(n)` | Unconditional arithmetic, no floor |
//!
//! # Usage
//!
//! ```
//! use factory_ledger::Ledger;
//! use factory_types::{ItemKind, MinedKind};
//!
//! let mut ledger = Ledger::new();
//!
//! let mut txn = ledger.begin();
//! txn.mine(MinedKind::Foo, None);
//! txn.mine(MinedKind::Foo, None);
//! assert_eq!(txn.use_up_to(ItemKind::Foo, 5), 2);
//! txn.commit();
//!
//! assert_eq!(ledger.count_unused(ItemKind::Foo), 0);
//! ```

pub mod audit;
pub mod ledger;
pub mod transaction;

// Re-export primary types at crate root.
pub use audit::AuditResult;
pub use ledger::{Consumable, Ledger, Stock};
pub use transaction::LedgerTxn;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when mutating the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The currency balance would leave the `i64` range.
    #[error("currency overflow: balance {balance} cannot absorb {delta}")]
    CurrencyOverflow {
        /// The balance before the change.
        balance: i64,
        /// The signed change that was attempted.
        delta: i64,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// An integrity violation found by [`Ledger::audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// One line per failed check.
    pub problems: Vec<String>,
    /// Human-readable summary of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
