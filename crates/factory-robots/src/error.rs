//! Error types for robot actions.

use factory_ledger::LedgerError;
use factory_types::ItemKind;

/// Errors that can occur while driving a robot through its lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    /// A deadline computation left the representable time range.
    #[error("time overflow: {context}")]
    TimeOverflow {
        /// What was being computed.
        context: String,
    },

    /// The economy configuration is unusable.
    #[error("invalid economy config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Material counted as available could not be taken.
    #[error("material vanished mid-effect: {kind:?}")]
    MaterialVanished {
        /// The kind that could not be taken.
        kind: ItemKind,
    },

    /// The ledger rejected a change.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}
