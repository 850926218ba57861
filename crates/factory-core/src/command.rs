//! Command source trait and idle implementation.
//!
//! Between updates the runner asks a [`CommandSource`] which robots should
//! switch action. This is the seam for whatever plays the factory: a human
//! front end, a scripted scenario, or an automatic planner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use factory_types::{RobotAction, RobotId};

use crate::fleet::Fleet;

/// Errors that can occur while collecting commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// An internal error in the command source.
    #[error("command source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// One `change_action` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// The robot to redirect.
    pub robot_id: RobotId,
    /// The action it should switch to.
    pub action: RobotAction,
}

/// A source of `change_action` orders.
pub trait CommandSource: Send {
    /// Commands to apply before the next update.
    ///
    /// `fleet` is read-only; the runner applies the returned commands in
    /// order, all at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the source fails entirely.
    fn commands(&mut self, fleet: &Fleet, now: DateTime<Utc>) -> Result<Vec<Command>, CommandError>;
}

/// A command source that never issues anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleCommandSource;

impl CommandSource for IdleCommandSource {
    fn commands(&mut self, _fleet: &Fleet, _now: DateTime<Utc>) -> Result<Vec<Command>, CommandError> {
        Ok(Vec::new())
    }
}

/// Replays a fixed list of command batches, one batch per call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommands {
    batches: std::collections::VecDeque<Vec<Command>>,
}

impl ScriptedCommands {
    /// Create a script; the first batch is returned by the first call.
    pub fn new(batches: impl IntoIterator<Item = Vec<Command>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl CommandSource for ScriptedCommands {
    fn commands(&mut self, _fleet: &Fleet, _now: DateTime<Utc>) -> Result<Vec<Command>, CommandError> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
