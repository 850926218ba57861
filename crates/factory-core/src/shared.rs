//! A fleet shared between the run loop and external command issuers.
//!
//! All access goes through one async mutex, so a `change_action` issued
//! between ticks can never interleave with an in-flight update of the same
//! robot, and ledger check-then-act sequences from different robots are
//! serialized.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use factory_types::{Counts, RobotAction, RobotId, RobotView};

use crate::fleet::{Fleet, FleetError, FleetSnapshot, UpdateSummary};
use crate::view;

/// Cloneable handle to a locked [`Fleet`].
#[derive(Debug, Clone)]
pub struct SharedFleet {
    inner: Arc<Mutex<Fleet>>,
}

impl SharedFleet {
    /// Wrap a fleet for shared access.
    pub fn new(fleet: Fleet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(fleet)),
        }
    }

    /// Exclusive access for a multi-step operation.
    pub async fn lock(&self) -> MutexGuard<'_, Fleet> {
        self.inner.lock().await
    }

    /// Order a robot to switch action.
    ///
    /// # Errors
    ///
    /// See [`Fleet::change_action`].
    pub async fn change_action(
        &self,
        robot_id: RobotId,
        action: RobotAction,
        now: DateTime<Utc>,
    ) -> Result<(), FleetError> {
        self.inner.lock().await.change_action(robot_id, action, now)
    }

    /// Tick every robot.
    pub async fn update(&self, now: DateTime<Utc>) -> UpdateSummary {
        self.inner.lock().await.update(now)
    }

    /// Current counts.
    pub async fn counts(&self) -> Counts {
        self.inner.lock().await.counts()
    }

    /// Render every robot.
    pub async fn views(&self, now: DateTime<Utc>) -> Vec<RobotView> {
        view::robot_views(&*self.inner.lock().await, now)
    }

    /// Capture state for persistence.
    pub async fn snapshot(&self) -> FleetSnapshot {
        self.inner.lock().await.snapshot()
    }
}
