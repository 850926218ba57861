//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Robots, mined items and crafted items each get their own identifier type
//! so they cannot be mixed up at compile time. Identifiers use UUID v7
//! (time-ordered), which keeps insertion order and id order aligned.
//!
//! [`Serial`] is the opaque traceability token stamped on every item. It is
//! random (UUID v4) and carries no ordering.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a robot in the fleet.
    RobotId
}

define_id! {
    /// Unique identifier for a mined item (Foo or Bar).
    ItemId
}

define_id! {
    /// Unique identifier for a crafted Foobar.
    FoobarId
}

/// Opaque traceability token stamped on every item at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Serial(pub Uuid);

impl Serial {
    /// Draw a fresh random serial.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl core::fmt::Display for Serial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}
