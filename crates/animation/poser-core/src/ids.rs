//! Arena identifiers for graph entities.
//!
//! Animations, layers, states and roles live in flat vectors owned by
//! [`Graph`](crate::graph::Graph); the ids below are dense indices into them.
//! Entities refer to their parents by id, never by reference.

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Slot of this entity in its arena.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Identifies an [`Animation`](crate::graph::Animation).
    AnimId
);
arena_id!(
    /// Identifies a [`Layer`](crate::graph::Layer).
    LayerId
);
arena_id!(
    /// Identifies a [`State`](crate::graph::State), including each layer's synthetic blend state.
    StateId
);
arena_id!(
    /// Identifies a [`Role`](crate::graph::Role).
    RoleId
);

/// Position of a capture within its layer's capture list. States store their
/// captured data in the same slot.
pub type CaptureIdx = usize;
