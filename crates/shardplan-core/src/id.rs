//! Strongly-typed identifiers and the allocator that hands them out.
//!
//! Node ids exist for disjointness checks and debugging only. They never take
//! part in structural equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! new_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(v: u64) -> Self {
                Self(v)
            }
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

new_id!(NodeId);

/// Process-wide counter behind every [`IdAllocator`].
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Thread-safe source of [`NodeId`]s.
///
/// Every allocator draws from one process-wide counter, so two nodes never
/// share an id no matter which context built them. Only uniqueness is
/// guaranteed; which thread receives which id is unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdAllocator {
    _private: (),
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> NodeId {
        NodeId::new(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Next id that would be handed out (advisory under concurrency).
    pub fn peek(&self) -> u64 {
        NEXT_NODE_ID.load(Ordering::Relaxed)
    }
}
