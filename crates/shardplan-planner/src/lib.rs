#![forbid(unsafe_code)]
//! shardplan-planner: the logical-plan node family for a distributed
//! dataframe engine.
//!
//! Design:
//! - Nodes are immutable `Arc<LogicalPlan>` values built through a
//!   [`PlanContext`], which owns the id allocator and planner config.
//! - Each constructor derives the output schema and partition spec from its
//!   children and validates its operands, failing with a typed [`Error`].
//! - `join` keeps both sides id-disjoint and inserts hash repartitions only
//!   where a side is not already co-partitioned on its keys.
//! - Utilities: structural equality (`is_eq`), deep `rebuild`,
//!   post-order traversal, blake3 fingerprints and a box-drawing printer.

pub mod context;
pub mod display;
pub mod equality;
pub mod fingerprint;
pub mod logical;
pub mod tree;

pub use context::PlanContext;
pub use display::DisplayOptions;
pub use logical::{
    Descending, FileScanParams, JoinType, LogicalPlan, LogicalPlanRef, MapPartitionOp, NodeKind,
    OpLevel,
};
pub use shardplan_core::error::{Error, Result};
pub use tree::PostOrder;
