#![forbid(unsafe_code)]
//! shardplan: logical query plans for a partitioned dataframe engine.
//!
//! Re-exports the value types from `shardplan-core` and the node family from
//! `shardplan-planner` so callers can depend on a single crate.

pub use shardplan_core::{config, error, expr, hash, id, partition, resource, schema, source, types};
pub use shardplan_planner::{
    context, display, equality, fingerprint, logical, tree, Descending, DisplayOptions,
    FileScanParams, JoinType, LogicalPlan, LogicalPlanRef, MapPartitionOp, NodeKind, OpLevel,
    PlanContext, PostOrder,
};

pub use shardplan_core::error::{Error, Result};

pub mod prelude {
    //! Everything needed to build and inspect plans.
    pub use shardplan_core::prelude::*;
    pub use shardplan_planner::{
        Descending, DisplayOptions, FileScanParams, JoinType, LogicalPlan, LogicalPlanRef,
        MapPartitionOp, NodeKind, OpLevel, PlanContext,
    };
}
