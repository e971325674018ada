//! Construction context: the id allocator plus planner configuration.
//!
//! Every node is built through a `PlanContext`. Ids come from a process-wide
//! counter, so plans built by unrelated contexts can always be combined.

use std::sync::Arc;

use shardplan_core::config::PlannerConfig;
use shardplan_core::error::Result;
use shardplan_core::id::IdAllocator;
use shardplan_core::partition::PartitionSpec;
use shardplan_core::schema::Schema;

use crate::logical::{LogicalPlan, LogicalPlanRef, NodeKind, OpLevel};

#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    ids: IdAllocator,
    config: PlannerConfig,
}

impl PlanContext {
    /// Context with a validated config.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ids: IdAllocator::new(),
            config,
        })
    }

    /// Context configured from `SHARDPLAN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(PlannerConfig::from_env())
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Allocate an id and assemble a node. Children are registered in order.
    pub(crate) fn make(
        &self,
        kind: NodeKind,
        schema: Schema,
        partition_spec: PartitionSpec,
        op_level: OpLevel,
        children: Vec<LogicalPlanRef>,
    ) -> LogicalPlanRef {
        let mut node = LogicalPlan::new(self.ids.next_id(), kind, schema, partition_spec, op_level);
        for child in children {
            node.register_child(child);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            node = node.name(),
            id = node.id().get(),
            partitions = node.num_partitions(),
            "constructed plan node"
        );
        Arc::new(node)
    }
}
