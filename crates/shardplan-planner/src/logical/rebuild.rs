//! Re-deriving nodes over new children.
//!
//! Both entry points go through the public constructors, so schemas and
//! partition specs are always re-derived and re-validated.

use std::sync::Arc;

use shardplan_core::error::{Error, Result};

use super::{LogicalPlan, LogicalPlanRef, NodeKind};
use crate::context::PlanContext;

impl LogicalPlan {
    /// Node of the same kind and parameters over `children`.
    ///
    /// Leaves are returned as-is. Anything else gets a new id from `ctx`.
    pub fn copy_with_new_children(
        self: &Arc<Self>,
        ctx: &PlanContext,
        children: Vec<LogicalPlanRef>,
    ) -> Result<LogicalPlanRef> {
        if children.len() != self.inputs() {
            return Err(Error::Shape(format!(
                "{} expects {} children, got {}",
                self.name(),
                self.inputs(),
                children.len()
            )));
        }
        if self.is_leaf() {
            return Ok(Arc::clone(self));
        }
        self.reconstruct(ctx, children)
    }

    /// Deep copy of the subtree with fresh ids throughout.
    ///
    /// Fails with [`Error::Irreversible`] if the subtree contains a write.
    pub fn rebuild(&self, ctx: &PlanContext) -> Result<LogicalPlanRef> {
        if let NodeKind::FileWrite { root_dir, .. } = &self.kind {
            return Err(Error::Irreversible(format!(
                "cannot rebuild a FileWrite to {root_dir}; the write would run twice"
            )));
        }
        let children = self
            .children
            .iter()
            .map(|c| c.rebuild(ctx))
            .collect::<Result<Vec<_>>>()?;
        let node = self.reconstruct(ctx, children)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            node = self.name(),
            old_id = self.id.get(),
            new_id = node.id().get(),
            "rebuilt plan node"
        );
        Ok(node)
    }

    fn reconstruct(&self, ctx: &PlanContext, children: Vec<LogicalPlanRef>) -> Result<LogicalPlanRef> {
        let mut children = children.into_iter();
        let mut next = || {
            children.next().ok_or_else(|| {
                Error::Shape(format!("{} is missing a child", self.name()))
            })
        };
        match &self.kind {
            NodeKind::FileScan(params) => ctx.file_scan(next()?, params.clone()),
            NodeKind::InMemoryScan { cache_entry } => ctx.in_memory_scan(
                cache_entry.clone(),
                self.schema.clone(),
                Some(self.partition_spec.clone()),
            ),
            NodeKind::RequestSource => ctx.request_source(self.schema.clone()),
            NodeKind::ResponseSink => ctx.response_sink(next()?),
            NodeKind::FileWrite {
                root_dir,
                storage_type,
                partition_cols,
                compression,
            } => ctx.file_write(
                next()?,
                root_dir.clone(),
                *storage_type,
                Some(partition_cols.clone()),
                compression.clone(),
            ),
            NodeKind::Filter { predicate } => ctx.filter(next()?, predicate.clone()),
            NodeKind::Projection {
                projection,
                resource_request,
            } => ctx.projection(next()?, projection.clone(), resource_request.clone()),
            NodeKind::Sort {
                sort_by,
                descending,
            } => ctx.sort(next()?, sort_by.clone(), descending.clone()),
            NodeKind::MapPartition { op } => ctx.map_partition(next()?, op.clone()),
            NodeKind::LocalLimit { num } => ctx.local_limit(next()?, *num),
            NodeKind::GlobalLimit { num } => ctx.global_limit(next()?, *num),
            NodeKind::LocalCount => ctx.local_count(next()?),
            NodeKind::Repartition {
                partition_by,
                scheme,
            } => ctx.repartition(next()?, partition_by.clone(), self.num_partitions(), *scheme),
            NodeKind::Coalesce => ctx.coalesce(next()?, self.num_partitions()),
            NodeKind::LocalAggregate { aggs, group_by } => {
                ctx.local_aggregate(next()?, aggs.clone(), group_by.clone())
            }
            NodeKind::LocalDistinct { group_by } => ctx.local_distinct(next()?, group_by.clone()),
            NodeKind::Join {
                left_on,
                right_on,
                how,
                ..
            } => {
                let left = next()?;
                let right = next()?;
                ctx.join(left, right, left_on.clone(), right_on.clone(), *how)
            }
        }
    }
}
