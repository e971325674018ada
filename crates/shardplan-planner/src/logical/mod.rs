//! The logical-plan node family.
//!
//! Every node shares one header (id, schema, partition spec, op level,
//! children) and carries its own parameters in a [`NodeKind`]. Nodes are only
//! created through [`PlanContext`](crate::PlanContext) and are immutable once
//! built; transformations produce new nodes via
//! [`LogicalPlan::copy_with_new_children`] or [`LogicalPlan::rebuild`].

mod build;
mod join;
mod rebuild;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use shardplan_core::error::{Error, Result};
use shardplan_core::expr::{AggOp, Expr, ExprList};
use shardplan_core::id::NodeId;
use shardplan_core::partition::{PartitionScheme, PartitionSpec};
use shardplan_core::resource::ResourceRequest;
use shardplan_core::schema::Schema;
use shardplan_core::source::{PartitionCacheEntry, StorageType};

pub use build::FileScanParams;

pub type LogicalPlanRef = Arc<LogicalPlan>;

/// Granularity at which a node can be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpLevel {
    /// Pure row-wise; can be fused with neighbours.
    Row = 1,
    /// Needs a whole partition at once.
    Partition = 2,
    /// Needs coordination across partitions.
    Global = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    /// Accepted as a tag; construction fails as unsupported.
    Left,
    /// Accepted as a tag; construction fails as unsupported.
    Right,
}

/// Sort direction as accepted at the API boundary: one flag for every key,
/// or one flag per key. Nodes only ever store the per-key form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descending {
    All(bool),
    PerKey(Vec<bool>),
}

impl Descending {
    pub fn normalize(self, num_keys: usize) -> Result<Vec<bool>> {
        match self {
            Descending::All(d) => Ok(vec![d; num_keys]),
            Descending::PerKey(flags) if flags.len() == num_keys => Ok(flags),
            Descending::PerKey(flags) => Err(Error::Shape(format!(
                "got {} descending flags for {} sort keys",
                flags.len(),
                num_keys
            ))),
        }
    }
}

impl From<bool> for Descending {
    fn from(d: bool) -> Self {
        Descending::All(d)
    }
}

impl From<Vec<bool>> for Descending {
    fn from(flags: Vec<bool>) -> Self {
        Descending::PerKey(flags)
    }
}

/// Operator applied to each partition by a `MapPartition` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapPartitionOp {
    /// Unnest list columns; every expression must be an explode call.
    Explode { explode_columns: ExprList },
    /// Opaque partition function with a declared output schema.
    Custom { name: String, output_schema: Schema },
}

/// Per-kind parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    FileScan(FileScanParams),
    InMemoryScan {
        cache_entry: PartitionCacheEntry,
    },
    RequestSource,
    ResponseSink,
    FileWrite {
        root_dir: String,
        storage_type: StorageType,
        partition_cols: ExprList,
        compression: Option<String>,
    },
    Filter {
        predicate: ExprList,
    },
    Projection {
        projection: ExprList,
        resource_request: Option<ResourceRequest>,
    },
    Sort {
        sort_by: ExprList,
        descending: Vec<bool>,
    },
    MapPartition {
        op: MapPartitionOp,
    },
    LocalLimit {
        num: usize,
    },
    GlobalLimit {
        num: usize,
    },
    LocalCount,
    Repartition {
        partition_by: ExprList,
        scheme: PartitionScheme,
    },
    Coalesce,
    LocalAggregate {
        aggs: Vec<(Expr, AggOp)>,
        group_by: Option<ExprList>,
    },
    LocalDistinct {
        group_by: ExprList,
    },
    Join {
        left_on: ExprList,
        right_on: ExprList,
        how: JoinType,
        /// Output column expressions: left columns, then non-key right
        /// columns with collisions renamed.
        output_projection: ExprList,
    },
}

#[derive(Debug)]
pub struct LogicalPlan {
    id: NodeId,
    schema: Schema,
    partition_spec: PartitionSpec,
    op_level: OpLevel,
    children: Vec<LogicalPlanRef>,
    kind: NodeKind,
}

impl LogicalPlan {
    pub(crate) fn new(
        id: NodeId,
        kind: NodeKind,
        schema: Schema,
        partition_spec: PartitionSpec,
        op_level: OpLevel,
    ) -> Self {
        Self {
            id,
            schema,
            partition_spec,
            op_level,
            children: Vec::new(),
            kind,
        }
    }

    /// Append a child. Order is meaningful (left before right).
    pub(crate) fn register_child(&mut self, child: LogicalPlanRef) {
        self.children.push(child);
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn partition_spec(&self) -> &PartitionSpec {
        &self.partition_spec
    }

    pub fn num_partitions(&self) -> usize {
        self.partition_spec.num_partitions()
    }

    pub fn op_level(&self) -> OpLevel {
        self.op_level
    }

    pub fn children(&self) -> &[LogicalPlanRef] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Custom resource hint; only projections carry one.
    pub fn resource_request(&self) -> Option<&ResourceRequest> {
        match &self.kind {
            NodeKind::Projection {
                resource_request, ..
            } => resource_request.as_ref(),
            _ => None,
        }
    }

    /// Stable operator name.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            NodeKind::FileScan(_) => "FileScan",
            NodeKind::InMemoryScan { .. } => "InMemoryScan",
            NodeKind::RequestSource => "RequestSource",
            NodeKind::ResponseSink => "ResponseSink",
            NodeKind::FileWrite { .. } => "FileWrite",
            NodeKind::Filter { .. } => "Filter",
            NodeKind::Projection { .. } => "Projection",
            NodeKind::Sort { .. } => "Sort",
            NodeKind::MapPartition {
                op: MapPartitionOp::Explode { .. },
            } => "Explode",
            NodeKind::MapPartition { .. } => "MapPartition",
            NodeKind::LocalLimit { .. } => "LocalLimit",
            NodeKind::GlobalLimit { .. } => "GlobalLimit",
            NodeKind::LocalCount => "LocalCount",
            NodeKind::Repartition { .. } => "Repartition",
            NodeKind::Coalesce => "Coalesce",
            NodeKind::LocalAggregate { .. } => "LocalAggregate",
            NodeKind::LocalDistinct { .. } => "LocalDistinct",
            NodeKind::Join { .. } => "Join",
        }
    }

    /// Returns the number of inputs for this node.
    pub fn inputs(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if this is a unary operator.
    pub fn is_unary(&self) -> bool {
        self.inputs() == 1
    }

    /// Returns true if this is a binary operator.
    pub fn is_binary(&self) -> bool {
        self.inputs() == 2
    }

    /// Columns this node reads from its input schema(s).
    pub fn required_columns(&self) -> BTreeSet<String> {
        match &self.kind {
            NodeKind::FileScan(params) => {
                let mut cols = params.predicate.required_columns();
                cols.insert(params.path_column.clone());
                cols
            }
            NodeKind::InMemoryScan { .. } | NodeKind::RequestSource => BTreeSet::new(),
            NodeKind::ResponseSink => self.child_columns(),
            NodeKind::FileWrite { partition_cols, .. } => partition_cols.required_columns(),
            NodeKind::Filter { predicate } => predicate.required_columns(),
            NodeKind::Projection { projection, .. } => projection.required_columns(),
            NodeKind::Sort { sort_by, .. } => sort_by.required_columns(),
            NodeKind::MapPartition { op } => match op {
                MapPartitionOp::Explode { explode_columns } => explode_columns.required_columns(),
                MapPartitionOp::Custom { .. } => self.child_columns(),
            },
            NodeKind::LocalLimit { .. } | NodeKind::GlobalLimit { .. } | NodeKind::Coalesce => {
                BTreeSet::new()
            }
            // At least one column has to be materialized to count rows.
            NodeKind::LocalCount => self
                .children
                .first()
                .and_then(|c| c.schema().field(0))
                .map(|f| f.name.clone())
                .into_iter()
                .collect(),
            NodeKind::Repartition { partition_by, .. } => partition_by.required_columns(),
            NodeKind::LocalAggregate { aggs, group_by } => {
                let mut cols: BTreeSet<String> =
                    aggs.iter().flat_map(|(e, _)| e.required_columns()).collect();
                if let Some(g) = group_by {
                    cols.extend(g.required_columns());
                }
                cols
            }
            NodeKind::LocalDistinct { group_by } => group_by.required_columns(),
            NodeKind::Join {
                left_on, right_on, ..
            } => {
                let mut cols = left_on.required_columns();
                cols.extend(right_on.required_columns());
                cols
            }
        }
    }

    fn child_columns(&self) -> BTreeSet<String> {
        self.children
            .iter()
            .flat_map(|c| c.schema().column_names())
            .collect()
    }
}
