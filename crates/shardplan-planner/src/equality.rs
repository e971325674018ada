//! Structural plan equality. Node ids never take part.
//!
//! `LogicalPlan` deliberately has no `PartialEq`; compare plans with
//! [`LogicalPlan::is_eq`].

use crate::logical::{LogicalPlan, NodeKind};

impl LogicalPlan {
    /// Same kind, parameters, schema, partition spec and, recursively,
    /// children. Plans with different child counts are never equal.
    pub fn is_eq(&self, other: &LogicalPlan) -> bool {
        self.local_eq(other)
            && self.partition_spec() == other.partition_spec()
            && self.num_partitions() == other.num_partitions()
            && self.children().len() == other.children().len()
            && self
                .children()
                .iter()
                .zip(other.children())
                .all(|(a, b)| a.is_eq(b))
    }

    /// Equality of this node's own parameters and schema.
    pub fn local_eq(&self, other: &LogicalPlan) -> bool {
        if self.schema() != other.schema() {
            return false;
        }
        use NodeKind::*;
        match (self.kind(), other.kind()) {
            (FileScan(a), FileScan(b)) => a == b,
            (InMemoryScan { cache_entry: a }, InMemoryScan { cache_entry: b }) => a == b,
            (RequestSource, RequestSource) => true,
            (ResponseSink, ResponseSink) => true,
            (
                FileWrite {
                    root_dir: d1,
                    storage_type: s1,
                    partition_cols: p1,
                    compression: c1,
                },
                FileWrite {
                    root_dir: d2,
                    storage_type: s2,
                    partition_cols: p2,
                    compression: c2,
                },
            ) => d1 == d2 && s1 == s2 && p1 == p2 && c1 == c2,
            (Filter { predicate: a }, Filter { predicate: b }) => a == b,
            (
                Projection {
                    projection: p1,
                    resource_request: r1,
                },
                Projection {
                    projection: p2,
                    resource_request: r2,
                },
            ) => p1 == p2 && r1 == r2,
            (
                Sort {
                    sort_by: s1,
                    descending: d1,
                },
                Sort {
                    sort_by: s2,
                    descending: d2,
                },
            ) => s1 == s2 && d1 == d2,
            (MapPartition { op: a }, MapPartition { op: b }) => a == b,
            (LocalLimit { num: a }, LocalLimit { num: b }) => a == b,
            (GlobalLimit { num: a }, GlobalLimit { num: b }) => a == b,
            (LocalCount, LocalCount) => true,
            (
                Repartition {
                    partition_by: p1,
                    scheme: s1,
                },
                Repartition {
                    partition_by: p2,
                    scheme: s2,
                },
            ) => p1 == p2 && s1 == s2,
            (Coalesce, Coalesce) => true,
            (
                LocalAggregate {
                    aggs: a1,
                    group_by: g1,
                },
                LocalAggregate {
                    aggs: a2,
                    group_by: g2,
                },
            ) => a1 == a2 && g1 == g2,
            (LocalDistinct { group_by: a }, LocalDistinct { group_by: b }) => a == b,
            (
                Join {
                    left_on: l1,
                    right_on: r1,
                    how: h1,
                    output_projection: o1,
                },
                Join {
                    left_on: l2,
                    right_on: r2,
                    how: h2,
                    output_projection: o2,
                },
            ) => l1 == l2 && r1 == r2 && h1 == h2 && o1 == o2,
            (FileScan(_), _)
            | (InMemoryScan { .. }, _)
            | (RequestSource, _)
            | (ResponseSink, _)
            | (FileWrite { .. }, _)
            | (Filter { .. }, _)
            | (Projection { .. }, _)
            | (Sort { .. }, _)
            | (MapPartition { .. }, _)
            | (LocalLimit { .. }, _)
            | (GlobalLimit { .. }, _)
            | (LocalCount, _)
            | (Repartition { .. }, _)
            | (Coalesce, _)
            | (LocalAggregate { .. }, _)
            | (LocalDistinct { .. }, _)
            | (Join { .. }, _) => false,
        }
    }
}
