//! Structural fingerprints: a blake3 digest that agrees with `is_eq`.
//!
//! Plans that are `is_eq` hash identically regardless of node ids, so a
//! fingerprint can key a plan cache or dedupe identical subtrees.

use serde::Serialize;

use shardplan_core::error::Result;
use shardplan_core::hash::{hash_node, Fingerprint};
use shardplan_core::partition::PartitionSpec;
use shardplan_core::schema::Schema;

use crate::logical::{LogicalPlan, NodeKind};

#[derive(Serialize)]
struct LocalView<'a> {
    kind: &'a NodeKind,
    schema: &'a Schema,
    partition_spec: &'a PartitionSpec,
}

impl LogicalPlan {
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        let children = self
            .children()
            .iter()
            .map(|c| c.fingerprint())
            .collect::<Result<Vec<_>>>()?;
        let local = LocalView {
            kind: self.kind(),
            schema: self.schema(),
            partition_spec: self.partition_spec(),
        };
        hash_node(&local, &children)
    }
}
