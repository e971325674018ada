//! Shared plan fixtures for integration tests.

#![allow(dead_code)]

use shardplan::prelude::*;

pub fn schema(cols: &[(&str, DataType)]) -> Schema {
    Schema::new(
        cols.iter()
            .map(|(name, dtype)| Field::new(*name, dtype.clone()))
            .collect(),
    )
    .expect("fixture schema has unique names")
}

/// In-memory scan with an UNKNOWN spec of `n` partitions.
pub fn scan(ctx: &PlanContext, key: &str, cols: &[(&str, DataType)], n: usize) -> LogicalPlanRef {
    ctx.in_memory_scan(
        PartitionCacheEntry::new(key),
        schema(cols),
        Some(PartitionSpec::unknown(n).expect("n > 0")),
    )
    .expect("in-memory scan")
}

/// In-memory scan already hash partitioned on `keys`.
pub fn hashed_scan(
    ctx: &PlanContext,
    key: &str,
    cols: &[(&str, DataType)],
    n: usize,
    keys: &[&str],
) -> LogicalPlanRef {
    let by: ExprList = keys.iter().map(|k| col(*k)).collect();
    ctx.in_memory_scan(
        PartitionCacheEntry::new(key),
        schema(cols),
        Some(PartitionSpec::hash(n, by).expect("hash spec")),
    )
    .expect("in-memory scan")
}

pub fn keys(names: &[&str]) -> ExprList {
    names.iter().map(|n| col(*n)).collect()
}

pub fn count_kind(plan: &LogicalPlan, name: &str) -> usize {
    plan.post_order().filter(|n| n.name() == name).count()
}
