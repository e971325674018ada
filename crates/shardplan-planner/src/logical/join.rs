//! Join construction: id disjointness, output schema union, and
//! co-partitioning of both sides on their join keys.

use shardplan_core::error::{Error, Result};
use shardplan_core::expr::{col, ExprList};
use shardplan_core::partition::{PartitionScheme, PartitionSpec};
use shardplan_core::schema::DataType;

use super::{JoinType, LogicalPlanRef, NodeKind, OpLevel};
use crate::context::PlanContext;

impl PlanContext {
    /// Equi-join `left` and `right` on pairwise equal keys.
    ///
    /// If both sides share node ids (a self-join) the right side is rebuilt
    /// first. Sides that are not already hash partitioned on their keys with
    /// the chosen partition count are wrapped in a `Repartition`.
    pub fn join(
        &self,
        left: LogicalPlanRef,
        right: LogicalPlanRef,
        left_on: ExprList,
        right_on: ExprList,
        how: JoinType,
    ) -> Result<LogicalPlanRef> {
        if left_on.len() != right_on.len() {
            return Err(Error::Shape(format!(
                "join needs the same number of keys on both sides, got {} and {}",
                left_on.len(),
                right_on.len()
            )));
        }
        if left_on.is_empty() {
            return Err(Error::Shape("join needs at least one key".into()));
        }

        let right = if left.is_disjoint(&right) {
            right
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                left = left.id().get(),
                right = right.id().get(),
                "join sides share nodes, rebuilding right side"
            );
            let rebuilt = right.rebuild(self)?;
            if !left.is_disjoint(&rebuilt) {
                return Err(Error::Invariant(format!(
                    "join sides still share node ids after rebuilding {}",
                    right.id()
                )));
            }
            rebuilt
        };

        for (keys, side) in [(&left_on, &left), (&right_on, &right)] {
            for e in keys {
                let dtype = e.resolve_type(side.schema())?;
                if dtype == DataType::Null {
                    return Err(Error::type_error(e, dtype, "join"));
                }
            }
        }

        let (output_projection, schema) = match how {
            JoinType::Left | JoinType::Right => {
                return Err(Error::Unsupported(format!("{how:?} join")));
            }
            JoinType::Inner => {
                let right_keys = right_on.to_name_set();
                let left_columns = left.schema().to_column_expressions();
                let right_columns: ExprList = right
                    .schema()
                    .iter()
                    .filter(|f| !right_keys.contains(&f.name))
                    .map(|f| col(f.name.as_str()))
                    .collect();
                let unioned =
                    left_columns.union(&right_columns, &self.config().join_rename_prefix)?;
                let renamed_right: ExprList =
                    unioned.iter().skip(left_columns.len()).cloned().collect();
                let schema = left_columns
                    .to_schema(left.schema())?
                    .union(&renamed_right.to_schema(right.schema())?)?;
                (unioned, schema)
            }
        };

        let num_partitions = left.num_partitions().max(right.num_partitions());
        let left = self.co_partition(left, &left_on, num_partitions)?;
        let right = self.co_partition(right, &right_on, num_partitions)?;

        let spec = left.partition_spec().clone();
        Ok(self.make(
            NodeKind::Join {
                left_on,
                right_on,
                how,
                output_projection,
            },
            schema,
            spec,
            OpLevel::Partition,
            vec![left, right],
        ))
    }

    /// Hash partition `side` on `keys` into `num_partitions`, unless it
    /// already is, or both it and the target are a single partition.
    fn co_partition(
        &self,
        side: LogicalPlanRef,
        keys: &ExprList,
        num_partitions: usize,
    ) -> Result<LogicalPlanRef> {
        if num_partitions == 1 && side.num_partitions() == 1 {
            #[cfg(feature = "tracing")]
            tracing::trace!(side = side.id().get(), "single partition join side, no repartition");
            return Ok(side);
        }
        let wanted = PartitionSpec::hash(num_partitions, keys.clone())?;
        if side.partition_spec() == &wanted {
            #[cfg(feature = "tracing")]
            tracing::trace!(side = side.id().get(), spec = %wanted, "join side already co-partitioned");
            return Ok(side);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            side = side.id().get(),
            from = %side.partition_spec(),
            to = %wanted,
            "repartitioning join side"
        );
        self.repartition(side, keys.clone(), num_partitions, PartitionScheme::Hash)
    }
}

#[cfg(test)]
mod tests {
    use shardplan_core::expr::lit;
    use shardplan_core::schema::{Field, Schema};
    use shardplan_core::source::PartitionCacheEntry;
    use shardplan_core::types::Scalar;

    use super::*;

    fn table(ctx: &PlanContext, key: &str, cols: &[(&str, DataType)], n: usize) -> LogicalPlanRef {
        let fields = cols
            .iter()
            .map(|(name, t)| Field::new(*name, t.clone()))
            .collect();
        ctx.in_memory_scan(
            PartitionCacheEntry::new(key),
            Schema::new(fields).unwrap(),
            Some(PartitionSpec::unknown(n).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn key_count_mismatch_is_shape_error() {
        let ctx = PlanContext::default();
        let l = table(&ctx, "l", &[("id", DataType::Int64)], 1);
        let r = table(&ctx, "r", &[("id", DataType::Int64)], 1);
        let err = ctx
            .join(
                l,
                r,
                ExprList::new(vec![col("id")]),
                ExprList::new(vec![col("id"), col("id")]),
                JoinType::Inner,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn null_key_is_type_error() {
        let ctx = PlanContext::default();
        let l = table(&ctx, "l", &[("id", DataType::Int64)], 1);
        let r = table(&ctx, "r", &[("id", DataType::Null)], 1);
        let err = ctx
            .join(
                l.clone(),
                r,
                ExprList::new(vec![col("id")]),
                ExprList::new(vec![col("id")]),
                JoinType::Inner,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Type { dtype: DataType::Null, .. }));

        let err = ctx
            .join(
                l.clone(),
                l,
                ExprList::new(vec![col("id")]),
                ExprList::new(vec![lit(Scalar::Null)]),
                JoinType::Inner,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Type { .. }));
    }

    #[test]
    fn left_and_right_joins_are_unsupported() {
        let ctx = PlanContext::default();
        for how in [JoinType::Left, JoinType::Right] {
            let l = table(&ctx, "l", &[("id", DataType::Int64)], 2);
            let r = table(&ctx, "r", &[("id", DataType::Int64)], 2);
            let err = ctx
                .join(
                    l,
                    r,
                    ExprList::new(vec![col("id")]),
                    ExprList::new(vec![col("id")]),
                    how,
                )
                .unwrap_err();
            assert!(matches!(err, Error::Unsupported(_)));
        }
    }

    #[test]
    fn partition_count_takes_the_larger_side() {
        let ctx = PlanContext::default();
        let l = table(&ctx, "l", &[("id", DataType::Int64)], 2);
        let r = table(&ctx, "r", &[("id", DataType::Int64)], 5);
        let joined = ctx
            .join(
                l,
                r,
                ExprList::new(vec![col("id")]),
                ExprList::new(vec![col("id")]),
                JoinType::Inner,
            )
            .unwrap();
        assert_eq!(joined.num_partitions(), 5);
        assert_eq!(joined.partition_spec().scheme(), PartitionScheme::Hash);
        for child in joined.children() {
            assert_eq!(child.name(), "Repartition");
            assert_eq!(child.num_partitions(), 5);
        }
        assert_eq!(joined.op_level(), OpLevel::Partition);
        assert_eq!(
            joined.required_columns().into_iter().collect::<Vec<_>>(),
            vec!["id"]
        );
    }

    #[test]
    fn custom_rename_prefix() {
        let ctx = PlanContext::new(shardplan_core::config::PlannerConfig {
            join_rename_prefix: "r_".into(),
            ..Default::default()
        })
        .unwrap();
        let l = table(&ctx, "l", &[("id", DataType::Int64), ("x", DataType::Utf8)], 1);
        let r = table(&ctx, "r", &[("rid", DataType::Int64), ("x", DataType::Float64)], 1);
        let joined = ctx
            .join(
                l,
                r,
                ExprList::new(vec![col("id")]),
                ExprList::new(vec![col("rid")]),
                JoinType::Inner,
            )
            .unwrap();
        assert_eq!(joined.schema().column_names(), vec!["id", "x", "r_x"]);
        assert_eq!(joined.schema().get("r_x").unwrap().data_type, DataType::Float64);
    }
}
