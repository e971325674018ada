//! Per-node schema, partition-spec and validation rules.

mod common;

use common::{keys, scan, schema};
use shardplan::prelude::*;

#[test]
fn test_filter_over_projection_over_scan() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("A", DataType::Int64), ("B", DataType::Utf8)], 3);
    let proj = ctx.projection(src.clone(), keys(&["A"]), None).expect("projection");
    let filter = ctx
        .filter(proj, ExprList::new(vec![col("A").gt(lit(0i64))]))
        .expect("filter");

    assert_eq!(filter.schema(), &schema(&[("A", DataType::Int64)]));
    assert_eq!(
        filter.required_columns().into_iter().collect::<Vec<_>>(),
        vec!["A"]
    );
    assert_eq!(filter.partition_spec(), src.partition_spec());
    assert_eq!(filter.num_nodes(), 3);
}

#[test]
fn test_sort_rejects_unsortable_keys() {
    let ctx = PlanContext::default();
    let src = scan(
        &ctx,
        "t",
        &[
            ("flag", DataType::Boolean),
            ("nothing", DataType::Null),
            ("blob", DataType::Binary),
            ("n", DataType::Float64),
            ("s", DataType::Utf8),
        ],
        5,
    );
    for bad in ["flag", "nothing", "blob"] {
        let err = ctx.sort(src.clone(), keys(&[bad]), false).unwrap_err();
        assert!(
            matches!(err, Error::Type { ref expr, .. } if expr.contains(bad)),
            "{bad}: {err}"
        );
    }
    // A single bad key poisons an otherwise valid key list.
    assert!(ctx.sort(src.clone(), keys(&["n", "flag"]), false).is_err());

    let sorted = ctx
        .sort(src.clone(), keys(&["n", "s"]), vec![true, false])
        .expect("sort");
    let spec = sorted.partition_spec();
    assert_eq!(spec.scheme(), PartitionScheme::Range);
    assert_eq!(spec.by(), Some(&keys(&["n", "s"])));
    assert_eq!(spec.num_partitions(), src.num_partitions());
    assert_eq!(sorted.schema(), src.schema());
    assert_eq!(sorted.op_level(), OpLevel::Global);
}

#[test]
fn test_sort_needs_keys() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("n", DataType::Int32)], 1);
    assert!(matches!(
        ctx.sort(src, ExprList::empty(), false),
        Err(Error::Shape(_))
    ));
}

#[test]
fn test_coalesce_bound() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("n", DataType::Int32)], 4);

    for n in 5..8 {
        assert!(matches!(ctx.coalesce(src.clone(), n), Err(Error::Shape(_))));
    }
    for n in 1..=4 {
        let c = ctx.coalesce(src.clone(), n).expect("coalesce");
        assert_eq!(c.partition_spec(), &PartitionSpec::unknown(n).expect("spec"));
        assert_eq!(c.op_level(), OpLevel::Global);
    }
}

#[test]
fn test_local_aggregate_scenario() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("k", DataType::Utf8), ("v", DataType::Int64)], 2);
    let agg = ctx
        .local_aggregate(src.clone(), vec![(col("v"), AggOp::Sum)], Some(keys(&["k"])))
        .expect("aggregate");

    assert_eq!(
        agg.schema(),
        &schema(&[("k", DataType::Utf8), ("v", DataType::Int64)])
    );
    assert_eq!(
        agg.required_columns().into_iter().collect::<Vec<_>>(),
        vec!["k", "v"]
    );
    assert_eq!(agg.partition_spec(), src.partition_spec());
    assert_eq!(agg.op_level(), OpLevel::Partition);
}

#[test]
fn test_local_aggregate_output_types() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("v", DataType::Int32)], 1);
    let agg = ctx
        .local_aggregate(
            src,
            vec![
                (col("v"), AggOp::Count),
                (col("v").alias("avg_v"), AggOp::Mean),
                (col("v").alias("all_v"), AggOp::List),
            ],
            Some(ExprList::empty()),
        )
        .expect("aggregate");

    assert_eq!(
        agg.schema(),
        &schema(&[
            ("v", DataType::Int64),
            ("avg_v", DataType::Float64),
            ("all_v", DataType::List(Box::new(DataType::Int32))),
        ])
    );
    match agg.kind() {
        NodeKind::LocalAggregate { group_by, .. } => assert!(group_by.is_none()),
        other => panic!("expected LocalAggregate, got {other:?}"),
    }
}

#[test]
fn test_local_aggregate_rejects_mistyped_operands() {
    let ctx = PlanContext::default();
    let src = scan(
        &ctx,
        "t",
        &[
            ("name", DataType::Utf8),
            ("flag", DataType::Boolean),
            ("blob", DataType::Binary),
        ],
        2,
    );
    let cases = [
        ("name", AggOp::Mean),
        ("name", AggOp::Sum),
        ("flag", AggOp::Sum),
        ("flag", AggOp::Min),
        ("blob", AggOp::Max),
    ];
    for (column, op) in cases {
        let err = ctx
            .local_aggregate(src.clone(), vec![(col(column), op)], None)
            .unwrap_err();
        assert!(
            matches!(err, Error::Type { ref expr, .. } if expr.contains(column)),
            "{op}({column}): {err}"
        );
    }

    // Counting and collecting accept any operand; min works on strings.
    let agg = ctx
        .local_aggregate(
            src,
            vec![
                (col("flag"), AggOp::Count),
                (col("blob"), AggOp::List),
                (col("name"), AggOp::Min),
            ],
            None,
        )
        .expect("aggregate");
    assert_eq!(agg.schema().column_names(), vec!["flag", "blob", "name"]);
}

#[test]
fn test_local_distinct() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("a", DataType::Utf8), ("b", DataType::Int64)], 2);
    let distinct = ctx.local_distinct(src, keys(&["b"])).expect("distinct");
    assert_eq!(distinct.schema(), &schema(&[("b", DataType::Int64)]));
    assert_eq!(distinct.op_level(), OpLevel::Partition);
    assert_eq!(
        distinct.required_columns().into_iter().collect::<Vec<_>>(),
        vec!["b"]
    );
}

#[test]
fn test_file_scan_prunes_and_inherits_partitions() {
    let ctx = PlanContext::default();
    let paths = scan(&ctx, "manifest", &[("path", DataType::Utf8)], 6);
    let source = schema(&[
        ("id", DataType::Int64),
        ("name", DataType::Utf8),
        ("score", DataType::Float64),
    ]);
    let params = FileScanParams::new(source, SourceInfo::Parquet, "path")
        .with_columns(vec!["score".into(), "id".into()])
        .with_predicate(ExprList::new(vec![col("name").not_equals(lit(""))]));
    let fs = ctx.file_scan(paths.clone(), params).expect("file scan");

    assert_eq!(fs.schema().column_names(), vec!["score", "id"]);
    assert_eq!(fs.partition_spec(), &PartitionSpec::unknown(6).expect("spec"));
    assert_eq!(fs.op_level(), OpLevel::Partition);
    assert_eq!(
        fs.required_columns().into_iter().collect::<Vec<_>>(),
        vec!["name", "path"]
    );
    assert!(fs.pretty_print().contains("columns_pruned=1"));

    let err = ctx
        .file_scan(
            paths.clone(),
            FileScanParams::new(schema(&[("id", DataType::Int64)]), SourceInfo::Json, "file"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Schema(_)));

    let explicit = ctx
        .file_scan(
            paths,
            FileScanParams::new(schema(&[("id", DataType::Int64)]), SourceInfo::Json, "path")
                .with_num_partitions(2),
        )
        .expect("file scan");
    assert_eq!(explicit.num_partitions(), 2);
}

#[test]
fn test_file_write_cannot_be_rebuilt() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("a", DataType::Int64)], 2);
    let write = ctx
        .file_write(src, "s3://bucket/out", StorageType::Parquet, None, None)
        .expect("write");

    assert_eq!(write.schema(), &schema(&[("file_path", DataType::Utf8)]));
    assert_eq!(write.num_partitions(), 2);
    assert!(matches!(write.rebuild(&ctx), Err(Error::Irreversible(_))));

    // Reusing a written plan on both sides of a join would need a rebuild.
    let err = ctx
        .join(write.clone(), write, keys(&["file_path"]), keys(&["file_path"]), JoinType::Inner)
        .unwrap_err();
    assert!(matches!(err, Error::Irreversible(_)));
}

#[test]
fn test_map_partition_keeps_partitioning() {
    let ctx = PlanContext::default();
    let src = scan(
        &ctx,
        "t",
        &[("id", DataType::Int64), ("tags", DataType::List(Box::new(DataType::Utf8)))],
        3,
    );
    let exploded = ctx
        .explode(src.clone(), ExprList::new(vec![col("tags").explode()]))
        .expect("explode");
    assert_eq!(exploded.partition_spec(), src.partition_spec());
    assert_eq!(
        exploded.schema(),
        &schema(&[("id", DataType::Int64), ("tags", DataType::Utf8)])
    );

    let err = ctx
        .explode(src, ExprList::new(vec![col("id").explode()]))
        .unwrap_err();
    assert!(matches!(err, Error::Type { .. }));
}

#[test]
fn test_repartition_and_projection_resources() {
    let ctx = PlanContext::default();
    let src = scan(&ctx, "t", &[("id", DataType::Int64)], 1);
    let hashed = ctx
        .repartition(src.clone(), keys(&["id"]), 8, PartitionScheme::Hash)
        .expect("repartition");
    assert_eq!(
        hashed.partition_spec(),
        &PartitionSpec::hash(8, keys(&["id"])).expect("spec")
    );

    let rr = ResourceRequest::default().with_cpus(2.0).with_memory_bytes(1 << 30);
    let proj = ctx
        .projection(hashed, ExprList::new(vec![col("id").multiply(lit(2i64)).alias("double")]), Some(rr.clone()))
        .expect("projection");
    assert_eq!(proj.resource_request(), Some(&rr));
    assert_eq!(proj.op_level(), OpLevel::Row);
    assert_eq!(proj.schema().column_names(), vec!["double"]);
    assert_eq!(proj.num_partitions(), 8);
    assert!(src.resource_request().is_none());
}
