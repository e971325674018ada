//! Node constructors. Each derives its output schema and partition spec from
//! its children and parameters and validates its operands before any node is
//! created.

use serde::{Deserialize, Serialize};

use shardplan_core::error::{Error, Result};
use shardplan_core::expr::{col, AggOp, Expr, ExprList};
use shardplan_core::partition::{PartitionScheme, PartitionSpec};
use shardplan_core::resource::ResourceRequest;
use shardplan_core::schema::{DataType, Field, Schema};
use shardplan_core::source::{PartitionCacheEntry, SourceInfo, StorageType};

use super::{Descending, LogicalPlanRef, MapPartitionOp, NodeKind, OpLevel};
use crate::context::PlanContext;

/// Parameters of a tabular file scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileScanParams {
    /// Declared schema of the files being read.
    pub source_schema: Schema,
    pub source_info: SourceInfo,
    /// Column of the path-producing child holding file paths.
    pub path_column: String,
    /// Columns to keep, in order; `None` keeps every source column.
    pub columns: Option<Vec<String>>,
    /// Pushdown predicate evaluated against the source schema.
    pub predicate: ExprList,
    /// Explicit partition count; defaults to the path child's.
    pub num_partitions: Option<usize>,
}

impl FileScanParams {
    pub fn new(source_schema: Schema, source_info: SourceInfo, path_column: impl Into<String>) -> Self {
        Self {
            source_schema,
            source_info,
            path_column: path_column.into(),
            columns: None,
            predicate: ExprList::empty(),
            num_partitions: None,
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn with_predicate(mut self, predicate: ExprList) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_num_partitions(mut self, n: usize) -> Self {
        self.num_partitions = Some(n);
        self
    }
}

/// Every clause must resolve to a boolean.
fn check_predicate(predicate: &ExprList, schema: &Schema) -> Result<()> {
    for e in predicate {
        let dtype = e.resolve_type(schema)?;
        if dtype != DataType::Boolean {
            return Err(Error::type_error(e, dtype, "filter"));
        }
    }
    Ok(())
}

/// Input schema with each exploded column replaced by its element type.
fn explode_schema(input: &Schema, explode_columns: &ExprList) -> Result<Schema> {
    let mut fields: Vec<Field> = input.fields().to_vec();
    for e in explode_columns {
        if !e.is_explode() {
            return Err(Error::Shape(format!(
                "Explode expects explode(...) expressions, got {e}"
            )));
        }
        let field = e.to_field(input)?;
        match fields.iter_mut().find(|f| f.name == field.name) {
            Some(slot) => *slot = field,
            None => fields.push(field),
        }
    }
    Schema::new(fields)
}

impl PlanContext {
    /// Read tabular files whose paths are produced by `filepaths`.
    pub fn file_scan(&self, filepaths: LogicalPlanRef, params: FileScanParams) -> Result<LogicalPlanRef> {
        filepaths.schema().get(&params.path_column).map_err(|_| {
            Error::Schema(format!(
                "FileScan requires a child with a '{}' column, got {}",
                params.path_column,
                filepaths.schema()
            ))
        })?;
        let schema = match &params.columns {
            Some(cols) => params.source_schema.project(cols)?,
            None => params.source_schema.clone(),
        };
        check_predicate(&params.predicate, &params.source_schema)?;
        let n = params
            .num_partitions
            .unwrap_or_else(|| filepaths.num_partitions());
        let spec = PartitionSpec::unknown(n)?;
        Ok(self.make(
            NodeKind::FileScan(params),
            schema,
            spec,
            OpLevel::Partition,
            vec![filepaths],
        ))
    }

    /// Scan partitions already materialized in an external cache.
    pub fn in_memory_scan(
        &self,
        cache_entry: PartitionCacheEntry,
        schema: Schema,
        partition_spec: Option<PartitionSpec>,
    ) -> Result<LogicalPlanRef> {
        let spec = match partition_spec {
            Some(spec) => spec,
            None => PartitionSpec::unknown(self.config().default_num_partitions)?,
        };
        Ok(self.make(
            NodeKind::InMemoryScan { cache_entry },
            schema,
            spec,
            OpLevel::Global,
            vec![],
        ))
    }

    /// Start of a synchronous request/response pipeline.
    pub fn request_source(&self, schema: Schema) -> Result<LogicalPlanRef> {
        Ok(self.make(
            NodeKind::RequestSource,
            schema,
            PartitionSpec::unknown(1)?,
            OpLevel::Row,
            vec![],
        ))
    }

    /// Terminal marker of a request/response pipeline.
    pub fn response_sink(&self, input: LogicalPlanRef) -> Result<LogicalPlanRef> {
        let schema = input.schema().clone();
        let spec = input.partition_spec().clone();
        Ok(self.make(NodeKind::ResponseSink, schema, spec, OpLevel::Row, vec![input]))
    }

    /// Write `input` under `root_dir`; the output is one row per written file.
    pub fn file_write(
        &self,
        input: LogicalPlanRef,
        root_dir: impl Into<String>,
        storage_type: StorageType,
        partition_cols: Option<ExprList>,
        compression: Option<String>,
    ) -> Result<LogicalPlanRef> {
        if !matches!(storage_type, StorageType::Parquet | StorageType::Csv) {
            return Err(Error::Unsupported(format!(
                "writing {storage_type} files; only parquet and csv are supported"
            )));
        }
        for field in input.schema() {
            if !field.data_type.is_primitive() {
                return Err(Error::type_error(
                    col(field.name.as_str()),
                    field.data_type.clone(),
                    "write non-primitive column",
                ));
            }
        }
        let partition_cols = partition_cols.unwrap_or_default();
        for e in &partition_cols {
            e.resolve_type(input.schema())?;
        }
        let schema = Schema::new(vec![Field::new("file_path", DataType::Utf8)])?;
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::FileWrite {
                root_dir: root_dir.into(),
                storage_type,
                partition_cols,
                compression,
            },
            schema,
            spec,
            OpLevel::Partition,
            vec![input],
        ))
    }

    /// Keep rows matching every clause of `predicate`.
    pub fn filter(&self, input: LogicalPlanRef, predicate: ExprList) -> Result<LogicalPlanRef> {
        check_predicate(&predicate, input.schema())?;
        let schema = input.schema().clone();
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::Filter { predicate },
            schema,
            spec,
            OpLevel::Partition,
            vec![input],
        ))
    }

    pub fn projection(
        &self,
        input: LogicalPlanRef,
        projection: ExprList,
        resource_request: Option<ResourceRequest>,
    ) -> Result<LogicalPlanRef> {
        let schema = projection.to_schema(input.schema())?;
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::Projection {
                projection,
                resource_request,
            },
            schema,
            spec,
            OpLevel::Row,
            vec![input],
        ))
    }

    /// Global sort; the output is range partitioned on the sort keys.
    pub fn sort(
        &self,
        input: LogicalPlanRef,
        sort_by: ExprList,
        descending: impl Into<Descending>,
    ) -> Result<LogicalPlanRef> {
        if sort_by.is_empty() {
            return Err(Error::Shape("Sort requires at least one sort key".into()));
        }
        for e in &sort_by {
            let dtype = e.resolve_type(input.schema())?;
            if !dtype.is_sortable() {
                return Err(Error::type_error(e, dtype, "sort"));
            }
        }
        let descending: Descending = descending.into();
        let descending = descending.normalize(sort_by.len())?;
        let schema = input.schema().clone();
        let spec = PartitionSpec::range(input.num_partitions(), sort_by.clone())?;
        Ok(self.make(
            NodeKind::Sort {
                sort_by,
                descending,
            },
            schema,
            spec,
            OpLevel::Global,
            vec![input],
        ))
    }

    pub fn map_partition(&self, input: LogicalPlanRef, op: MapPartitionOp) -> Result<LogicalPlanRef> {
        let schema = match &op {
            MapPartitionOp::Explode { explode_columns } => {
                if explode_columns.is_empty() {
                    return Err(Error::Shape("Explode requires at least one expression".into()));
                }
                explode_schema(input.schema(), explode_columns)?
            }
            MapPartitionOp::Custom { output_schema, .. } => output_schema.clone(),
        };
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::MapPartition { op },
            schema,
            spec,
            OpLevel::Partition,
            vec![input],
        ))
    }

    /// Shorthand for a `MapPartition` running an explode.
    pub fn explode(&self, input: LogicalPlanRef, explode_columns: ExprList) -> Result<LogicalPlanRef> {
        self.map_partition(input, MapPartitionOp::Explode { explode_columns })
    }

    /// Cap rows in every partition independently.
    pub fn local_limit(&self, input: LogicalPlanRef, num: usize) -> Result<LogicalPlanRef> {
        let schema = input.schema().clone();
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::LocalLimit { num },
            schema,
            spec,
            OpLevel::Partition,
            vec![input],
        ))
    }

    /// Cap total rows across all partitions.
    pub fn global_limit(&self, input: LogicalPlanRef, num: usize) -> Result<LogicalPlanRef> {
        let schema = input.schema().clone();
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::GlobalLimit { num },
            schema,
            spec,
            OpLevel::Global,
            vec![input],
        ))
    }

    /// Per-partition row count in a single `count` column.
    pub fn local_count(&self, input: LogicalPlanRef) -> Result<LogicalPlanRef> {
        let schema = Schema::new(vec![Field::new("count", DataType::Int64)])?;
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::LocalCount,
            schema,
            spec,
            OpLevel::Partition,
            vec![input],
        ))
    }

    pub fn repartition(
        &self,
        input: LogicalPlanRef,
        partition_by: ExprList,
        num_partitions: usize,
        scheme: PartitionScheme,
    ) -> Result<LogicalPlanRef> {
        for e in &partition_by {
            e.resolve_type(input.schema())?;
        }
        let spec = PartitionSpec::new(scheme, num_partitions, Some(partition_by.clone()))?;
        let schema = input.schema().clone();
        Ok(self.make(
            NodeKind::Repartition {
                partition_by,
                scheme,
            },
            schema,
            spec,
            OpLevel::Global,
            vec![input],
        ))
    }

    /// Merge partitions down to `num_partitions`; never increases the count.
    pub fn coalesce(&self, input: LogicalPlanRef, num_partitions: usize) -> Result<LogicalPlanRef> {
        if num_partitions > input.num_partitions() {
            return Err(Error::Shape(format!(
                "Coalesce can only reduce the number of partitions: {} vs {}",
                num_partitions,
                input.num_partitions()
            )));
        }
        let spec = PartitionSpec::unknown(num_partitions)?;
        let schema = input.schema().clone();
        Ok(self.make(NodeKind::Coalesce, schema, spec, OpLevel::Global, vec![input]))
    }

    /// Partition-local aggregation. Output columns are the group-by columns
    /// followed by one column per aggregation, named after its operand.
    pub fn local_aggregate(
        &self,
        input: LogicalPlanRef,
        aggs: Vec<(Expr, AggOp)>,
        group_by: Option<ExprList>,
    ) -> Result<LogicalPlanRef> {
        let group_by = group_by.filter(|g| !g.is_empty());
        let mut fields = match &group_by {
            Some(g) => g.to_schema(input.schema())?.fields().to_vec(),
            None => Vec::new(),
        };
        for (e, op) in &aggs {
            let dtype = e.resolve_type(input.schema())?;
            fields.push(Field::new(e.name(), op.output_type(e, &dtype)?));
        }
        let schema = Schema::new(fields)?;
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::LocalAggregate { aggs, group_by },
            schema,
            spec,
            OpLevel::Partition,
            vec![input],
        ))
    }

    /// Partition-local distinct over the group-by projection.
    pub fn local_distinct(&self, input: LogicalPlanRef, group_by: ExprList) -> Result<LogicalPlanRef> {
        let schema = group_by.to_schema(input.schema())?;
        let spec = input.partition_spec().clone();
        Ok(self.make(
            NodeKind::LocalDistinct { group_by },
            schema,
            spec,
            OpLevel::Partition,
            vec![input],
        ))
    }
}
