//! Box-drawing tree rendering of a plan, for debugging and snapshot tests.
//!
//! The layout is deterministic but not a stable format.

use std::fmt;

use shardplan_core::config::PlannerConfig;

use crate::logical::{LogicalPlan, MapPartitionOp, NodeKind};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Field values longer than this wrap onto continuation lines.
    pub width: usize,
    /// Append `(id=N)` to each node name.
    pub show_ids: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

impl DisplayOptions {
    pub fn from_config(cfg: &PlannerConfig) -> Self {
        Self {
            width: cfg.display_width.max(1),
            show_ids: cfg.display_ids,
        }
    }
}

impl LogicalPlan {
    pub fn pretty_print(&self) -> String {
        self.pretty_print_with(DisplayOptions::default())
    }

    pub fn pretty_print_with(&self, opts: DisplayOptions) -> String {
        let mut out = String::new();
        render(self, &opts, "", "┌─", &mut out);
        out
    }

    /// Node name followed by one `key=value` line per field.
    fn describe(&self, opts: &DisplayOptions) -> Vec<String> {
        let mut header = self.name().to_string();
        if opts.show_ids {
            header.push_str(&format!(" (id={})", self.id().get()));
        }
        let mut lines = vec![header];
        for (key, value) in self.display_fields() {
            let mut wrapped = wrap(&value, opts.width).into_iter();
            if let Some(first) = wrapped.next() {
                lines.push(format!("{INDENT}{key}={first}"));
            }
            lines.extend(wrapped.map(|l| format!("{INDENT}{INDENT}{l}")));
        }
        lines
    }

    fn display_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields: Vec<(&'static str, String)> = Vec::new();
        match self.kind() {
            NodeKind::Projection { projection, .. } => {
                fields.push(("output", projection.to_string()));
            }
            _ => fields.push(("output", self.schema().to_string())),
        }
        match self.kind() {
            NodeKind::FileScan(params) => {
                let pruned = params.source_schema.len().saturating_sub(self.schema().len());
                fields.push(("columns_pruned", pruned.to_string()));
                fields.push(("source_info", params.source_info.to_string()));
                if !params.predicate.is_empty() {
                    fields.push(("predicate", params.predicate.to_string()));
                }
            }
            NodeKind::InMemoryScan { cache_entry } => {
                fields.push(("cache_id", cache_entry.key().to_string()));
            }
            NodeKind::RequestSource | NodeKind::ResponseSink => {}
            NodeKind::FileWrite {
                root_dir,
                storage_type,
                partition_cols,
                compression,
            } => {
                fields.push(("root_dir", root_dir.clone()));
                fields.push(("storage_type", storage_type.to_string()));
                if !partition_cols.is_empty() {
                    fields.push(("partition_cols", partition_cols.to_string()));
                }
                if let Some(c) = compression {
                    fields.push(("compression", c.clone()));
                }
            }
            NodeKind::Filter { predicate } => fields.push(("predicate", predicate.to_string())),
            NodeKind::Projection {
                resource_request, ..
            } => {
                if let Some(rr) = resource_request {
                    fields.push(("resource_request", rr.to_string()));
                }
            }
            NodeKind::Sort {
                sort_by,
                descending,
            } => {
                fields.push(("sort_by", sort_by.to_string()));
                fields.push(("desc", format!("{descending:?}")));
            }
            NodeKind::MapPartition { op } => {
                let op = match op {
                    MapPartitionOp::Explode { explode_columns } => {
                        format!("Explode({explode_columns})")
                    }
                    MapPartitionOp::Custom { name, .. } => name.clone(),
                };
                fields.push(("op", op));
            }
            NodeKind::LocalLimit { num } | NodeKind::GlobalLimit { num } => {
                fields.push(("num", num.to_string()));
            }
            NodeKind::LocalCount => {}
            NodeKind::Repartition { .. } | NodeKind::Coalesce => {
                fields.push(("num_partitions", self.num_partitions().to_string()));
            }
            NodeKind::LocalAggregate { aggs, group_by } => {
                let agg = aggs
                    .iter()
                    .map(|(e, op)| format!("{op}({e})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                fields.push(("agg", format!("[{agg}]")));
                if let Some(g) = group_by {
                    fields.push(("group_by", g.to_string()));
                }
            }
            NodeKind::LocalDistinct { group_by } => {
                fields.push(("group_by", group_by.to_string()));
            }
            NodeKind::Join {
                left_on, right_on, ..
            } => {
                fields.push(("left_on", left_on.to_string()));
                fields.push(("right_on", right_on.to_string()));
                fields.push(("num_partitions", self.num_partitions().to_string()));
            }
        }
        fields.push(("partitioning", self.partition_spec().to_string()));
        fields
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

fn render(node: &LogicalPlan, opts: &DisplayOptions, prefix: &str, header: &str, out: &mut String) {
    let lines = node.describe(opts);
    let children = node.children();

    let body_prefix = if children.is_empty() {
        format!("{prefix} ")
    } else {
        format!("{prefix}│")
    };
    let mut lines = lines.iter();
    if let Some(first) = lines.next() {
        out.push_str(&format!("{header}{first}\n"));
    }
    for line in lines {
        out.push_str(&format!("{body_prefix}{line}\n"));
    }
    out.push_str(&format!("{body_prefix}\n"));

    if children.len() < 2 {
        for child in children {
            let header = if child.is_leaf() {
                format!("{prefix}└──")
            } else {
                format!("{prefix}├──")
            };
            render(child, opts, prefix, &header, out);
        }
        return;
    }

    let n = children.len();
    for (i, child) in children.iter().enumerate() {
        let position = n - i;
        let last = if child.is_leaf() { "───" } else { "─┬─" };
        let child_prefix = if i + 1 != n {
            format!("{prefix}{}", "   │  ".repeat(position - 1))
        } else {
            format!("{prefix}      ")
        };
        let kept: String = {
            let chars: Vec<char> = child_prefix.chars().collect();
            chars[..chars.len().saturating_sub(3 * position)].iter().collect()
        };
        let header = format!("{kept}└─{}{last}", "─┬─".repeat(position - 1));
        render(child, opts, &child_prefix, &header, out);
    }
}

/// Greedy wrap on `", "` boundaries. A single token longer than `width`
/// gets a line of its own.
fn wrap(value: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for (i, token) in value.split(", ").enumerate() {
        let piece = if i == 0 {
            token.to_string()
        } else {
            format!(", {token}")
        };
        if !current.is_empty() && current.chars().count() + piece.chars().count() > width {
            lines.push(std::mem::take(&mut current));
            current.push_str(piece.trim_start_matches(", "));
        } else {
            current.push_str(&piece);
        }
    }
    lines.push(current);
    lines
}

#[cfg(test)]
mod tests {
    use shardplan_core::expr::{col, lit, ExprList};
    use shardplan_core::partition::PartitionSpec;
    use shardplan_core::schema::{DataType, Field, Schema};
    use shardplan_core::source::PartitionCacheEntry;

    use super::*;
    use crate::logical::JoinType;
    use crate::PlanContext;

    fn scan(ctx: &PlanContext, key: &str) -> crate::logical::LogicalPlanRef {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("x", DataType::Utf8),
        ])
        .unwrap();
        ctx.in_memory_scan(
            PartitionCacheEntry::new(key),
            schema,
            Some(PartitionSpec::unknown(1).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn wrap_splits_on_commas() {
        assert_eq!(wrap("a, b, c", 80), vec!["a, b, c"]);
        assert_eq!(wrap("aaaa, bbbb, cccc", 10), vec!["aaaa, bbbb", "cccc"]);
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn single_child_chain() {
        let ctx = PlanContext::default();
        let plan = ctx
            .filter(scan(&ctx, "t"), ExprList::new(vec![col("id").gt(lit(3i64))]))
            .unwrap();
        let text = plan.pretty_print();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "┌─Filter");
        assert!(lines[1].starts_with("│    output="));
        assert!(text.contains("│    predicate=[[col(id) > lit(3)]]"));
        assert!(text.contains("└──InMemoryScan"));
        assert!(text.contains("     cache_id=t"));
        assert!(text.contains("partitioning=UNKNOWN(1)"));
    }

    #[test]
    fn two_children_fan_out() {
        let ctx = PlanContext::default();
        let left = ctx.local_limit(scan(&ctx, "l"), 1).unwrap();
        let plan = ctx
            .join(
                left,
                scan(&ctx, "r"),
                ExprList::new(vec![col("id")]),
                ExprList::new(vec![col("id")]),
                JoinType::Inner,
            )
            .unwrap();
        let text = plan.pretty_print();
        assert!(text.starts_with("┌─Join\n"));
        assert!(text.contains("└──┬──┬─LocalLimit"));
        assert!(text.contains("└────InMemoryScan"));
        assert_eq!(text, plan.pretty_print());
        assert_eq!(text, plan.to_string());
    }

    #[test]
    fn ids_shown_on_request() {
        let ctx = PlanContext::default();
        let plan = scan(&ctx, "t");
        let text = plan.pretty_print_with(DisplayOptions {
            width: 80,
            show_ids: true,
        });
        assert!(text.starts_with(&format!("┌─InMemoryScan (id={})", plan.id().get())));
    }
}
