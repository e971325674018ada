//! Convenient re-exports for downstream crates.

pub use crate::config::PlannerConfig;
pub use crate::error::{Error, Result};
pub use crate::expr::{col, lit, AggOp, Expr, ExprList, Operator};
pub use crate::hash::Fingerprint;
pub use crate::id::{IdAllocator, NodeId};
pub use crate::partition::{PartitionScheme, PartitionSpec};
pub use crate::resource::ResourceRequest;
pub use crate::schema::{DataType, Field, Schema};
pub use crate::source::{PartitionCacheEntry, SourceInfo, StorageType};
pub use crate::types::Scalar;
