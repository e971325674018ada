#![forbid(unsafe_code)]
//! shardplan-core: value types shared by the logical-plan layer.
//!
//! Everything here is pure data plus construction-time validation: schemas,
//! the minimal expression collaborator, partition specs, node ids, configs,
//! and stable hashing. No I/O, no async.

pub mod config;
pub mod error;
pub mod expr;
pub mod hash;
pub mod id;
pub mod partition;
pub mod prelude;
pub mod resource;
pub mod schema;
pub mod source;
pub mod types;

pub use error::{Error, Result};
