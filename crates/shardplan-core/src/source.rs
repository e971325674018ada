//! Opaque descriptors passed through scan and write nodes.
//!
//! The plan layer never interprets these; it only carries, prints, and
//! compares them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    Csv,
    Json,
    Parquet,
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageType::Csv => "csv",
            StorageType::Json => "json",
            StorageType::Parquet => "parquet",
        };
        f.write_str(s)
    }
}

/// Format-specific read options for a file scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceInfo {
    Csv { delimiter: char, has_headers: bool },
    Json,
    Parquet,
}

impl SourceInfo {
    pub fn storage_type(&self) -> StorageType {
        match self {
            SourceInfo::Csv { .. } => StorageType::Csv,
            SourceInfo::Json => StorageType::Json,
            SourceInfo::Parquet => StorageType::Parquet,
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceInfo::Csv {
                delimiter,
                has_headers,
            } => write!(f, "csv(delimiter={delimiter:?}, has_headers={has_headers})"),
            SourceInfo::Json => write!(f, "json"),
            SourceInfo::Parquet => write!(f, "parquet"),
        }
    }
}

/// Handle to materialized partitions held in an external cache.
///
/// The key and the entry's lifecycle are owned by the cache; two handles are
/// equal when they name the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionCacheEntry {
    key: String,
}

impl PartitionCacheEntry {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
