//! Partitioning metadata: how a node's output rows are spread across workers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::ExprList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionScheme {
    Unknown,
    Range,
    Hash,
    Random,
}

impl PartitionScheme {
    /// Only range and hash partitioning are keyed.
    pub fn is_keyed(self) -> bool {
        matches!(self, PartitionScheme::Range | PartitionScheme::Hash)
    }
}

impl fmt::Display for PartitionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartitionScheme::Unknown => "UNKNOWN",
            PartitionScheme::Range => "RANGE",
            PartitionScheme::Hash => "HASH",
            PartitionScheme::Random => "RANDOM",
        };
        f.write_str(s)
    }
}

/// Immutable partitioning descriptor. Equality is structural on all three
/// fields, key expressions included.
///
/// Invariants: `num_partitions >= 1`; `by` is only ever set for keyed
/// schemes and is never an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSpec {
    scheme: PartitionScheme,
    num_partitions: usize,
    by: Option<ExprList>,
}

impl PartitionSpec {
    /// Validating constructor. An empty `by` list is normalized to `None`.
    pub fn new(scheme: PartitionScheme, num_partitions: usize, by: Option<ExprList>) -> Result<Self> {
        if num_partitions == 0 {
            return Err(Error::Shape(format!(
                "{scheme} partitioning needs at least 1 partition, got 0"
            )));
        }
        let by = by.filter(|b| !b.is_empty());
        if let Some(keys) = &by {
            if !scheme.is_keyed() {
                return Err(Error::Shape(format!(
                    "{scheme} partitioning cannot be keyed, got partition_by {keys}"
                )));
            }
        }
        Ok(Self {
            scheme,
            num_partitions,
            by,
        })
    }

    pub fn unknown(num_partitions: usize) -> Result<Self> {
        Self::new(PartitionScheme::Unknown, num_partitions, None)
    }

    pub fn hash(num_partitions: usize, by: ExprList) -> Result<Self> {
        Self::new(PartitionScheme::Hash, num_partitions, Some(by))
    }

    pub fn range(num_partitions: usize, by: ExprList) -> Result<Self> {
        Self::new(PartitionScheme::Range, num_partitions, Some(by))
    }

    pub fn scheme(&self) -> PartitionScheme {
        self.scheme
    }

    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    pub fn by(&self) -> Option<&ExprList> {
        self.by.as_ref()
    }
}

impl fmt::Display for PartitionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.scheme, self.num_partitions)?;
        if let Some(by) = &self.by {
            write!(f, " by {by}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    #[test]
    fn zero_partitions_rejected() {
        assert!(matches!(PartitionSpec::unknown(0), Err(Error::Shape(_))));
    }

    #[test]
    fn random_cannot_carry_keys() {
        let err = PartitionSpec::new(
            PartitionScheme::Random,
            4,
            Some(ExprList::new(vec![col("a")])),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
        // An empty key list is the same as none.
        let ok = PartitionSpec::new(PartitionScheme::Random, 4, Some(ExprList::empty())).unwrap();
        assert!(ok.by().is_none());
    }

    #[test]
    fn equality_compares_keys_structurally() {
        let a = PartitionSpec::hash(4, ExprList::new(vec![col("id")])).unwrap();
        let b = PartitionSpec::hash(4, ExprList::new(vec![col("id")])).unwrap();
        let c = PartitionSpec::hash(4, ExprList::new(vec![col("other")])).unwrap();
        let d = PartitionSpec::hash(8, ExprList::new(vec![col("id")])).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(a, PartitionSpec::range(4, ExprList::new(vec![col("id")])).unwrap());
    }

    #[test]
    fn display() {
        let spec = PartitionSpec::hash(2, ExprList::new(vec![col("k")])).unwrap();
        assert_eq!(spec.to_string(), "HASH(2) by [col(k)]");
        assert_eq!(PartitionSpec::unknown(1).unwrap().to_string(), "UNKNOWN(1)");
    }
}
