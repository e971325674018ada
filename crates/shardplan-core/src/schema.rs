//! Logical schema types. Pure data; no Arrow dependency here.
//!
//! A [`Schema`] is an ordered list of uniquely named [`Field`]s. Equality is
//! positional: same fields, same order.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::{col, ExprList};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Null,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Utf8,
    Binary,
    Date64,
    List(Box<DataType>),
}

impl DataType {
    pub fn is_integer(&self) -> bool {
        use DataType::*;
        matches!(
            self,
            Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating()
    }

    /// Everything except nested types can be written out by a file sink.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, DataType::List(_))
    }

    /// Types a sort key may not resolve to.
    pub fn is_sortable(&self) -> bool {
        !matches!(self, DataType::Null | DataType::Binary | DataType::Boolean)
    }

    /// Byte width used to rank integer types when widening.
    fn integer_rank(&self) -> u8 {
        use DataType::*;
        match self {
            Int8 | UInt8 => 1,
            Int16 | UInt16 => 2,
            Int32 | UInt32 => 4,
            Int64 | UInt64 => 8,
            _ => 0,
        }
    }

    /// Result type of an arithmetic operation over two numeric operands.
    pub fn numeric_supertype(&self, other: &DataType) -> Option<DataType> {
        if !self.is_numeric() || !other.is_numeric() {
            return None;
        }
        if self.is_floating() || other.is_floating() {
            return Some(DataType::Float64);
        }
        if self.integer_rank() >= other.integer_rank() {
            Some(self.clone())
        } else {
            Some(other.clone())
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::List(inner) => write!(f, "List[{inner}]"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)
    }
}

/// Ordered fields with unique names. Deserialization runs the same
/// duplicate check as [`Schema::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SchemaRepr")]
pub struct Schema {
    fields: Vec<Field>,
}

/// Unvalidated wire form of a [`Schema`].
#[derive(Deserialize)]
struct SchemaRepr {
    fields: Vec<Field>,
}

impl TryFrom<SchemaRepr> for Schema {
    type Error = Error;

    fn try_from(repr: SchemaRepr) -> Result<Self> {
        Schema::new(repr.fields)
    }
}

impl Schema {
    /// Build a schema, rejecting duplicate field names.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for f in &fields {
            if !seen.insert(f.name.as_str()) {
                return Err(Error::Schema(format!(
                    "duplicate field name '{}' in schema",
                    f.name
                )));
            }
        }
        Ok(Self { fields })
    }

    pub fn empty() -> Self {
        Self { fields: vec![] }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Look a field up by name; absent names are an error.
    pub fn get(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| {
                Error::Schema(format!(
                    "column '{}' not found in schema [{}]",
                    name,
                    self.column_names().join(", ")
                ))
            })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Keep only `columns`, in the order given.
    pub fn project(&self, columns: &[String]) -> Result<Schema> {
        let fields = columns
            .iter()
            .map(|c| self.get(c).cloned())
            .collect::<Result<Vec<_>>>()?;
        Schema::new(fields)
    }

    /// Concatenate two schemas. Names must stay unique.
    pub fn union(&self, other: &Schema) -> Result<Schema> {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.iter().cloned());
        Schema::new(fields)
    }

    /// One `col(name)` expression per field, in order.
    pub fn to_column_expressions(&self) -> ExprList {
        ExprList::new(self.fields.iter().map(|f| col(f.name.as_str())).collect())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, "]")
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
