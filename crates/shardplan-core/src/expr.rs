//! Minimal expression collaborator used by plan nodes.
//!
//! Plan construction only relies on four things from expressions: an output
//! name, the set of columns read, the type an expression resolves to against
//! a schema, and schema derivation for expression lists. Everything else
//! (evaluation, kernels) lives downstream.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{DataType, Field, Schema};
use crate::types::Scalar;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl Operator {
    pub fn is_comparison(self) -> bool {
        use Operator::*;
        matches!(self, Eq | NotEq | Lt | LtEq | Gt | GtEq)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    fn symbol(self) -> &'static str {
        use Operator::*;
        match self {
            Eq => "==",
            NotEq => "!=",
            Lt => "<",
            LtEq => "<=",
            Gt => ">",
            GtEq => ">=",
            And => "&",
            Or => "|",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Column(String),
    Literal(Scalar),
    Alias {
        expr: Box<Expr>,
        name: String,
    },
    BinaryOp {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    IsNull(Box<Expr>),
    Cast {
        expr: Box<Expr>,
        to: DataType,
    },
    /// One output row per element of a list-typed operand.
    Explode(Box<Expr>),
}

/// Reference a column by name.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// Literal value.
pub fn lit(value: impl Into<Scalar>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    fn binary(self, op: Operator, other: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn equals(self, other: Expr) -> Expr {
        self.binary(Operator::Eq, other)
    }

    pub fn not_equals(self, other: Expr) -> Expr {
        self.binary(Operator::NotEq, other)
    }

    pub fn lt(self, other: Expr) -> Expr {
        self.binary(Operator::Lt, other)
    }

    pub fn lt_eq(self, other: Expr) -> Expr {
        self.binary(Operator::LtEq, other)
    }

    pub fn gt(self, other: Expr) -> Expr {
        self.binary(Operator::Gt, other)
    }

    pub fn gt_eq(self, other: Expr) -> Expr {
        self.binary(Operator::GtEq, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        self.binary(Operator::And, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        self.binary(Operator::Or, other)
    }

    pub fn plus(self, other: Expr) -> Expr {
        self.binary(Operator::Plus, other)
    }

    pub fn minus(self, other: Expr) -> Expr {
        self.binary(Operator::Minus, other)
    }

    pub fn multiply(self, other: Expr) -> Expr {
        self.binary(Operator::Multiply, other)
    }

    pub fn divide(self, other: Expr) -> Expr {
        self.binary(Operator::Divide, other)
    }

    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull(Box::new(self))
    }

    pub fn cast(self, to: DataType) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            to,
        }
    }

    pub fn explode(self) -> Expr {
        Expr::Explode(Box::new(self))
    }

    pub fn alias(self, name: impl Into<String>) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    pub fn is_explode(&self) -> bool {
        matches!(self, Expr::Explode(_))
    }

    /// Output column name. Unaliased expressions take the name of their
    /// leftmost operand.
    pub fn name(&self) -> &str {
        match self {
            Expr::Column(name) => name,
            Expr::Literal(_) => "literal",
            Expr::Alias { name, .. } => name,
            Expr::BinaryOp { left, .. } => left.name(),
            Expr::Not(e) | Expr::IsNull(e) | Expr::Explode(e) => e.name(),
            Expr::Cast { expr, .. } => expr.name(),
        }
    }

    pub fn required_columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Column(name) => {
                out.insert(name.clone());
            }
            Expr::Literal(_) => {}
            Expr::Alias { expr, .. } | Expr::Cast { expr, .. } => expr.collect_columns(out),
            Expr::BinaryOp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Not(e) | Expr::IsNull(e) | Expr::Explode(e) => e.collect_columns(out),
        }
    }

    /// Resolve the output type against `schema`.
    pub fn resolve_type(&self, schema: &Schema) -> Result<DataType> {
        match self {
            Expr::Column(name) => Ok(schema.get(name)?.data_type.clone()),
            Expr::Literal(v) => Ok(v.data_type()),
            Expr::Alias { expr, .. } => expr.resolve_type(schema),
            Expr::Cast { expr, to } => {
                expr.resolve_type(schema)?;
                Ok(to.clone())
            }
            Expr::IsNull(e) => {
                e.resolve_type(schema)?;
                Ok(DataType::Boolean)
            }
            Expr::Not(e) => match e.resolve_type(schema)? {
                DataType::Boolean => Ok(DataType::Boolean),
                other => Err(Error::type_error(e, other, "apply logical not")),
            },
            Expr::Explode(e) => match e.resolve_type(schema)? {
                DataType::List(inner) => Ok(*inner),
                DataType::Null => Ok(DataType::Null),
                other => Err(Error::type_error(e, other, "explode")),
            },
            Expr::BinaryOp { op, left, right } => {
                let lt = left.resolve_type(schema)?;
                let rt = right.resolve_type(schema)?;
                if op.is_comparison() {
                    return Ok(DataType::Boolean);
                }
                if op.is_logical() {
                    for (e, t) in [(left, &lt), (right, &rt)] {
                        if *t != DataType::Boolean {
                            return Err(Error::type_error(e, t.clone(), "apply logical operator"));
                        }
                    }
                    return Ok(DataType::Boolean);
                }
                if lt == DataType::Null || rt == DataType::Null {
                    return Ok(DataType::Null);
                }
                if *op == Operator::Plus && lt == DataType::Utf8 && rt == DataType::Utf8 {
                    return Ok(DataType::Utf8);
                }
                lt.numeric_supertype(&rt).ok_or_else(|| {
                    let offender = if lt.is_numeric() { rt.clone() } else { lt.clone() };
                    Error::type_error(self, offender, "apply arithmetic")
                })
            }
        }
    }

    pub fn to_field(&self, schema: &Schema) -> Result<Field> {
        Ok(Field::new(self.name(), self.resolve_type(schema)?))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "col({name})"),
            Expr::Literal(v) => write!(f, "lit({v})"),
            Expr::Alias { expr, name } => write!(f, "{expr}.alias({name})"),
            Expr::BinaryOp { op, left, right } => write!(f, "[{left} {} {right}]", op.symbol()),
            Expr::Not(e) => write!(f, "~{e}"),
            Expr::IsNull(e) => write!(f, "{e}.is_null()"),
            Expr::Cast { expr, to } => write!(f, "cast({expr} AS {to})"),
            Expr::Explode(e) => write!(f, "explode({e})"),
        }
    }
}

/// Ordered list of expressions with list-level schema derivation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExprList {
    exprs: Vec<Expr>,
}

impl ExprList {
    pub fn new(exprs: Vec<Expr>) -> Self {
        Self { exprs }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.exprs.iter()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.exprs.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn to_name_set(&self) -> BTreeSet<String> {
        self.exprs.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn required_columns(&self) -> BTreeSet<String> {
        self.exprs
            .iter()
            .flat_map(|e| e.required_columns())
            .collect()
    }

    /// Resolve every expression against `schema`; output names must be unique.
    pub fn to_schema(&self, schema: &Schema) -> Result<Schema> {
        let fields = self
            .exprs
            .iter()
            .map(|e| e.to_field(schema))
            .collect::<Result<Vec<_>>>()?;
        Schema::new(fields)
    }

    /// Append `other`, aliasing any of its expressions whose name collides
    /// with one already present by prefixing `rename_dup`.
    pub fn union(&self, other: &ExprList, rename_dup: &str) -> Result<ExprList> {
        let mut names = self.to_name_set();
        if names.len() != self.exprs.len() {
            return Err(Error::Schema(format!(
                "expression list {self} has duplicate output names"
            )));
        }
        let mut exprs = self.exprs.clone();
        for e in &other.exprs {
            let e = if names.contains(e.name()) {
                let renamed = format!("{rename_dup}{}", e.name());
                e.clone().alias(renamed)
            } else {
                e.clone()
            };
            if !names.insert(e.name().to_string()) {
                return Err(Error::Schema(format!(
                    "cannot union expression lists: name '{}' is still ambiguous after renaming",
                    e.name()
                )));
            }
            exprs.push(e);
        }
        Ok(ExprList::new(exprs))
    }
}

impl From<Vec<Expr>> for ExprList {
    fn from(exprs: Vec<Expr>) -> Self {
        Self::new(exprs)
    }
}

impl FromIterator<Expr> for ExprList {
    fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ExprList {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.exprs.iter()
    }
}

impl fmt::Display for ExprList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.exprs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, "]")
    }
}

/// Aggregations a partition-local aggregate can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggOp {
    Sum,
    Count,
    Min,
    Max,
    Mean,
    List,
}

impl AggOp {
    /// Result type of aggregating `expr`, which resolved to `input`.
    ///
    /// Sum and mean need a numeric operand; min and max need one that can
    /// be ordered.
    pub fn output_type(self, expr: &Expr, input: &DataType) -> Result<DataType> {
        let accepted = match self {
            AggOp::Sum | AggOp::Mean => input.is_numeric(),
            AggOp::Min | AggOp::Max => input.is_sortable(),
            AggOp::Count | AggOp::List => true,
        };
        if !accepted {
            return Err(Error::type_error(
                expr,
                input.clone(),
                format!("{self} aggregate"),
            ));
        }
        Ok(match self {
            AggOp::Count => DataType::Int64,
            AggOp::Mean => DataType::Float64,
            AggOp::List => DataType::List(Box::new(input.clone())),
            AggOp::Sum | AggOp::Min | AggOp::Max => input.clone(),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggOp::Sum => "sum",
            AggOp::Count => "count",
            AggOp::Min => "min",
            AggOp::Max => "max",
            AggOp::Mean => "mean",
            AggOp::List => "list",
        }
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
