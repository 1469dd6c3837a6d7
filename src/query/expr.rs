//! Expressions that can appear on either side of a join condition.

use serde::{Deserialize, Serialize};

use super::temporal::TemporalBucket;
use crate::metadata::FieldId;

/// Reference to a column, optionally through a join and with a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub field: FieldId,
    /// Alias of the join that brings this column in; `None` for columns of
    /// the stage source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<TemporalBucket>,
}

impl ColumnRef {
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            join_alias: None,
            bucket: None,
        }
    }

    pub fn joined(field: FieldId, alias: &str) -> Self {
        Self {
            field,
            join_alias: Some(alias.to_string()),
            bucket: None,
        }
    }

    pub fn with_bucket(mut self, bucket: Option<TemporalBucket>) -> Self {
        self.bucket = bucket;
        self
    }

    /// Same column, ignoring any temporal bucket.
    pub fn same_column(&self, other: &ColumnRef) -> bool {
        self.field == other.field && self.join_alias == other.join_alias
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Literal as the condition editor shows it: text is quoted.
    pub fn display(&self) -> String {
        match self {
            Literal::Boolean(b) => b.to_string(),
            Literal::Integer(i) => i.to_string(),
            Literal::Float(f) => {
                let mut buffer = ryu::Buffer::new();
                buffer.format(*f).to_string()
            }
            Literal::Text(s) => format!("\"{}\"", s),
        }
    }
}

/// One side of a join condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    Column(ColumnRef),
    Literal { value: Literal },
    /// A computed expression, e.g. `[Total] + [Subtotal]`.
    Call {
        function: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn column(column: ColumnRef) -> Self {
        Expression::Column(column)
    }

    pub fn literal(value: Literal) -> Self {
        Expression::Literal { value }
    }

    pub fn call(function: &str, args: Vec<Expression>) -> Self {
        Expression::Call {
            function: function.to_string(),
            args,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expression::Column(column) => Some(column),
            _ => None,
        }
    }

    pub fn as_column_mut(&mut self) -> Option<&mut ColumnRef> {
        match self {
            Expression::Column(column) => Some(column),
            _ => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Expression::Call { .. })
    }

    /// Temporal bucket of a bare column reference.
    pub fn bucket(&self) -> Option<TemporalBucket> {
        self.as_column().and_then(|c| c.bucket)
    }

    /// Visit every column reference, including those nested in calls.
    pub fn for_each_column_mut(&mut self, f: &mut impl FnMut(&mut ColumnRef)) {
        match self {
            Expression::Column(column) => f(column),
            Expression::Literal { .. } => {}
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.for_each_column_mut(f);
                }
            }
        }
    }

    /// Whether any column reference satisfies the predicate.
    pub fn any_column(&self, f: &impl Fn(&ColumnRef) -> bool) -> bool {
        match self {
            Expression::Column(column) => f(column),
            Expression::Literal { .. } => false,
            Expression::Call { args, .. } => args.iter().any(|a| a.any_column(f)),
        }
    }
}

impl From<ColumnRef> for Expression {
    fn from(column: ColumnRef) -> Self {
        Expression::Column(column)
    }
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Expression::Literal { value }
    }
}

/// Infix operators rendered between their arguments.
pub(crate) fn is_infix(function: &str) -> bool {
    matches!(function, "+" | "-" | "*" | "/")
}
