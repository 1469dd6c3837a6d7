//! Join clauses: strategy, conditions and projected fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::expr::{ColumnRef, Expression};
use crate::metadata::TableId;

// =============================================================================
// Strategy
// =============================================================================

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinStrategy {
    LeftJoin,
    RightJoin,
    InnerJoin,
    FullJoin,
}

impl JoinStrategy {
    pub const ALL: &'static [JoinStrategy] = &[
        JoinStrategy::LeftJoin,
        JoinStrategy::RightJoin,
        JoinStrategy::InnerJoin,
        JoinStrategy::FullJoin,
    ];

    pub fn short_name(&self) -> &'static str {
        match self {
            JoinStrategy::LeftJoin => "left-join",
            JoinStrategy::RightJoin => "right-join",
            JoinStrategy::InnerJoin => "inner-join",
            JoinStrategy::FullJoin => "full-join",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            JoinStrategy::LeftJoin => "Left outer join",
            JoinStrategy::RightJoin => "Right outer join",
            JoinStrategy::InnerJoin => "Inner join",
            JoinStrategy::FullJoin => "Full outer join",
        }
    }
}

impl Default for JoinStrategy {
    fn default() -> Self {
        JoinStrategy::LeftJoin
    }
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for JoinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .find(|j| j.short_name() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown join strategy '{}'", s))
    }
}

// =============================================================================
// Operator
// =============================================================================

/// Comparison between the two sides of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl ConditionOperator {
    pub const ALL: &'static [ConditionOperator] = &[
        ConditionOperator::Eq,
        ConditionOperator::Gt,
        ConditionOperator::Lt,
        ConditionOperator::Ge,
        ConditionOperator::Le,
        ConditionOperator::Ne,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Eq => "=",
            ConditionOperator::Ne => "!=",
            ConditionOperator::Lt => "<",
            ConditionOperator::Gt => ">",
            ConditionOperator::Le => "<=",
            ConditionOperator::Ge => ">=",
        }
    }
}

impl Default for ConditionOperator {
    fn default() -> Self {
        ConditionOperator::Eq
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|op| op.symbol() == s.trim())
            .copied()
            .ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

// =============================================================================
// Condition
// =============================================================================

/// A complete join condition: both sides and an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinCondition {
    pub operator: ConditionOperator,
    pub lhs: Expression,
    pub rhs: Expression,
}

impl JoinCondition {
    pub fn new(operator: ConditionOperator, lhs: Expression, rhs: Expression) -> Self {
        Self { operator, lhs, rhs }
    }

    /// `lhs = rhs`.
    pub fn equals(lhs: impl Into<Expression>, rhs: impl Into<Expression>) -> Self {
        Self::new(ConditionOperator::Eq, lhs.into(), rhs.into())
    }
}

// =============================================================================
// Fields
// =============================================================================

/// Which columns of the joined table are projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinFields {
    All,
    None,
    Columns(Vec<ColumnRef>),
}

impl Default for JoinFields {
    fn default() -> Self {
        JoinFields::All
    }
}

impl JoinFields {
    pub fn is_selected(&self, column: &ColumnRef) -> bool {
        match self {
            JoinFields::All => true,
            JoinFields::None => false,
            JoinFields::Columns(columns) => columns.iter().any(|c| c.same_column(column)),
        }
    }
}

// =============================================================================
// Join
// =============================================================================

/// A join clause within a query stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    /// Name under which the joined table's columns are referenced.
    pub alias: String,
    pub target: TableId,
    pub conditions: Vec<JoinCondition>,
    #[serde(default)]
    pub strategy: JoinStrategy,
    #[serde(default)]
    pub fields: JoinFields,
}

impl Join {
    pub fn new(target: TableId, alias: &str, conditions: Vec<JoinCondition>) -> Self {
        Self {
            alias: alias.to_string(),
            target,
            conditions,
            strategy: JoinStrategy::default(),
            fields: JoinFields::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: JoinStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fields(mut self, fields: JoinFields) -> Self {
        self.fields = fields;
        self
    }

    /// Visit every column reference of the join.
    pub(crate) fn for_each_column_mut(&mut self, f: &mut impl FnMut(&mut ColumnRef)) {
        for condition in &mut self.conditions {
            condition.lhs.for_each_column_mut(f);
            condition.rhs.for_each_column_mut(f);
        }
        if let JoinFields::Columns(columns) = &mut self.fields {
            for column in columns {
                f(column);
            }
        }
    }
}
