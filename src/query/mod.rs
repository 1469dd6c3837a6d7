//! Query model and facade.
//!
//! Queries are explicit tagged values: stages hold joins, joins hold
//! conditions, conditions hold expressions. The [`QueryFacade`] reads them
//! against the metadata catalog and derives edited copies.

pub mod expr;
pub mod facade;
mod inflection;
pub mod join;
pub mod model;
pub mod temporal;

pub use expr::{ColumnRef, Expression, Literal};
pub use facade::{DisplayInfo, QueryFacade};
pub use join::{ConditionOperator, Join, JoinCondition, JoinFields, JoinStrategy};
pub use model::{Query, Stage, StageSource};
pub use temporal::TemporalBucket;

use thiserror::Error;

use crate::metadata::{FieldId, TableId};

/// Errors raised by facade lookups and edits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FacadeError {
    #[error("Stage {0} does not exist")]
    StageOutOfRange(i32),

    #[error("Stage {stage} has no join at index {index}")]
    JoinOutOfRange { stage: usize, index: usize },

    #[error("Condition index {0} is out of range")]
    ConditionOutOfRange(usize),

    #[error("Unknown table: {0}")]
    UnknownTable(TableId),

    #[error("Unknown field: {0}")]
    UnknownField(FieldId),

    #[error("A join needs at least one condition")]
    EmptyConditions,
}

pub type FacadeResult<T> = Result<T, FacadeError>;
