//! Rejected join step actions.

use thiserror::Error;

use super::draft::{ConditionSlot, Side};
use crate::query::FacadeError;

/// Result type for join step operations.
pub type JoinStepResult<T> = Result<T, JoinStepError>;

/// An action the join step refused to apply.
///
/// Rejections leave all state untouched. Each has a matching `can_*` query on
/// the controller so hosts can avoid offering the action at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JoinStepError {
    /// The step is read-only.
    #[error("join step is read-only")]
    ReadOnly,

    /// The draft condition is missing a side.
    #[error("draft condition is incomplete")]
    IncompleteDraft,

    /// A draft condition already exists; only one may be open at a time.
    #[error("a draft condition is already in progress")]
    DraftInProgress,

    /// A join must keep at least one condition.
    #[error("cannot remove the only condition of a join")]
    SoleCondition,

    /// No right-hand table has been picked yet.
    #[error("no right table selected")]
    NoRightTable,

    /// New conditions can only be added once the first one is committed.
    #[error("join has no committed condition yet")]
    NoCommittedCondition,

    /// The addressed condition does not exist.
    #[error("no condition at {0}")]
    UnknownSlot(ConditionSlot),

    /// A bucket was set on a side that is not a date or time column.
    #[error("{0} side of {1} cannot be bucketed")]
    NotBucketable(Side, ConditionSlot),

    /// The join being edited is not (yet) part of the query.
    #[error("join is not part of the query")]
    NotCommitted,

    /// The query facade rejected an edit.
    #[error(transparent)]
    Facade(#[from] FacadeError),
}
