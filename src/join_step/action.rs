//! User actions on a join step, as data.
//!
//! Every operation of the controller has a matching action so that a session
//! can be recorded and replayed:
//!
//! ```json
//! [
//!   { "action": "select_right_table", "table": 4 },
//!   { "action": "set_column", "slot": "draft", "side": "lhs",
//!     "column": { "field": 107, "bucket": "month" } },
//!   { "action": "set_strategy", "strategy": "inner-join" }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use super::draft::{ConditionSlot, Side};
use super::picker::ActivePicker;
use crate::metadata::TableId;
use crate::query::{ColumnRef, ConditionOperator, Expression, JoinFields, JoinStrategy, TemporalBucket};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum JoinStepAction {
    SelectRightTable {
        table: TableId,
    },
    SetColumn {
        slot: ConditionSlot,
        side: Side,
        column: ColumnRef,
    },
    SetExpression {
        slot: ConditionSlot,
        side: Side,
        expression: Expression,
    },
    SetBucket {
        slot: ConditionSlot,
        side: Side,
        #[serde(default)]
        bucket: Option<TemporalBucket>,
    },
    SetOperator {
        slot: ConditionSlot,
        operator: ConditionOperator,
    },
    SetStrategy {
        strategy: JoinStrategy,
    },
    ToggleField {
        column: ColumnRef,
    },
    ToggleAllFields,
    SetFields {
        fields: JoinFields,
    },
    AddCondition,
    DiscardDraft,
    RemoveCondition {
        index: usize,
    },
    RemoveJoin,
    OpenPicker {
        picker: ActivePicker,
    },
    ClosePicker,
}

impl JoinStepAction {
    /// Whether the action changes the join rather than just picker visibility.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, JoinStepAction::OpenPicker { .. } | JoinStepAction::ClosePicker)
    }
}
