//! Draft condition state.
//!
//! Component-local state of one join being edited: the picked right table,
//! the committed conditions, at most one in-progress draft condition, and
//! the strategy and field selection. Nothing here touches the query; the
//! controller decides when this state is turned into a [`Join`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{JoinStepError, JoinStepResult};
use crate::metadata::TableId;
use crate::query::{
    ColumnRef, ConditionOperator, Expression, Join, JoinCondition, JoinFields, JoinStrategy,
};

/// Left or right side of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Lhs,
    Rhs,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Lhs => f.write_str("left"),
            Side::Rhs => f.write_str("right"),
        }
    }
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Lhs => Side::Rhs,
            Side::Rhs => Side::Lhs,
        }
    }
}

/// Address of a condition editor: a committed condition or the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionSlot {
    Committed(usize),
    Draft,
}

impl fmt::Display for ConditionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionSlot::Committed(index) => write!(f, "condition {}", index),
            ConditionSlot::Draft => f.write_str("draft condition"),
        }
    }
}

/// A condition under construction. Either side may still be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftCondition {
    pub operator: ConditionOperator,
    pub lhs: Option<Expression>,
    pub rhs: Option<Expression>,
}

impl DraftCondition {
    pub fn new(operator: ConditionOperator) -> Self {
        Self {
            operator,
            lhs: None,
            rhs: None,
        }
    }

    pub fn side(&self, side: Side) -> Option<&Expression> {
        match side {
            Side::Lhs => self.lhs.as_ref(),
            Side::Rhs => self.rhs.as_ref(),
        }
    }

    pub fn set_side(&mut self, side: Side, expression: Expression) {
        match side {
            Side::Lhs => self.lhs = Some(expression),
            Side::Rhs => self.rhs = Some(expression),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.lhs.is_some() && self.rhs.is_some()
    }

    pub fn for_each_column_mut(&mut self, f: &mut impl FnMut(&mut ColumnRef)) {
        for expression in [&mut self.lhs, &mut self.rhs].into_iter().flatten() {
            expression.for_each_column_mut(f);
        }
    }

    /// The finished condition, if both sides are set.
    pub fn to_condition(&self) -> Option<JoinCondition> {
        match (&self.lhs, &self.rhs) {
            (Some(lhs), Some(rhs)) => Some(JoinCondition::new(self.operator, lhs.clone(), rhs.clone())),
            _ => None,
        }
    }
}

/// Editing state of one join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinDraftState {
    right_table: Option<TableId>,
    alias: Option<String>,
    conditions: Vec<JoinCondition>,
    draft: Option<DraftCondition>,
    strategy: JoinStrategy,
    fields: JoinFields,
}

impl JoinDraftState {
    /// State of a join that has no table yet.
    pub fn new(strategy: JoinStrategy) -> Self {
        Self {
            right_table: None,
            alias: None,
            conditions: Vec::new(),
            draft: None,
            strategy,
            fields: JoinFields::All,
        }
    }

    /// State mirroring a join already in the query.
    pub fn from_join(join: &Join) -> Self {
        Self {
            right_table: Some(join.target),
            alias: Some(join.alias.clone()),
            conditions: join.conditions.clone(),
            draft: None,
            strategy: join.strategy,
            fields: join.fields.clone(),
        }
    }

    pub fn right_table(&self) -> Option<TableId> {
        self.right_table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn conditions(&self) -> &[JoinCondition] {
        &self.conditions
    }

    pub fn draft(&self) -> Option<&DraftCondition> {
        self.draft.as_ref()
    }

    pub(crate) fn draft_mut(&mut self) -> Option<&mut DraftCondition> {
        self.draft.as_mut()
    }

    pub fn strategy(&self) -> JoinStrategy {
        self.strategy
    }

    pub fn fields(&self) -> &JoinFields {
        &self.fields
    }

    /// Replace the right table.
    ///
    /// The draft is discarded, conditions referring to the previous table's
    /// columns are dropped and the field selection goes back to all columns.
    /// The strategy is kept.
    pub fn select_right_table(&mut self, table: TableId, alias: &str) {
        if let Some(old_alias) = self.alias.take() {
            let references_old =
                |c: &ColumnRef| c.join_alias.as_deref() == Some(old_alias.as_str());
            self.conditions.retain(|condition| {
                !condition.lhs.any_column(&references_old)
                    && !condition.rhs.any_column(&references_old)
            });
        }
        self.right_table = Some(table);
        self.alias = Some(alias.to_string());
        self.draft = None;
        self.fields = JoinFields::All;
    }

    /// Rename the join, rewriting every column reference through the old
    /// alias, including those of the draft.
    pub fn rename_alias(&mut self, alias: &str) {
        let Some(old) = self.alias.replace(alias.to_string()) else {
            return;
        };
        let mut rename = rename_from(&old, alias);
        for condition in &mut self.conditions {
            condition.lhs.for_each_column_mut(&mut rename);
            condition.rhs.for_each_column_mut(&mut rename);
        }
        if let JoinFields::Columns(columns) = &mut self.fields {
            columns.iter_mut().for_each(&mut rename);
        }
        if let Some(draft) = &mut self.draft {
            draft.for_each_column_mut(&mut rename);
        }
    }

    /// Mirror a join re-rendered by the host, keeping any draft in progress.
    ///
    /// A right table picked but not yet committed wins over the host's join:
    /// the state is left untouched until its first condition completes. If the
    /// host renamed the join, the draft follows the new alias.
    pub fn sync_from_join(&mut self, join: &Join) {
        if self.right_table.is_some_and(|table| table != join.target) {
            return;
        }
        let old_alias = self.alias.take();
        let mut draft = self.draft.take();
        *self = Self::from_join(join);

        if let (Some(old), Some(draft)) = (old_alias, &mut draft) {
            if old != join.alias {
                draft.for_each_column_mut(&mut rename_from(&old, &join.alias));
            }
        }
        self.draft = draft;
    }

    /// Start a new draft condition.
    pub fn open_draft(&mut self, operator: ConditionOperator) -> JoinStepResult<()> {
        if self.draft.is_some() {
            return Err(JoinStepError::DraftInProgress);
        }
        self.draft = Some(DraftCondition::new(operator));
        Ok(())
    }

    /// Drop the draft without touching committed conditions.
    pub fn discard_draft(&mut self) -> Option<DraftCondition> {
        self.draft.take()
    }

    /// Set one side of the draft.
    pub fn set_draft_side(&mut self, side: Side, expression: Expression) -> JoinStepResult<()> {
        let draft = self
            .draft
            .as_mut()
            .ok_or(JoinStepError::UnknownSlot(ConditionSlot::Draft))?;
        draft.set_side(side, expression);
        Ok(())
    }

    pub fn set_draft_operator(&mut self, operator: ConditionOperator) -> JoinStepResult<()> {
        let draft = self
            .draft
            .as_mut()
            .ok_or(JoinStepError::UnknownSlot(ConditionSlot::Draft))?;
        draft.operator = operator;
        Ok(())
    }

    /// Move a complete draft into the committed conditions.
    ///
    /// Returns the index of the new condition.
    pub fn commit_draft(&mut self) -> JoinStepResult<usize> {
        let condition = self
            .draft
            .as_ref()
            .ok_or(JoinStepError::UnknownSlot(ConditionSlot::Draft))?
            .to_condition()
            .ok_or(JoinStepError::IncompleteDraft)?;
        self.draft = None;
        self.conditions.push(condition);
        Ok(self.conditions.len() - 1)
    }

    pub fn condition(&self, index: usize) -> JoinStepResult<&JoinCondition> {
        self.conditions
            .get(index)
            .ok_or(JoinStepError::UnknownSlot(ConditionSlot::Committed(index)))
    }

    pub fn replace_condition(&mut self, index: usize, condition: JoinCondition) -> JoinStepResult<()> {
        let slot = self
            .conditions
            .get_mut(index)
            .ok_or(JoinStepError::UnknownSlot(ConditionSlot::Committed(index)))?;
        *slot = condition;
        Ok(())
    }

    /// Replace all committed conditions at once.
    pub fn set_conditions(&mut self, conditions: Vec<JoinCondition>) {
        self.conditions = conditions;
    }

    /// Remove a committed condition. The last one can never be removed.
    pub fn remove_condition(&mut self, index: usize) -> JoinStepResult<JoinCondition> {
        if index >= self.conditions.len() {
            return Err(JoinStepError::UnknownSlot(ConditionSlot::Committed(index)));
        }
        if self.conditions.len() == 1 {
            return Err(JoinStepError::SoleCondition);
        }
        Ok(self.conditions.remove(index))
    }

    pub fn set_strategy(&mut self, strategy: JoinStrategy) {
        self.strategy = strategy;
    }

    pub fn set_fields(&mut self, fields: JoinFields) {
        self.fields = fields;
    }

    /// The join this state describes, once it has a table and a condition.
    pub fn to_join(&self) -> Option<Join> {
        let target = self.right_table?;
        if self.conditions.is_empty() {
            return None;
        }
        Some(Join {
            alias: self.alias.clone().unwrap_or_default(),
            target,
            conditions: self.conditions.clone(),
            strategy: self.strategy,
            fields: self.fields.clone(),
        })
    }
}

/// Rewrites column references through `old` to go through `new`.
fn rename_from<'a>(old: &'a str, new: &'a str) -> impl FnMut(&mut ColumnRef) + 'a {
    move |column: &mut ColumnRef| {
        if column.join_alias.as_deref() == Some(old) {
            column.join_alias = Some(new.to_string());
        }
    }
}
