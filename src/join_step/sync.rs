//! Join condition synchronizer.
//!
//! Derives the values the user did not pick explicitly: a complete condition
//! from foreign keys when a table is chosen, matching temporal buckets on both
//! sides of a condition, and the label each side is shown with.

use super::draft::Side;
use crate::metadata::{Catalog, TableId};
use crate::query::{Expression, FacadeResult, Join, JoinCondition, Query, QueryFacade, TemporalBucket};

/// What a condition side displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideLabel {
    /// Nothing picked yet.
    Placeholder,
    /// A bare column, shown by its display name.
    Column(String),
    /// A bare literal, shown as written.
    Literal(String),
    /// Anything computed.
    CustomExpression,
}

impl SideLabel {
    pub fn text(&self) -> &str {
        match self {
            SideLabel::Placeholder => "Pick a column…",
            SideLabel::Column(name) => name,
            SideLabel::Literal(text) => text,
            SideLabel::CustomExpression => "Custom expression",
        }
    }
}

pub struct ConditionSynchronizer<'a> {
    facade: QueryFacade<'a>,
}

impl<'a> ConditionSynchronizer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            facade: QueryFacade::new(catalog),
        }
    }

    /// A complete join for `target` when foreign keys suggest a condition.
    pub fn suggest_for_table(
        &self,
        query: &Query,
        stage: i32,
        join_index: Option<usize>,
        target: TableId,
    ) -> FacadeResult<Option<Join>> {
        self.facade.suggested_join(query, stage, join_index, target)
    }

    /// Align buckets when a draft gets its second side.
    ///
    /// The first non-empty bucket in pick order wins: the side that was
    /// already set keeps its bucket if it has one, otherwise the newly set
    /// side's bucket is copied over. `changed` is the side just set.
    pub fn align_new_condition(&self, lhs: &mut Expression, rhs: &mut Expression, changed: Side) {
        if !self.both_bucketable(lhs, rhs) {
            return;
        }
        let (earlier, later) = match changed {
            Side::Lhs => (rhs.bucket(), lhs.bucket()),
            Side::Rhs => (lhs.bucket(), rhs.bucket()),
        };
        let bucket = earlier.or(later);
        set_bucket(lhs, bucket);
        set_bucket(rhs, bucket);
    }

    /// Align buckets after one side of a committed condition was edited.
    ///
    /// The edited side wins, including when it was set to no bucket.
    pub fn align_after_change(&self, condition: &mut JoinCondition, changed: Side) {
        if !self.both_bucketable(&condition.lhs, &condition.rhs) {
            return;
        }
        match changed {
            Side::Lhs => {
                let bucket = condition.lhs.bucket();
                set_bucket(&mut condition.rhs, bucket);
            }
            Side::Rhs => {
                let bucket = condition.rhs.bucket();
                set_bucket(&mut condition.lhs, bucket);
            }
        }
    }

    /// Label of a condition side.
    ///
    /// Decided by the expression's shape: a bare column or literal shows
    /// itself no matter how it was entered, anything else is a custom
    /// expression.
    pub fn side_label(&self, expression: Option<&Expression>) -> SideLabel {
        match expression {
            None => SideLabel::Placeholder,
            Some(Expression::Column(column)) => match self.facade.column_info(column) {
                Ok(info) => SideLabel::Column(info.display_name),
                Err(_) => SideLabel::CustomExpression,
            },
            Some(Expression::Literal { value }) => SideLabel::Literal(value.display()),
            Some(Expression::Call { .. }) => SideLabel::CustomExpression,
        }
    }

    fn both_bucketable(&self, lhs: &Expression, rhs: &Expression) -> bool {
        self.facade.is_bucketable(lhs) && self.facade.is_bucketable(rhs)
    }
}

fn set_bucket(expression: &mut Expression, bucket: Option<TemporalBucket>) {
    if let Some(column) = expression.as_column_mut() {
        column.bucket = bucket;
    }
}
