//! Pure read/derive functions over [`Query`] values.
//!
//! The facade reads structure (columns, joins, display names, suggested
//! conditions) with the help of the metadata catalog, and produces edited
//! copies of queries and joins. It never mutates its inputs.

use tracing::trace;

use super::expr::{is_infix, ColumnRef, Expression};
use super::inflection::names_table;
use super::join::{ConditionOperator, Join, JoinCondition, JoinFields, JoinStrategy};
use super::model::{Query, Stage, StageSource};
use super::temporal::TemporalBucket;
use super::{FacadeError, FacadeResult};
use crate::metadata::{Catalog, FieldId, FieldMetadata, TableId, TableMetadata};

/// Display names of an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    /// Physical name for columns (`CREATED_AT`), rendered text otherwise.
    pub name: String,
    /// Short name, with the temporal bucket when present (`Created At: Month`).
    pub display_name: String,
    /// Display name qualified by the join alias (`Products → Created At: Month`).
    pub long_display_name: String,
    pub is_temporal: bool,
}

/// Read and edit queries against a metadata catalog.
pub struct QueryFacade<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryFacade<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    // =========================================================================
    // Structure
    // =========================================================================

    fn stage<'q>(&self, query: &'q Query, stage: i32) -> FacadeResult<(usize, &'q Stage)> {
        let index = query
            .stage_index(stage)
            .ok_or(FacadeError::StageOutOfRange(stage))?;
        Ok((index, &query.stages[index]))
    }

    pub fn joins<'q>(&self, query: &'q Query, stage: i32) -> FacadeResult<&'q [Join]> {
        Ok(&self.stage(query, stage)?.1.joins)
    }

    pub fn join_at<'q>(&self, query: &'q Query, stage: i32, index: usize) -> FacadeResult<&'q Join> {
        let (stage_index, stage) = self.stage(query, stage)?;
        stage.joins.get(index).ok_or(FacadeError::JoinOutOfRange {
            stage: stage_index,
            index,
        })
    }

    pub fn table(&self, id: TableId) -> FacadeResult<&'a TableMetadata> {
        self.catalog.table(id).ok_or(FacadeError::UnknownTable(id))
    }

    pub fn field(&self, column: &ColumnRef) -> FacadeResult<&'a FieldMetadata> {
        self.catalog
            .field(column.field)
            .ok_or(FacadeError::UnknownField(column.field))
    }

    /// Columns a stage reads from: the source table, or the previous stage's output.
    fn source_columns(&self, query: &Query, stage_index: usize) -> FacadeResult<Vec<ColumnRef>> {
        match &query.stages[stage_index].source {
            StageSource::Table(table) => Ok(self
                .table(*table)?
                .fields
                .iter()
                .map(|f| ColumnRef::new(f.id))
                .collect()),
            StageSource::PreviousStage if stage_index > 0 => {
                self.stage_output_columns(query, stage_index - 1)
            }
            StageSource::PreviousStage => Err(FacadeError::StageOutOfRange(-1)),
        }
    }

    /// Columns a stage exposes: its source plus the projected fields of its joins.
    fn stage_output_columns(
        &self,
        query: &Query,
        stage_index: usize,
    ) -> FacadeResult<Vec<ColumnRef>> {
        let mut columns = self.source_columns(query, stage_index)?;
        for join in &query.stages[stage_index].joins {
            match &join.fields {
                JoinFields::All => columns.extend(self.rhs_columns(join.target, &join.alias)?),
                JoinFields::None => {}
                JoinFields::Columns(selected) => columns.extend(selected.iter().cloned()),
            }
        }
        Ok(columns)
    }

    /// Columns the left side of a join may use.
    ///
    /// For the join at `join_index` (or a new join when `None`), these are the
    /// stage's source columns plus the columns of every join before it. The
    /// join's own table never appears.
    pub fn lhs_columns(
        &self,
        query: &Query,
        stage: i32,
        join_index: Option<usize>,
    ) -> FacadeResult<Vec<ColumnRef>> {
        let (stage_index, stage) = self.stage(query, stage)?;
        let preceding = join_index.unwrap_or(stage.joins.len()).min(stage.joins.len());

        let mut columns = self.source_columns(query, stage_index)?;
        for join in &stage.joins[..preceding] {
            columns.extend(self.rhs_columns(join.target, &join.alias)?);
        }
        Ok(columns)
    }

    /// Columns of the joined table, qualified by the join alias.
    pub fn rhs_columns(&self, target: TableId, alias: &str) -> FacadeResult<Vec<ColumnRef>> {
        Ok(self
            .table(target)?
            .fields
            .iter()
            .map(|f| ColumnRef::joined(f.id, alias))
            .collect())
    }

    // =========================================================================
    // Suggestions and naming
    // =========================================================================

    /// A condition matching a foreign key between the LHS columns and `target`.
    ///
    /// Looks for an LHS foreign key into the target first, then for a target
    /// foreign key into an LHS column. The operator is always `=`.
    pub fn suggested_condition(
        &self,
        query: &Query,
        stage: i32,
        join_index: Option<usize>,
        target: TableId,
        alias: &str,
    ) -> FacadeResult<Option<JoinCondition>> {
        let pair = self.foreign_key_pair(query, stage, join_index, target)?;
        Ok(pair.map(|(lhs, rhs)| JoinCondition::equals(lhs, ColumnRef::joined(rhs, alias))))
    }

    /// A complete join for `target` built from the suggested condition, if any.
    ///
    /// The right side is created under the final alias, so LHS columns of an
    /// earlier join on the same table keep pointing at that join.
    pub fn suggested_join(
        &self,
        query: &Query,
        stage: i32,
        join_index: Option<usize>,
        target: TableId,
    ) -> FacadeResult<Option<Join>> {
        let Some((lhs, rhs)) = self.foreign_key_pair(query, stage, join_index, target)? else {
            return Ok(None);
        };
        let lhs = Expression::Column(lhs);
        let alias = self.join_alias(query, stage, join_index, target, Some(&lhs))?;
        let condition = JoinCondition::equals(lhs, ColumnRef::joined(rhs, &alias));
        Ok(Some(Join::new(target, &alias, vec![condition])))
    }

    /// LHS column and target field linked by a foreign key.
    fn foreign_key_pair(
        &self,
        query: &Query,
        stage: i32,
        join_index: Option<usize>,
        target: TableId,
    ) -> FacadeResult<Option<(ColumnRef, FieldId)>> {
        let lhs_columns = self.lhs_columns(query, stage, join_index)?;
        let target_table = self.table(target)?;

        for column in &lhs_columns {
            let field = self.field(column)?;
            let Some(fk_target) = field.fk_target else {
                continue;
            };
            if target_table.fields.iter().any(|f| f.id == fk_target) {
                return Ok(Some((column.clone(), fk_target)));
            }
        }

        for target_field in &target_table.fields {
            let Some(fk_target) = target_field.fk_target else {
                continue;
            };
            if let Some(column) = lhs_columns.iter().find(|c| c.field == fk_target) {
                return Ok(Some((column.clone(), target_field.id)));
            }
        }

        Ok(None)
    }

    /// Alias for a join on `target` whose first condition has `lhs` on the left.
    ///
    /// The table's display name, extended with the foreign key's name when the
    /// key does not name the table (`People - User`), then made unique within
    /// the stage.
    pub fn join_alias(
        &self,
        query: &Query,
        stage: i32,
        join_index: Option<usize>,
        target: TableId,
        lhs: Option<&Expression>,
    ) -> FacadeResult<String> {
        let (_, stage) = self.stage(query, stage)?;
        let table_name = self.table(target)?.label();

        let mut alias = table_name.clone();
        if let Some(column) = lhs.and_then(Expression::as_column) {
            let field = self.field(column)?;
            if field.is_foreign_key() {
                let stem = strip_id_suffix(&field.label());
                if !stem.is_empty() && !names_table(&stem, &table_name) {
                    alias = format!("{} - {}", table_name, stem);
                }
            }
        }

        let taken: Vec<&str> = stage
            .joins
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != join_index)
            .map(|(_, j)| j.alias.as_str())
            .collect();

        if !taken.contains(&alias.as_str()) {
            return Ok(alias);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{} {}", alias, n);
            if !taken.contains(&candidate.as_str()) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Display names of an expression used in `stage`.
    pub fn display_info(
        &self,
        query: &Query,
        stage: i32,
        expression: &Expression,
    ) -> FacadeResult<DisplayInfo> {
        self.stage(query, stage)?;
        self.expression_info(expression)
    }

    pub fn expression_info(&self, expression: &Expression) -> FacadeResult<DisplayInfo> {
        match expression {
            Expression::Column(column) => self.column_info(column),
            Expression::Literal { value } => {
                let text = value.display();
                Ok(DisplayInfo {
                    name: text.clone(),
                    display_name: text.clone(),
                    long_display_name: text,
                    is_temporal: false,
                })
            }
            Expression::Call { function, args } => {
                let parts = args
                    .iter()
                    .map(|arg| self.expression_info(arg).map(|info| info.display_name))
                    .collect::<FacadeResult<Vec<_>>>()?;
                let text = if is_infix(function) {
                    parts.join(&format!(" {} ", function))
                } else {
                    format!("{}({})", function, parts.join(", "))
                };
                Ok(DisplayInfo {
                    name: text.clone(),
                    display_name: text.clone(),
                    long_display_name: text,
                    is_temporal: false,
                })
            }
        }
    }

    pub fn column_info(&self, column: &ColumnRef) -> FacadeResult<DisplayInfo> {
        let field = self.field(column)?;
        let mut display_name = field.label();
        if let Some(bucket) = column.bucket {
            display_name = format!("{}: {}", display_name, bucket.display_name());
        }
        let long_display_name = match &column.join_alias {
            Some(alias) => format!("{} → {}", alias, display_name),
            None => display_name.clone(),
        };
        Ok(DisplayInfo {
            name: field.name.clone(),
            display_name,
            long_display_name,
            is_temporal: field.base_type.is_temporal(),
        })
    }

    // =========================================================================
    // Temporal buckets
    // =========================================================================

    /// Whether the expression is a column that can carry a bucket.
    pub fn is_bucketable(&self, expression: &Expression) -> bool {
        expression
            .as_column()
            .and_then(|c| self.catalog.field(c.field))
            .map(|f| f.base_type.is_temporal())
            .unwrap_or(false)
    }

    pub fn available_buckets(&self, column: &ColumnRef) -> FacadeResult<&'static [TemporalBucket]> {
        Ok(TemporalBucket::available_for(self.field(column)?.base_type))
    }

    /// `preferred` if the column supports it, otherwise no bucket.
    pub fn default_bucket(
        &self,
        column: &ColumnRef,
        preferred: Option<TemporalBucket>,
    ) -> Option<TemporalBucket> {
        let field = self.catalog.field(column.field)?;
        preferred.filter(|b| b.is_available_for(field.base_type))
    }

    pub fn available_operators(&self) -> &'static [ConditionOperator] {
        ConditionOperator::ALL
    }

    pub fn available_strategies(&self) -> &'static [JoinStrategy] {
        JoinStrategy::ALL
    }

    // =========================================================================
    // Join edits
    // =========================================================================

    pub fn with_conditions(&self, join: &Join, conditions: Vec<JoinCondition>) -> Join {
        Join {
            conditions,
            ..join.clone()
        }
    }

    pub fn with_condition(
        &self,
        join: &Join,
        index: usize,
        condition: JoinCondition,
    ) -> FacadeResult<Join> {
        if index >= join.conditions.len() {
            return Err(FacadeError::ConditionOutOfRange(index));
        }
        let mut next = join.clone();
        next.conditions[index] = condition;
        Ok(next)
    }

    pub fn with_strategy(&self, join: &Join, strategy: JoinStrategy) -> Join {
        Join {
            strategy,
            ..join.clone()
        }
    }

    pub fn with_fields(&self, join: &Join, fields: JoinFields) -> Join {
        Join {
            fields,
            ..join.clone()
        }
    }

    /// Rename a join, rewriting every column reference through the old alias.
    pub fn with_alias(&self, join: &Join, alias: &str) -> Join {
        let mut next = join.clone();
        let old = std::mem::replace(&mut next.alias, alias.to_string());
        next.for_each_column_mut(&mut |column| {
            if column.join_alias.as_deref() == Some(old.as_str()) {
                column.join_alias = Some(alias.to_string());
            }
        });
        next
    }

    // =========================================================================
    // Query edits
    // =========================================================================

    /// Append a join to a stage.
    pub fn join(&self, query: &Query, stage: i32, join: Join) -> FacadeResult<Query> {
        if join.conditions.is_empty() {
            return Err(FacadeError::EmptyConditions);
        }
        let (stage_index, _) = self.stage(query, stage)?;
        let mut next = query.clone();
        next.stages[stage_index].joins.push(join);
        Ok(next)
    }

    /// Replace the join at `index`.
    ///
    /// A new alias on the same table is followed through later clauses. When
    /// the join now targets another table, later joins reading the old table's
    /// columns are dropped, as with [`QueryFacade::remove_join`].
    pub fn replace_join(
        &self,
        query: &Query,
        stage: i32,
        index: usize,
        join: Join,
    ) -> FacadeResult<Query> {
        if join.conditions.is_empty() {
            return Err(FacadeError::EmptyConditions);
        }
        let old = self.join_at(query, stage, index)?;
        let (old_alias, old_target) = (old.alias.clone(), old.target);
        let (stage_index, _) = self.stage(query, stage)?;
        let (new_alias, new_target) = (join.alias.clone(), join.target);

        let mut next = query.clone();
        next.stages[stage_index].joins[index] = join;

        if old_target != new_target {
            trace!(alias = %old_alias, "join target changed");
            for (position, stage) in next.stages.iter_mut().enumerate().skip(stage_index) {
                let from = if position == stage_index { index + 1 } else { 0 };
                drop_dependent_joins(&mut stage.joins, from, &old_alias);
            }
        } else if old_alias != new_alias {
            trace!(from = %old_alias, to = %new_alias, "join alias changed");
            rename_alias_after(&mut next, stage_index, index, &old_alias, &new_alias);
        }
        Ok(next)
    }

    /// Remove the join at `index`, along with later joins of the stage that
    /// reference its columns.
    pub fn remove_join(&self, query: &Query, stage: i32, index: usize) -> FacadeResult<Query> {
        let alias = self.join_at(query, stage, index)?.alias.clone();
        let (stage_index, _) = self.stage(query, stage)?;

        let mut next = query.clone();
        let joins = &mut next.stages[stage_index].joins;
        joins.remove(index);
        drop_dependent_joins(joins, index, &alias);
        Ok(next)
    }
}

/// Drop joins from position `from` on whose conditions read through `alias`.
fn drop_dependent_joins(joins: &mut Vec<Join>, from: usize, alias: &str) {
    let refers_to = |c: &ColumnRef| c.join_alias.as_deref() == Some(alias);
    let mut position = 0;
    joins.retain(|join| {
        let dependent = position >= from
            && join.conditions.iter().any(|c| c.lhs.any_column(&refers_to));
        position += 1;
        if dependent {
            trace!(alias = %join.alias, dropped = %alias, "dropping dependent join");
        }
        !dependent
    });
}

/// `Product ID` -> `Product`; anything without an ID suffix is kept as is.
fn strip_id_suffix(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.eq_ignore_ascii_case("id") {
        return String::new();
    }
    for suffix in [" id", "_id"] {
        let cut = trimmed.len().saturating_sub(suffix.len());
        if trimmed.is_char_boundary(cut) && trimmed[cut..].eq_ignore_ascii_case(suffix) {
            return trimmed[..cut].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Rewrite references to a renamed join in later joins and later stages.
fn rename_alias_after(query: &mut Query, stage_index: usize, join_index: usize, old: &str, new: &str) {
    let mut rename = |column: &mut ColumnRef| {
        if column.join_alias.as_deref() == Some(old) {
            column.join_alias = Some(new.to_string());
        }
    };
    for join in query.stages[stage_index].joins.iter_mut().skip(join_index + 1) {
        for condition in &mut join.conditions {
            condition.lhs.for_each_column_mut(&mut rename);
        }
    }
    for stage in query.stages.iter_mut().skip(stage_index + 1) {
        for join in &mut stage.joins {
            for condition in &mut join.conditions {
                condition.lhs.for_each_column_mut(&mut rename);
            }
        }
    }
}
