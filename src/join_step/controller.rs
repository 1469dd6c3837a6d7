//! Join step controller.
//!
//! Orchestrates one join of one query stage: applies user actions to the
//! [`JoinDraftState`], lets the [`ConditionSynchronizer`] fill in derived
//! values, and hands a new query to the [`QueryHost`] whenever the join
//! changes in a committable way.
//!
//! ```text
//!   user action / JoinStepAction
//!              │
//!              ▼
//!   ┌─────────────────────┐      ┌───────────────────────┐
//!   │  JoinStepController │─────►│  JoinDraftState       │
//!   │  (read-only guard,  │      │  (table, conditions,  │
//!   │   active picker)    │      │   draft, fields)      │
//!   └─────────────────────┘      └───────────────────────┘
//!              │                             ▲
//!              │                 ┌───────────────────────┐
//!              │                 │ ConditionSynchronizer │
//!              │                 │ (FK suggestion,       │
//!              │                 │  bucket alignment)    │
//!              ▼                 └───────────────────────┘
//!   ┌─────────────────────┐
//!   │  QueryFacade        │──► new Query ──► QueryHost::update_query
//!   └─────────────────────┘
//! ```
//!
//! Rejected actions leave the controller exactly as it was.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::action::JoinStepAction;
use super::draft::{ConditionSlot, DraftCondition, JoinDraftState, Side};
use super::error::{JoinStepError, JoinStepResult};
use super::fields;
use super::host::QueryHost;
use super::link::{ClickModifiers, DataSourceLink};
use super::picker::{ActivePicker, RequestTicket, TablePickerContent, TablePickerState};
use super::sync::{ConditionSynchronizer, SideLabel};
use crate::config::JoinSettings;
use crate::metadata::{
    Catalog, MetadataProvider, MetadataProviderExt, MetadataResult, TableId, TablePickerItems,
};
use crate::query::{
    ColumnRef, ConditionOperator, Expression, JoinCondition, JoinFields, JoinStrategy, Query,
    QueryFacade, StageSource, TemporalBucket,
};

/// Right table label before a table is picked.
pub const PICK_DATA: &str = "Pick data…";

const PREVIOUS_RESULTS: &str = "Previous results";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// One row of the condition list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionView {
    pub slot: ConditionSlot,
    pub operator: ConditionOperator,
    #[serde(serialize_with = "serialize_label")]
    pub lhs: SideLabel,
    #[serde(serialize_with = "serialize_label")]
    pub rhs: SideLabel,
    pub removable: bool,
}

fn serialize_label<S: serde::Serializer>(label: &SideLabel, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(label.text())
}

/// An entry of a column picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnOption {
    /// The column as it would be set, default bucket included.
    pub column: ColumnRef,
    pub display_name: String,
    /// The slot currently holds this column.
    pub selected: bool,
    pub bucketable: bool,
}

/// Controller of one join step.
pub struct JoinStepController<H: QueryHost> {
    catalog: Arc<Catalog>,
    host: H,
    query: Query,
    stage: i32,
    /// Position of the join in the stage; `None` until first committed.
    join_index: Option<usize>,
    state: JoinDraftState,
    picker: ActivePicker,
    tables: TablePickerState,
    read_only: bool,
    settings: JoinSettings,
    site_url: String,
}

impl<H: QueryHost> JoinStepController<H> {
    /// Controller for the join at `join_index` of `stage`, or for a new join
    /// appended to the stage when `join_index` is `None`.
    pub fn new(
        catalog: Arc<Catalog>,
        query: Query,
        stage: i32,
        join_index: Option<usize>,
        settings: JoinSettings,
        host: H,
    ) -> JoinStepResult<Self> {
        let facade = QueryFacade::new(&catalog);
        let state = match join_index {
            Some(index) => JoinDraftState::from_join(facade.join_at(&query, stage, index)?),
            None => {
                facade.joins(&query, stage)?;
                JoinDraftState::new(settings.default_strategy)
            }
        };

        let mut controller = Self {
            catalog,
            host,
            query,
            stage,
            join_index,
            state,
            picker: ActivePicker::Closed,
            tables: TablePickerState::default(),
            read_only: false,
            settings,
            site_url: DEFAULT_SITE_URL.to_string(),
        };
        if join_index.is_none() && controller.settings.auto_open_pickers {
            controller.show(ActivePicker::RightTable);
        }
        Ok(controller)
    }

    pub fn with_site_url(mut self, site_url: &str) -> Self {
        self.site_url = site_url.trim_end_matches('/').to_string();
        self
    }

    /// Disable every mutation. Open pickers are closed.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        if read_only {
            self.show(ActivePicker::Closed);
        }
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The query as last committed or re-rendered.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn state(&self) -> &JoinDraftState {
        &self.state
    }

    pub fn join_index(&self) -> Option<usize> {
        self.join_index
    }

    pub fn active_picker(&self) -> ActivePicker {
        self.picker
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn can_add_condition(&self) -> bool {
        !self.read_only
            && self.state.right_table().is_some()
            && self.state.draft().is_none()
            && !self.state.conditions().is_empty()
    }

    pub fn can_remove_condition(&self, index: usize) -> bool {
        !self.read_only && index < self.state.conditions().len() && self.state.conditions().len() > 1
    }

    /// The draft may be dropped only while the join has committed conditions.
    pub fn can_discard_draft(&self) -> bool {
        !self.read_only && self.state.draft().is_some() && !self.state.conditions().is_empty()
    }

    pub fn can_remove_join(&self) -> bool {
        !self.read_only && self.join_index.is_some()
    }

    /// Both sides of the draft are set.
    pub fn is_commit_ready(&self) -> bool {
        self.state.draft().map_or(false, DraftCondition::is_complete)
    }

    /// Committed conditions followed by the draft, if any.
    pub fn condition_views(&self) -> Vec<ConditionView> {
        let sync = ConditionSynchronizer::new(&self.catalog);
        let mut views: Vec<ConditionView> = self
            .state
            .conditions()
            .iter()
            .enumerate()
            .map(|(index, condition)| ConditionView {
                slot: ConditionSlot::Committed(index),
                operator: condition.operator,
                lhs: sync.side_label(Some(&condition.lhs)),
                rhs: sync.side_label(Some(&condition.rhs)),
                removable: self.can_remove_condition(index),
            })
            .collect();

        if let Some(draft) = self.state.draft() {
            views.push(ConditionView {
                slot: ConditionSlot::Draft,
                operator: draft.operator,
                lhs: sync.side_label(draft.lhs.as_ref()),
                rhs: sync.side_label(draft.rhs.as_ref()),
                removable: self.can_discard_draft(),
            });
        }
        views
    }

    pub fn right_table_label(&self) -> String {
        self.state
            .right_table()
            .and_then(|id| self.catalog.table(id))
            .map(|table| table.label())
            .unwrap_or_else(|| PICK_DATA.to_string())
    }

    /// The joined-from table: the earlier join the first condition reads
    /// from, otherwise the stage source.
    pub fn left_table_label(&self) -> String {
        let lhs_alias = self
            .state
            .conditions()
            .first()
            .and_then(|c| c.lhs.as_column())
            .and_then(|c| c.join_alias.clone());
        if let Some(alias) = lhs_alias {
            return alias;
        }

        let Some(index) = self.query.stage_index(self.stage) else {
            return String::new();
        };
        match &self.query.stages[index].source {
            StageSource::Table(table) => self
                .catalog
                .table(*table)
                .map(|t| t.label())
                .unwrap_or_default(),
            StageSource::PreviousStage => PREVIOUS_RESULTS.to_string(),
        }
    }

    pub fn lhs_column_options(&self, slot: ConditionSlot) -> JoinStepResult<Vec<ColumnOption>> {
        let facade = QueryFacade::new(&self.catalog);
        let columns = facade.lhs_columns(&self.query, self.stage, self.join_index)?;
        let current = self.side_expression(slot, Side::Lhs)?;
        self.column_options(&facade, columns, current)
    }

    pub fn rhs_column_options(&self, slot: ConditionSlot) -> JoinStepResult<Vec<ColumnOption>> {
        let (target, alias) = self.right_table_and_alias()?;
        let facade = QueryFacade::new(&self.catalog);
        let columns = facade.rhs_columns(target, alias)?;
        let current = self.side_expression(slot, Side::Rhs)?;
        self.column_options(&facade, columns, current)
    }

    /// Columns of the right table with their projection state.
    pub fn field_options(&self) -> JoinStepResult<Vec<ColumnOption>> {
        let (target, alias) = self.right_table_and_alias()?;
        let facade = QueryFacade::new(&self.catalog);
        facade
            .rhs_columns(target, alias)?
            .into_iter()
            .map(|column| {
                let info = facade.column_info(&column)?;
                Ok(ColumnOption {
                    selected: self.state.fields().is_selected(&column),
                    bucketable: info.is_temporal,
                    display_name: info.display_name,
                    column,
                })
            })
            .collect()
    }

    pub fn operator_options(&self, slot: ConditionSlot) -> JoinStepResult<Vec<(ConditionOperator, bool)>> {
        let current = self.slot_operator(slot)?;
        let facade = QueryFacade::new(&self.catalog);
        Ok(facade
            .available_operators()
            .iter()
            .map(|op| (*op, *op == current))
            .collect())
    }

    pub fn strategy_options(&self) -> Vec<(JoinStrategy, bool)> {
        let facade = QueryFacade::new(&self.catalog);
        facade
            .available_strategies()
            .iter()
            .map(|s| (*s, *s == self.state.strategy()))
            .collect()
    }

    pub fn table_picker(&self) -> &TablePickerContent {
        self.tables.content()
    }

    /// Link to the right table's data source.
    pub fn right_table_link(&self) -> Option<DataSourceLink> {
        self.state
            .right_table()
            .map(|table| DataSourceLink::new(&self.site_url, table))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Pick the right table.
    ///
    /// With a foreign key suggestion the join is complete right away and is
    /// committed. Otherwise a draft condition is opened and nothing reaches
    /// the host until it is complete.
    pub fn select_right_table(&mut self, table: TableId) -> JoinStepResult<()> {
        self.mutate(|this| {
            let catalog = Arc::clone(&this.catalog);
            let facade = QueryFacade::new(&catalog);
            facade.table(table)?;

            if this.state.right_table() == Some(table) {
                this.show(ActivePicker::Closed);
                return Ok(());
            }

            let sync = ConditionSynchronizer::new(&catalog);
            match sync.suggest_for_table(&this.query, this.stage, this.join_index, table)? {
                Some(join) => {
                    debug!(table = %table, alias = %join.alias, "using suggested condition");
                    this.state.select_right_table(table, &join.alias);
                    this.state.set_conditions(join.conditions);
                    this.show(ActivePicker::Closed);
                    this.commit()?;
                }
                None => {
                    let alias = facade.join_alias(&this.query, this.stage, this.join_index, table, None)?;
                    debug!(table = %table, alias = %alias, "no suggested condition");
                    this.state.select_right_table(table, &alias);
                    this.state.open_draft(this.settings.default_operator)?;
                    this.show(this.auto_open(ActivePicker::Column {
                        slot: ConditionSlot::Draft,
                        side: Side::Lhs,
                    }));
                }
            }
            Ok(())
        })
    }

    pub fn set_column(&mut self, slot: ConditionSlot, side: Side, column: ColumnRef) -> JoinStepResult<()> {
        self.set_expression(slot, side, Expression::Column(column))
    }

    /// Set one side of a condition to any expression.
    pub fn set_expression(
        &mut self,
        slot: ConditionSlot,
        side: Side,
        expression: Expression,
    ) -> JoinStepResult<()> {
        self.mutate(|this| this.apply_expression(slot, side, expression))
    }

    /// Change the bucket of a date or time column side.
    pub fn set_bucket(
        &mut self,
        slot: ConditionSlot,
        side: Side,
        bucket: Option<TemporalBucket>,
    ) -> JoinStepResult<()> {
        self.mutate(|this| {
            let not_bucketable = JoinStepError::NotBucketable(side, slot);
            let mut expression = this
                .side_expression(slot, side)?
                .cloned()
                .ok_or_else(|| not_bucketable.clone())?;

            let catalog = Arc::clone(&this.catalog);
            let facade = QueryFacade::new(&catalog);
            if !facade.is_bucketable(&expression) {
                return Err(not_bucketable);
            }
            let Some(column) = expression.as_column_mut() else {
                return Err(not_bucketable);
            };
            if let Some(bucket) = bucket {
                if !facade.available_buckets(column)?.contains(&bucket) {
                    return Err(not_bucketable);
                }
            }
            column.bucket = bucket;
            this.apply_expression(slot, side, expression)
        })
    }

    pub fn set_operator(&mut self, slot: ConditionSlot, operator: ConditionOperator) -> JoinStepResult<()> {
        self.mutate(|this| {
            match slot {
                ConditionSlot::Draft => {
                    this.state.set_draft_operator(operator)?;
                    this.show(ActivePicker::Closed);
                }
                ConditionSlot::Committed(index) => {
                    let mut condition = this.state.condition(index)?.clone();
                    condition.operator = operator;
                    this.state.replace_condition(index, condition)?;
                    this.show(ActivePicker::Closed);
                    this.commit()?;
                }
            }
            Ok(())
        })
    }

    pub fn set_strategy(&mut self, strategy: JoinStrategy) -> JoinStepResult<()> {
        self.mutate(|this| {
            this.state.set_strategy(strategy);
            this.show(ActivePicker::Closed);
            this.commit()?;
            Ok(())
        })
    }

    /// Flip one right-table column in or out of the projection.
    pub fn toggle_field(&mut self, column: &ColumnRef) -> JoinStepResult<()> {
        self.mutate(|this| {
            let all = this.right_table_columns()?;
            let next = fields::toggle_column(this.state.fields(), column, &all);
            this.state.set_fields(next);
            this.commit()?;
            Ok(())
        })
    }

    pub fn toggle_all_fields(&mut self) -> JoinStepResult<()> {
        self.mutate(|this| {
            this.right_table_and_alias()?;
            let next = fields::toggle_all(this.state.fields());
            this.state.set_fields(next);
            this.commit()?;
            Ok(())
        })
    }

    pub fn set_fields(&mut self, selection: JoinFields) -> JoinStepResult<()> {
        self.mutate(|this| {
            let all = this.right_table_columns()?;
            this.state.set_fields(fields::normalize(selection, &all));
            this.commit()?;
            Ok(())
        })
    }

    /// Open a new draft condition below the committed ones.
    pub fn add_condition(&mut self) -> JoinStepResult<()> {
        self.mutate(|this| {
            if this.state.right_table().is_none() {
                return Err(JoinStepError::NoRightTable);
            }
            if this.state.draft().is_some() {
                return Err(JoinStepError::DraftInProgress);
            }
            if this.state.conditions().is_empty() {
                return Err(JoinStepError::NoCommittedCondition);
            }
            this.state.open_draft(this.settings.default_operator)?;
            this.show(this.auto_open(ActivePicker::Column {
                slot: ConditionSlot::Draft,
                side: Side::Lhs,
            }));
            Ok(())
        })
    }

    pub fn discard_draft(&mut self) -> JoinStepResult<()> {
        self.mutate(|this| {
            if this.state.draft().is_none() {
                return Err(JoinStepError::UnknownSlot(ConditionSlot::Draft));
            }
            if this.state.conditions().is_empty() {
                return Err(JoinStepError::NoCommittedCondition);
            }
            this.state.discard_draft();
            if this.picker.slot() == Some(ConditionSlot::Draft) {
                this.show(ActivePicker::Closed);
            }
            Ok(())
        })
    }

    /// Remove a committed condition. The sole condition of a join is kept.
    pub fn remove_condition(&mut self, index: usize) -> JoinStepResult<()> {
        self.mutate(|this| {
            this.state.remove_condition(index)?;
            if index == 0 {
                this.refresh_alias()?;
            }
            this.show(ActivePicker::Closed);
            this.commit()?;
            Ok(())
        })
    }

    /// Remove the whole join from its stage, with later joins depending on it.
    pub fn remove_join(&mut self) -> JoinStepResult<()> {
        self.mutate(|this| {
            let index = this.join_index.ok_or(JoinStepError::NotCommitted)?;
            let catalog = Arc::clone(&this.catalog);
            let query = QueryFacade::new(&catalog).remove_join(&this.query, this.stage, index)?;

            debug!(stage = this.stage, join = index, "removing join");
            this.host.update_query(&query);
            this.query = query;
            this.join_index = None;
            this.state = JoinDraftState::new(this.settings.default_strategy);
            this.show(ActivePicker::Closed);
            Ok(())
        })
    }

    // =========================================================================
    // Pickers
    // =========================================================================

    /// Open a picker, closing whichever one was open.
    pub fn open_picker(&mut self, picker: ActivePicker) -> JoinStepResult<()> {
        if self.read_only {
            return Err(JoinStepError::ReadOnly);
        }
        match picker {
            ActivePicker::Closed | ActivePicker::RightTable | ActivePicker::Strategy => {}
            ActivePicker::Fields => {
                self.right_table_and_alias()?;
            }
            ActivePicker::Column { slot, side } | ActivePicker::Expression { slot, side } => {
                self.side_expression(slot, side)?;
                if side == Side::Rhs {
                    self.right_table_and_alias()?;
                }
            }
            ActivePicker::Operator { slot } => {
                self.slot_operator(slot)?;
            }
        }
        self.show(picker);
        Ok(())
    }

    pub fn close_picker(&mut self) {
        self.show(ActivePicker::Closed);
    }

    /// A click on the right table name.
    ///
    /// Modified clicks ask for the data source in a new tab and return its
    /// link; plain clicks open the table picker.
    pub fn click_right_table(&mut self, modifiers: ClickModifiers) -> JoinStepResult<Option<DataSourceLink>> {
        if modifiers.opens_new_tab() {
            if let Some(link) = self.right_table_link() {
                return Ok(Some(link));
            }
        }
        self.open_picker(ActivePicker::RightTable)?;
        Ok(None)
    }

    /// Accept the response to a table picker request.
    ///
    /// Returns false when the response was discarded because the picker was
    /// closed or reopened since the request.
    pub fn receive_tables(
        &mut self,
        ticket: RequestTicket,
        response: MetadataResult<TablePickerItems>,
    ) -> bool {
        let failure = response.as_ref().err().map(ToString::to_string);
        if !self.tables.receive(ticket, response) {
            warn!(?ticket, "discarding stale table picker response");
            return false;
        }
        if let Some(error) = failure {
            warn!(%error, "table picker request failed");
        }
        true
    }

    /// Fetch the right-table picker's content if a request is pending.
    pub async fn load_tables<P: MetadataProvider + ?Sized>(&mut self, provider: &P) -> bool {
        let ticket = match self.tables.content() {
            TablePickerContent::Loading(ticket) => *ticket,
            _ => return false,
        };
        let response = provider.table_picker_items(self.query.database).await;
        self.receive_tables(ticket, response)
    }

    // =========================================================================
    // Host boundary
    // =========================================================================

    /// Adopt the query the host rendered.
    ///
    /// The join is re-read from the new query; a draft in progress survives.
    pub fn rerender(&mut self, query: Query) -> JoinStepResult<()> {
        let catalog = Arc::clone(&self.catalog);
        let facade = QueryFacade::new(&catalog);
        facade.joins(&query, self.stage)?;

        if let Some(index) = self.join_index {
            match facade.join_at(&query, self.stage, index) {
                Ok(join) => self.state.sync_from_join(join),
                Err(_) => {
                    trace!(join = index, "join gone after rerender");
                    self.join_index = None;
                    self.state = JoinDraftState::new(self.settings.default_strategy);
                }
            }
        }
        self.query = query;
        Ok(())
    }

    /// Apply an action.
    pub fn dispatch(&mut self, action: JoinStepAction) -> JoinStepResult<()> {
        trace!(?action, "dispatching");
        let result = match action.clone() {
            JoinStepAction::SelectRightTable { table } => self.select_right_table(table),
            JoinStepAction::SetColumn { slot, side, column } => self.set_column(slot, side, column),
            JoinStepAction::SetExpression {
                slot,
                side,
                expression,
            } => self.set_expression(slot, side, expression),
            JoinStepAction::SetBucket { slot, side, bucket } => self.set_bucket(slot, side, bucket),
            JoinStepAction::SetOperator { slot, operator } => self.set_operator(slot, operator),
            JoinStepAction::SetStrategy { strategy } => self.set_strategy(strategy),
            JoinStepAction::ToggleField { column } => self.toggle_field(&column),
            JoinStepAction::ToggleAllFields => self.toggle_all_fields(),
            JoinStepAction::SetFields { fields } => self.set_fields(fields),
            JoinStepAction::AddCondition => self.add_condition(),
            JoinStepAction::DiscardDraft => self.discard_draft(),
            JoinStepAction::RemoveCondition { index } => self.remove_condition(index),
            JoinStepAction::RemoveJoin => self.remove_join(),
            JoinStepAction::OpenPicker { picker } => self.open_picker(picker),
            JoinStepAction::ClosePicker => {
                self.close_picker();
                Ok(())
            }
        };
        if let Err(error) = &result {
            debug!(%error, ?action, "action rejected");
        }
        result
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run a mutation, restoring the join state and pickers if it is rejected.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Self) -> JoinStepResult<T>) -> JoinStepResult<T> {
        if self.read_only {
            return Err(JoinStepError::ReadOnly);
        }
        let state = self.state.clone();
        let picker = self.picker;
        let tables = self.tables.content().clone();
        let result = f(self);
        if result.is_err() {
            self.state = state;
            self.picker = picker;
            self.tables.restore(tables);
        }
        result
    }

    fn apply_expression(&mut self, slot: ConditionSlot, side: Side, expression: Expression) -> JoinStepResult<()> {
        let catalog = Arc::clone(&self.catalog);
        let sync = ConditionSynchronizer::new(&catalog);

        match slot {
            ConditionSlot::Draft => {
                self.state.set_draft_side(side, expression)?;

                let mut complete = false;
                if let Some(draft) = self.state.draft_mut() {
                    if let (Some(lhs), Some(rhs)) = (&mut draft.lhs, &mut draft.rhs) {
                        sync.align_new_condition(lhs, rhs, side);
                        complete = true;
                    }
                }
                if !complete {
                    let next = match side {
                        Side::Lhs => self.auto_open(ActivePicker::Column {
                            slot: ConditionSlot::Draft,
                            side: Side::Rhs,
                        }),
                        Side::Rhs => ActivePicker::Closed,
                    };
                    self.show(next);
                    return Ok(());
                }

                let index = self.state.commit_draft()?;
                debug!(condition = index, "draft condition complete");
                if index == 0 {
                    self.refresh_alias()?;
                }
            }
            ConditionSlot::Committed(index) => {
                let mut condition = self.state.condition(index)?.clone();
                *condition_side_mut(&mut condition, side) = expression;
                sync.align_after_change(&mut condition, side);
                self.state.replace_condition(index, condition)?;
                if index == 0 {
                    self.refresh_alias()?;
                }
            }
        }

        self.show(ActivePicker::Closed);
        self.commit()?;
        Ok(())
    }

    /// Hand the join to the host, if it has a committed condition.
    fn commit(&mut self) -> JoinStepResult<bool> {
        let Some(join) = self.state.to_join() else {
            trace!("join has no committed condition yet, keeping change local");
            return Ok(false);
        };

        let catalog = Arc::clone(&self.catalog);
        let facade = QueryFacade::new(&catalog);
        let (query, index) = match self.join_index {
            Some(index) => (facade.replace_join(&self.query, self.stage, index, join)?, index),
            None => {
                let query = facade.join(&self.query, self.stage, join)?;
                let index = facade.joins(&query, self.stage)?.len().saturating_sub(1);
                (query, index)
            }
        };

        debug!(
            stage = self.stage,
            join = index,
            conditions = self.state.conditions().len(),
            "committing join"
        );
        self.host.update_query(&query);
        self.query = query;
        self.join_index = Some(index);
        Ok(true)
    }

    /// Re-derive the alias from the first condition.
    fn refresh_alias(&mut self) -> JoinStepResult<()> {
        let Some(target) = self.state.right_table() else {
            return Ok(());
        };
        let catalog = Arc::clone(&self.catalog);
        let facade = QueryFacade::new(&catalog);
        let lhs = self.state.conditions().first().map(|c| &c.lhs);
        let alias = facade.join_alias(&self.query, self.stage, self.join_index, target, lhs)?;

        if self.state.alias() != Some(alias.as_str()) {
            trace!(alias = %alias, "renaming join");
            self.state.rename_alias(&alias);
        }
        Ok(())
    }

    fn show(&mut self, picker: ActivePicker) {
        if picker == self.picker {
            return;
        }
        if self.picker == ActivePicker::RightTable {
            self.tables.teardown();
        }
        trace!(from = ?self.picker, to = ?picker, "picker");
        if picker == ActivePicker::RightTable {
            self.tables.request();
        }
        self.picker = picker;
    }

    fn auto_open(&self, picker: ActivePicker) -> ActivePicker {
        if self.settings.auto_open_pickers {
            picker
        } else {
            ActivePicker::Closed
        }
    }

    fn side_expression(&self, slot: ConditionSlot, side: Side) -> JoinStepResult<Option<&Expression>> {
        match slot {
            ConditionSlot::Draft => Ok(self
                .state
                .draft()
                .ok_or(JoinStepError::UnknownSlot(slot))?
                .side(side)),
            ConditionSlot::Committed(index) => {
                let condition = self.state.condition(index)?;
                Ok(Some(match side {
                    Side::Lhs => &condition.lhs,
                    Side::Rhs => &condition.rhs,
                }))
            }
        }
    }

    fn slot_operator(&self, slot: ConditionSlot) -> JoinStepResult<ConditionOperator> {
        match slot {
            ConditionSlot::Draft => self
                .state
                .draft()
                .map(|d| d.operator)
                .ok_or(JoinStepError::UnknownSlot(slot)),
            ConditionSlot::Committed(index) => Ok(self.state.condition(index)?.operator),
        }
    }

    fn right_table_and_alias(&self) -> JoinStepResult<(TableId, &str)> {
        match (self.state.right_table(), self.state.alias()) {
            (Some(table), Some(alias)) => Ok((table, alias)),
            _ => Err(JoinStepError::NoRightTable),
        }
    }

    fn right_table_columns(&self) -> JoinStepResult<Vec<ColumnRef>> {
        let (target, alias) = self.right_table_and_alias()?;
        Ok(QueryFacade::new(&self.catalog).rhs_columns(target, alias)?)
    }

    fn column_options(
        &self,
        facade: &QueryFacade<'_>,
        columns: Vec<ColumnRef>,
        current: Option<&Expression>,
    ) -> JoinStepResult<Vec<ColumnOption>> {
        let current = current.and_then(Expression::as_column);
        columns
            .into_iter()
            .map(|column| {
                let selection = current.filter(|c| c.same_column(&column));
                let bucket = match selection {
                    Some(selected) => selected.bucket,
                    None => facade.default_bucket(&column, self.settings.default_temporal_bucket),
                };
                let column = column.with_bucket(bucket);
                let info = facade.column_info(&column)?;
                Ok(ColumnOption {
                    selected: selection.is_some(),
                    bucketable: info.is_temporal,
                    display_name: info.display_name,
                    column,
                })
            })
            .collect()
    }
}

fn condition_side_mut(condition: &mut JoinCondition, side: Side) -> &mut Expression {
    match side {
        Side::Lhs => &mut condition.lhs,
        Side::Rhs => &mut condition.rhs,
    }
}
