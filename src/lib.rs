//! # Joinstep
//!
//! The join step of a notebook-style query editor: picking the table to join,
//! wiring up join conditions, and committing the result as a new query value.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Metadata (Catalog, Providers)               │
//! │  (databases, tables, fields, foreign keys, recents)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [facade]
//! ┌─────────────────────────────────────────────────────────┐
//! │               Query model + QueryFacade                  │
//! │  (stages, joins, conditions, expressions, buckets)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [synchronizer]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Draft condition state + condition synchronizer      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [controller]
//! ┌─────────────────────────────────────────────────────────┐
//! │    JoinStepController ──► QueryHost::update_query        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod join_step;
pub mod metadata;
pub mod query;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{JoinSettings, Settings};
    pub use crate::join_step::{
        ActivePicker, ConditionSlot, JoinStepAction, JoinStepController, JoinStepError,
        QueryHost, QueryLog, Side,
    };
    pub use crate::metadata::{Catalog, DatabaseId, FieldId, TableId};
    pub use crate::query::{
        ColumnRef, ConditionOperator, Expression, Join, JoinCondition, JoinFields, JoinStrategy,
        Literal, Query, QueryFacade, TemporalBucket,
    };
}
