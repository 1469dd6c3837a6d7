//! The query value: an ordered list of stages, each with its joins.
//!
//! Queries are plain values. Nothing in this crate mutates a query held by
//! the host; edits go through [`QueryFacade`](super::QueryFacade) and produce
//! a new value.

use serde::{Deserialize, Serialize};

use super::join::Join;
use crate::metadata::{DatabaseId, TableId};

/// Where a stage reads its rows from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSource {
    Table(TableId),
    /// The output of the preceding stage.
    PreviousStage,
}

/// One stage of a multi-stage query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub source: StageSource,
    #[serde(default)]
    pub joins: Vec<Join>,
}

/// A multi-stage data query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub database: DatabaseId,
    pub stages: Vec<Stage>,
}

impl Query {
    /// A single-stage query reading from `table`.
    pub fn from_table(database: DatabaseId, table: TableId) -> Self {
        Self {
            database,
            stages: vec![Stage {
                source: StageSource::Table(table),
                joins: Vec::new(),
            }],
        }
    }

    /// Append a stage that reads the previous stage's output.
    pub fn append_stage(mut self) -> Self {
        self.stages.push(Stage {
            source: StageSource::PreviousStage,
            joins: Vec::new(),
        });
        self
    }

    /// Resolve a possibly negative stage index (`-1` is the last stage).
    pub fn stage_index(&self, index: i32) -> Option<usize> {
        let len = self.stages.len() as i32;
        let resolved = if index < 0 { len + index } else { index };
        if resolved >= 0 && resolved < len {
            Some(resolved as usize)
        } else {
            None
        }
    }

    /// The table of the first stage.
    pub fn source_table(&self) -> Option<TableId> {
        match self.stages.first().map(|s| &s.source) {
            Some(StageSource::Table(table)) => Some(*table),
            _ => None,
        }
    }
}
