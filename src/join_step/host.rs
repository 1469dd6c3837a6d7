//! The commit boundary towards the host application.

use crate::query::Query;

/// Receives every query the join step commits.
///
/// Called synchronously, once per committed change, and never for an
/// incomplete draft. The host owns persistence and is expected to hand the
/// new query back through [`JoinStepController::rerender`].
///
/// [`JoinStepController::rerender`]: super::JoinStepController::rerender
pub trait QueryHost {
    fn update_query(&mut self, query: &Query);
}

/// A host that records every committed query.
#[derive(Debug, Clone, Default)]
pub struct QueryLog {
    queries: Vec<Query>,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn last(&self) -> Option<&Query> {
        self.queries.last()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn into_queries(self) -> Vec<Query> {
        self.queries
    }
}

impl QueryHost for QueryLog {
    fn update_query(&mut self, query: &Query) {
        self.queries.push(query.clone());
    }
}
