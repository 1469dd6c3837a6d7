//! Picker visibility and table picker requests.
//!
//! At most one picker is open per join step. Table listings are fetched
//! asynchronously; each opening of the right-table picker issues a
//! [`RequestTicket`] and only a response carrying the latest ticket is
//! accepted.

use serde::{Deserialize, Serialize};

use super::draft::{ConditionSlot, Side};
use crate::metadata::{MetadataError, TablePickerItems};

/// The picker currently open, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "picker", rename_all = "snake_case")]
pub enum ActivePicker {
    #[default]
    Closed,
    RightTable,
    Column { slot: ConditionSlot, side: Side },
    Operator { slot: ConditionSlot },
    Strategy,
    Fields,
    Expression { slot: ConditionSlot, side: Side },
}

impl ActivePicker {
    pub fn is_open(&self) -> bool {
        !matches!(self, ActivePicker::Closed)
    }

    /// Condition slot the picker edits, if it edits one.
    pub fn slot(&self) -> Option<ConditionSlot> {
        match self {
            ActivePicker::Column { slot, .. }
            | ActivePicker::Operator { slot }
            | ActivePicker::Expression { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

/// Identifies one table picker request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// What the right-table picker shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TablePickerContent {
    #[default]
    Idle,
    Loading(RequestTicket),
    Loaded(TablePickerItems),
    Failed(MetadataError),
}

/// Request bookkeeping for the right-table picker.
#[derive(Debug, Default)]
pub(crate) struct TablePickerState {
    next_ticket: u64,
    content: TablePickerContent,
}

impl TablePickerState {
    pub fn content(&self) -> &TablePickerContent {
        &self.content
    }

    /// Start a request, superseding any in flight.
    pub fn request(&mut self) -> RequestTicket {
        self.next_ticket += 1;
        let ticket = RequestTicket(self.next_ticket);
        self.content = TablePickerContent::Loading(ticket);
        ticket
    }

    /// Accept a response. Returns false when it was discarded.
    pub fn receive(
        &mut self,
        ticket: RequestTicket,
        response: Result<TablePickerItems, MetadataError>,
    ) -> bool {
        if self.content != TablePickerContent::Loading(ticket) {
            return false;
        }
        self.content = match response {
            Ok(items) => TablePickerContent::Loaded(items),
            Err(e) => TablePickerContent::Failed(e),
        };
        true
    }

    /// Drop the picker's content. Responses to earlier tickets are ignored.
    pub fn teardown(&mut self) {
        self.content = TablePickerContent::Idle;
    }

    /// Put back content saved before a rejected action. The ticket counter
    /// keeps moving forward.
    pub fn restore(&mut self, content: TablePickerContent) {
        self.content = content;
    }
}
