//! Link from the right table to its data source.

use serde::{Deserialize, Serialize};

use crate::metadata::TableId;

/// Modifier state of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickModifiers {
    pub meta: bool,
    pub ctrl: bool,
    /// Middle mouse button.
    pub middle: bool,
}

impl ClickModifiers {
    /// Whether the click asks for a new tab.
    pub fn opens_new_tab(&self) -> bool {
        self.meta || self.ctrl || self.middle
    }
}

/// URL of a table's data source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceLink {
    pub table: TableId,
    pub url: String,
}

impl DataSourceLink {
    pub fn new(site_url: &str, table: TableId) -> Self {
        Self {
            table,
            url: format!("{}/table/{}", site_url.trim_end_matches('/'), table),
        }
    }
}
