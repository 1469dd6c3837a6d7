//! Field selection toggling.
//!
//! Selections are kept normalized: an explicit set holding every column of
//! the joined table is [`JoinFields::All`], an empty one is
//! [`JoinFields::None`].

use crate::query::{ColumnRef, JoinFields};

/// Flip a single column in or out of the selection.
///
/// `all_columns` lists the joined table's columns in display order; explicit
/// selections keep that order.
pub fn toggle_column(fields: &JoinFields, column: &ColumnRef, all_columns: &[ColumnRef]) -> JoinFields {
    let selected: Vec<ColumnRef> = all_columns
        .iter()
        .filter(|c| {
            let was_selected = fields.is_selected(c);
            if c.same_column(column) {
                !was_selected
            } else {
                was_selected
            }
        })
        .cloned()
        .collect();

    normalize_selection(selected, all_columns.len())
}

/// Bring an arbitrary selection into normal form.
///
/// Columns not belonging to `all_columns` are dropped.
pub fn normalize(fields: JoinFields, all_columns: &[ColumnRef]) -> JoinFields {
    match fields {
        JoinFields::Columns(columns) => {
            let selected = all_columns
                .iter()
                .filter(|c| columns.iter().any(|s| s.same_column(c)))
                .cloned()
                .collect();
            normalize_selection(selected, all_columns.len())
        }
        other => other,
    }
}

/// "Select all" checkbox: everything selected becomes nothing, anything else
/// becomes everything.
pub fn toggle_all(fields: &JoinFields) -> JoinFields {
    match fields {
        JoinFields::All => JoinFields::None,
        _ => JoinFields::All,
    }
}

fn normalize_selection(selected: Vec<ColumnRef>, total: usize) -> JoinFields {
    if selected.is_empty() {
        JoinFields::None
    } else if selected.len() == total {
        JoinFields::All
    } else {
        JoinFields::Columns(selected)
    }
}
