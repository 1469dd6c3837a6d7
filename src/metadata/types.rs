//! Metadata types for the provider abstraction.
//!
//! These are the shapes the data-access layer hands back to pickers: databases,
//! tables and their fields, including primary/foreign key markers used for
//! join suggestions.

use std::fmt;

use inflector::Inflector;
use serde::{Deserialize, Serialize};

/// Identifier of a database connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(pub u32);

/// Identifier of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u32);

/// Identifier of a field (column) of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u32);

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base type of a field, as reported by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    Integer,
    Float,
    Decimal,
    Text,
    Boolean,
    Date,
    DateTime,
    Time,
    Unknown,
}

impl BaseType {
    /// Date, date-time and time columns can carry a temporal bucket.
    pub fn is_temporal(&self) -> bool {
        matches!(self, BaseType::Date | BaseType::DateTime | BaseType::Time)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, BaseType::Integer | BaseType::Float | BaseType::Decimal)
    }
}

impl Default for BaseType {
    fn default() -> Self {
        BaseType::Unknown
    }
}

/// Information about a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub id: DatabaseId,
    pub name: String,
}

/// Complete metadata for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub id: FieldId,
    /// Owning table. Filled in by the catalog when loading.
    #[serde(default = "unassigned_table")]
    pub table_id: TableId,
    /// Physical column name, e.g. `PRODUCT_ID`.
    pub name: String,
    /// Human-readable name. Derived from `name` when absent.
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub base_type: BaseType,
    #[serde(default)]
    pub primary_key: bool,
    /// Target of a foreign key constraint, if any.
    #[serde(default)]
    pub fk_target: Option<FieldId>,
}

fn unassigned_table() -> TableId {
    TableId(0)
}

impl FieldMetadata {
    pub fn new(id: u32, name: &str, base_type: BaseType) -> Self {
        Self {
            id: FieldId(id),
            table_id: TableId(0),
            name: name.to_string(),
            display_name: None,
            base_type,
            primary_key: false,
            fk_target: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn references(mut self, target: u32) -> Self {
        self.fk_target = Some(FieldId(target));
        self
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    /// The display name, falling back to a humanized physical name.
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => humanize_name(&self.name),
        }
    }

    pub fn is_foreign_key(&self) -> bool {
        self.fk_target.is_some()
    }
}

/// Complete metadata for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub id: TableId,
    pub database: DatabaseId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}

impl TableMetadata {
    pub fn new(id: u32, database: u32, name: &str) -> Self {
        Self {
            id: TableId(id),
            database: DatabaseId(database),
            name: name.to_string(),
            display_name: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, mut field: FieldMetadata) -> Self {
        field.table_id = self.id;
        self.fields.push(field);
        self
    }

    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => humanize_name(&self.name),
        }
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn primary_key(&self) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.primary_key)
    }
}

/// Turn a physical name into a display name.
///
/// `PRODUCT_ID` becomes `Product ID`, `created_at` becomes `Created At`.
pub fn humanize_name(name: &str) -> String {
    name.to_lowercase()
        .to_title_case()
        .split(' ')
        .map(|word| if word == "Id" { "ID" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}
