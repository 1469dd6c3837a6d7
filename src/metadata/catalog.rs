//! In-memory metadata catalog.
//!
//! The catalog is the synchronous view the query facade reads from. It can be
//! built programmatically, loaded from a TOML file, or taken from the bundled
//! sample database.
//!
//! ```toml
//! [[databases]]
//! id = 1
//! name = "Sample Database"
//!
//! [[tables]]
//! id = 1
//! database = 1
//! name = "ORDERS"
//!
//! [[tables.fields]]
//! id = 100
//! name = "ID"
//! base_type = "integer"
//! primary_key = true
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::types::{DatabaseId, DatabaseInfo, FieldId, FieldMetadata, TableId, TableMetadata};

/// Errors raised while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Duplicate table id {0}")]
    DuplicateTable(TableId),

    #[error("Duplicate field id {0}")]
    DuplicateField(FieldId),

    #[error("Table {table} references unknown database {database}")]
    UnknownDatabase { table: TableId, database: DatabaseId },

    #[error("Field {field} references unknown field {target}")]
    DanglingForeignKey { field: FieldId, target: FieldId },
}

/// On-disk shape of a catalog file.
#[derive(Debug, Default, Deserialize, Serialize)]
struct CatalogFile {
    #[serde(default)]
    databases: Vec<DatabaseInfo>,
    #[serde(default)]
    tables: Vec<TableMetadata>,
}

/// Databases, tables and fields indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    databases: Vec<DatabaseInfo>,
    tables: Vec<TableMetadata>,
    table_index: HashMap<TableId, usize>,
    field_index: HashMap<FieldId, (usize, usize)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Catalog::new();
        for database in file.databases {
            catalog.add_database(database);
        }
        for table in file.tables {
            catalog.add_table(table)?;
        }
        catalog.check_foreign_keys()?;
        Ok(catalog)
    }

    pub fn add_database(&mut self, database: DatabaseInfo) {
        self.databases.retain(|d| d.id != database.id);
        self.databases.push(database);
    }

    /// Register a table and its fields.
    pub fn add_table(&mut self, table: TableMetadata) -> Result<(), CatalogError> {
        if self.table_index.contains_key(&table.id) {
            return Err(CatalogError::DuplicateTable(table.id));
        }
        if !self.databases.iter().any(|d| d.id == table.database) {
            return Err(CatalogError::UnknownDatabase {
                table: table.id,
                database: table.database,
            });
        }
        for (pos, field) in table.fields.iter().enumerate() {
            let repeated = table.fields[..pos].iter().any(|f| f.id == field.id);
            if repeated || self.field_index.contains_key(&field.id) {
                return Err(CatalogError::DuplicateField(field.id));
            }
        }
        self.index_table(table);
        Ok(())
    }

    /// Index a table already known to have fresh table and field ids.
    pub(crate) fn index_table(&mut self, mut table: TableMetadata) {
        let table_pos = self.tables.len();
        for (field_pos, field) in table.fields.iter_mut().enumerate() {
            field.table_id = table.id;
            self.field_index.insert(field.id, (table_pos, field_pos));
        }
        self.table_index.insert(table.id, table_pos);
        self.tables.push(table);
    }

    pub(crate) fn check_foreign_keys(&self) -> Result<(), CatalogError> {
        for field in self.tables.iter().flat_map(|t| t.fields.iter()) {
            if let Some(target) = field.fk_target {
                if !self.field_index.contains_key(&target) {
                    return Err(CatalogError::DanglingForeignKey {
                        field: field.id,
                        target,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn databases(&self) -> &[DatabaseInfo] {
        &self.databases
    }

    pub fn database(&self, id: DatabaseId) -> Option<&DatabaseInfo> {
        self.databases.iter().find(|d| d.id == id)
    }

    pub fn table(&self, id: TableId) -> Option<&TableMetadata> {
        self.table_index.get(&id).map(|&pos| &self.tables[pos])
    }

    /// Look up a table by physical or display name (case-insensitive).
    pub fn table_named(&self, name: &str) -> Option<&TableMetadata> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name) || t.label().eq_ignore_ascii_case(name))
    }

    pub fn tables_in(&self, database: DatabaseId) -> impl Iterator<Item = &TableMetadata> {
        self.tables.iter().filter(move |t| t.database == database)
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldMetadata> {
        self.field_index
            .get(&id)
            .map(|&(table_pos, field_pos)| &self.tables[table_pos].fields[field_pos])
    }

    /// The table owning a field.
    pub fn field_table(&self, id: FieldId) -> Option<&TableMetadata> {
        self.field_index
            .get(&id)
            .map(|&(table_pos, _)| &self.tables[table_pos])
    }
}
