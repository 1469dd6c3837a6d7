//! MetadataProvider trait definition.
//!
//! The MetadataProvider trait abstracts over the data-access layer that
//! pickers use to list databases, tables and recently viewed items. Requests
//! are fire-and-forget from the join step's point of view: the response is
//! applied to the picker that asked for it, or dropped if that picker is gone.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::catalog::Catalog;
use super::types::{DatabaseId, DatabaseInfo, TableId, TableMetadata};

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur while fetching metadata.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// The requested table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(TableId),

    /// The requested database does not exist.
    #[error("database not found: {0}")]
    DatabaseNotFound(DatabaseId),

    /// The backing service failed to answer.
    #[error("metadata request failed: {0}")]
    RequestFailed(String),
}

/// A recently viewed or selected table.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentItem {
    pub table: TableId,
    pub database: DatabaseId,
    pub name: String,
}

/// Trait for fetching catalog metadata.
///
/// # Example
///
/// ```ignore
/// use joinstep::metadata::{MetadataProvider, StaticProvider};
///
/// async fn example(provider: &impl MetadataProvider) -> MetadataResult<()> {
///     let databases = provider.list_databases().await?;
///     let tables = provider.list_tables(databases[0].id).await?;
///     let table = provider.get_table(tables[0].id).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// List all databases.
    async fn list_databases(&self) -> MetadataResult<Vec<DatabaseInfo>>;

    /// List all tables of a database, with their fields.
    async fn list_tables(&self, database: DatabaseId) -> MetadataResult<Vec<TableMetadata>>;

    /// Get complete metadata for a table.
    async fn get_table(&self, id: TableId) -> MetadataResult<TableMetadata>;

    /// Recently viewed or selected tables, newest first.
    async fn recent_tables(&self) -> MetadataResult<Vec<RecentItem>>;

    /// Batch fetch multiple tables.
    ///
    /// Default implementation fetches tables in parallel using `join_all`.
    async fn get_tables_batch(&self, ids: &[TableId]) -> MetadataResult<Vec<TableMetadata>> {
        let futures: Vec<_> = ids.iter().map(|id| self.get_table(*id)).collect();

        let results = futures::future::join_all(futures).await;

        // Collect results, failing if any failed
        results.into_iter().collect()
    }
}

/// Extension trait with picker-oriented convenience methods.
#[async_trait]
pub trait MetadataProviderExt: MetadataProvider {
    /// Everything the right-table picker shows for a query on `database`.
    ///
    /// Tables and recents from other databases are dropped: a join can only
    /// target a table living next to the query's source.
    async fn table_picker_items(&self, database: DatabaseId) -> MetadataResult<TablePickerItems> {
        let (tables, recents) =
            futures::future::join(self.list_tables(database), self.recent_tables()).await;

        let tables: Vec<TableMetadata> = tables?
            .into_iter()
            .filter(|t| t.database == database)
            .collect();

        // A failing recents endpoint should not hide the table list.
        let recents = match recents {
            Ok(items) => items
                .into_iter()
                .filter(|r| r.database == database)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "recent items unavailable");
                Vec::new()
            }
        };

        Ok(TablePickerItems { tables, recents })
    }
}

// Blanket implementation for all MetadataProvider implementations
impl<T: MetadataProvider + ?Sized> MetadataProviderExt for T {}

/// Content of the right-table picker.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePickerItems {
    pub tables: Vec<TableMetadata>,
    pub recents: Vec<RecentItem>,
}

/// A provider answering from an in-memory catalog.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    catalog: Arc<Catalog>,
    recents: Vec<TableId>,
}

impl StaticProvider {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            recents: Vec::new(),
        }
    }

    pub fn with_recents(mut self, recents: Vec<TableId>) -> Self {
        self.recents = recents;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}

#[async_trait]
impl MetadataProvider for StaticProvider {
    async fn list_databases(&self) -> MetadataResult<Vec<DatabaseInfo>> {
        Ok(self.catalog.databases().to_vec())
    }

    async fn list_tables(&self, database: DatabaseId) -> MetadataResult<Vec<TableMetadata>> {
        if self.catalog.database(database).is_none() {
            return Err(MetadataError::DatabaseNotFound(database));
        }
        Ok(self.catalog.tables_in(database).cloned().collect())
    }

    async fn get_table(&self, id: TableId) -> MetadataResult<TableMetadata> {
        self.catalog
            .table(id)
            .cloned()
            .ok_or(MetadataError::TableNotFound(id))
    }

    async fn recent_tables(&self) -> MetadataResult<Vec<RecentItem>> {
        Ok(self
            .recents
            .iter()
            .filter_map(|id| self.catalog.table(*id))
            .map(|t| RecentItem {
                table: t.id,
                database: t.database,
                name: t.label(),
            })
            .collect())
    }
}
