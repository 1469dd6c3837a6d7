//! In-memory metadata cache.
//!
//! Pickers re-open frequently; `CachedProvider` memoizes table listings and
//! table metadata so repeated opens do not hit the backing service again.
//!
//! # Design
//!
//! - Keyed by database id (listings) and table id (metadata)
//! - No TTL - entries live until `clear()` or the provider is dropped
//! - Errors are never cached

use async_trait::async_trait;
use dashmap::DashMap;

use super::provider::{MetadataProvider, MetadataResult, RecentItem};
use super::types::{DatabaseId, DatabaseInfo, TableId, TableMetadata};

/// Memoizing wrapper around another provider.
pub struct CachedProvider<P> {
    inner: P,
    tables: DashMap<TableId, TableMetadata>,
    listings: DashMap<DatabaseId, Vec<TableMetadata>>,
}

impl<P: MetadataProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            tables: DashMap::new(),
            listings: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of cached table entries.
    pub fn cached_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn clear(&self) {
        self.tables.clear();
        self.listings.clear();
    }
}

#[async_trait]
impl<P: MetadataProvider> MetadataProvider for CachedProvider<P> {
    async fn list_databases(&self) -> MetadataResult<Vec<DatabaseInfo>> {
        self.inner.list_databases().await
    }

    async fn list_tables(&self, database: DatabaseId) -> MetadataResult<Vec<TableMetadata>> {
        if let Some(hit) = self.listings.get(&database) {
            return Ok(hit.value().clone());
        }

        let tables = self.inner.list_tables(database).await?;
        for table in &tables {
            self.tables.insert(table.id, table.clone());
        }
        self.listings.insert(database, tables.clone());
        Ok(tables)
    }

    async fn get_table(&self, id: TableId) -> MetadataResult<TableMetadata> {
        if let Some(hit) = self.tables.get(&id) {
            return Ok(hit.value().clone());
        }

        let table = self.inner.get_table(id).await?;
        self.tables.insert(id, table.clone());
        Ok(table)
    }

    // Recents change on every selection; always ask upstream.
    async fn recent_tables(&self) -> MetadataResult<Vec<RecentItem>> {
        self.inner.recent_tables().await
    }
}
