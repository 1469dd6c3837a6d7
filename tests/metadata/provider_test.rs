use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use joinstep::metadata::sample;
use joinstep::metadata::{
    CachedProvider, Catalog, DatabaseId, DatabaseInfo, MetadataError, MetadataProvider,
    MetadataProviderExt, MetadataResult, RecentItem, StaticProvider, TableId, TableMetadata,
};

fn provider() -> StaticProvider {
    StaticProvider::new(Arc::new(Catalog::sample()))
}

/// Counts how often the wrapped provider is asked for tables.
struct Counting {
    inner: StaticProvider,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl Counting {
    fn new() -> Self {
        Self {
            inner: provider(),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MetadataProvider for Counting {
    async fn list_databases(&self) -> MetadataResult<Vec<DatabaseInfo>> {
        self.inner.list_databases().await
    }

    async fn list_tables(&self, database: DatabaseId) -> MetadataResult<Vec<TableMetadata>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_tables(database).await
    }

    async fn get_table(&self, id: TableId) -> MetadataResult<TableMetadata> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_table(id).await
    }

    async fn recent_tables(&self) -> MetadataResult<Vec<RecentItem>> {
        self.inner.recent_tables().await
    }
}

// =============================================================================
// StaticProvider
// =============================================================================

#[tokio::test]
async fn test_list_databases() {
    let databases = provider().list_databases().await.unwrap();

    let names: Vec<&str> = databases.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Sample Database", "Another Database"]);
}

#[tokio::test]
async fn test_unknown_database() {
    let result = provider().list_tables(DatabaseId(42)).await;

    assert_eq!(result, Err(MetadataError::DatabaseNotFound(DatabaseId(42))));
}

#[tokio::test]
async fn test_get_tables_batch() {
    let tables = provider()
        .get_tables_batch(&[sample::REVIEWS_ID, sample::ORDERS_ID])
        .await
        .unwrap();

    let ids: Vec<TableId> = tables.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![sample::REVIEWS_ID, sample::ORDERS_ID]);
}

#[tokio::test]
async fn test_get_tables_batch_fails_on_missing() {
    let result = provider()
        .get_tables_batch(&[sample::ORDERS_ID, TableId(99)])
        .await;

    assert_eq!(result, Err(MetadataError::TableNotFound(TableId(99))));
}

#[tokio::test]
async fn test_recents_skip_unknown_tables() {
    let provider = provider().with_recents(vec![sample::PEOPLE_ID, TableId(99)]);

    let recents = provider.recent_tables().await.unwrap();

    assert_eq!(
        recents,
        vec![RecentItem {
            table: sample::PEOPLE_ID,
            database: sample::SAMPLE_DB_ID,
            name: "People".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_table_picker_items_for_other_database() {
    let provider = provider().with_recents(vec![sample::ORDERS_ID, sample::ACCOUNTS_ID]);

    let items = provider.table_picker_items(sample::OTHER_DB_ID).await.unwrap();

    assert_eq!(items.tables.len(), 1);
    assert_eq!(items.tables[0].id, sample::ACCOUNTS_ID);
    assert_eq!(items.recents.len(), 1);
    assert_eq!(items.recents[0].table, sample::ACCOUNTS_ID);
}

// =============================================================================
// CachedProvider
// =============================================================================

#[tokio::test]
async fn test_cache_serves_repeated_listing() {
    let cached = CachedProvider::new(Counting::new());

    let first = cached.list_tables(sample::SAMPLE_DB_ID).await.unwrap();
    let second = cached.list_tables(sample::SAMPLE_DB_ID).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(cached.inner().list_calls.load(Ordering::SeqCst), 1);
    // Listed tables are cached individually too
    assert_eq!(cached.cached_tables(), 4);
    cached.get_table(sample::PRODUCTS_ID).await.unwrap();
    assert_eq!(cached.inner().get_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cache_does_not_keep_errors() {
    let cached = CachedProvider::new(Counting::new());

    assert!(cached.get_table(TableId(99)).await.is_err());
    assert!(cached.get_table(TableId(99)).await.is_err());

    assert_eq!(cached.inner().get_calls.load(Ordering::SeqCst), 2);
    assert_eq!(cached.cached_tables(), 0);
}

#[tokio::test]
async fn test_cache_clear() {
    let cached = CachedProvider::new(Counting::new());
    cached.get_table(sample::ORDERS_ID).await.unwrap();
    assert_eq!(cached.cached_tables(), 1);

    cached.clear();
    cached.get_table(sample::ORDERS_ID).await.unwrap();

    assert_eq!(cached.inner().get_calls.load(Ordering::SeqCst), 2);
}
