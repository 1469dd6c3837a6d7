use std::sync::Arc;

use async_trait::async_trait;
use joinstep::config::JoinSettings;
use joinstep::join_step::{
    ActivePicker, ConditionSlot, JoinStepController, QueryLog, RequestTicket, Side, TablePickerContent,
};
use joinstep::metadata::sample::{self, fields};
use joinstep::metadata::{
    Catalog, DatabaseId, DatabaseInfo, MetadataError, MetadataProvider, MetadataResult, RecentItem,
    StaticProvider, TableId, TableMetadata, TablePickerItems,
};
use joinstep::query::{ColumnRef, Query};

/// A data-access layer that is down.
struct Unavailable;

#[async_trait]
impl MetadataProvider for Unavailable {
    async fn list_databases(&self) -> MetadataResult<Vec<DatabaseInfo>> {
        Err(MetadataError::RequestFailed("offline".to_string()))
    }

    async fn list_tables(&self, _database: DatabaseId) -> MetadataResult<Vec<TableMetadata>> {
        Err(MetadataError::RequestFailed("offline".to_string()))
    }

    async fn get_table(&self, id: TableId) -> MetadataResult<TableMetadata> {
        Err(MetadataError::TableNotFound(id))
    }

    async fn recent_tables(&self) -> MetadataResult<Vec<RecentItem>> {
        Err(MetadataError::RequestFailed("offline".to_string()))
    }
}

fn controller() -> (Arc<Catalog>, JoinStepController<QueryLog>) {
    let catalog = Arc::new(Catalog::sample());
    let query = Query::from_table(sample::SAMPLE_DB_ID, sample::ORDERS_ID);
    let controller = JoinStepController::new(
        Arc::clone(&catalog),
        query,
        0,
        None,
        JoinSettings::default(),
        QueryLog::new(),
    )
    .unwrap();
    (catalog, controller)
}

fn pending_ticket(controller: &JoinStepController<QueryLog>) -> RequestTicket {
    match controller.table_picker() {
        TablePickerContent::Loading(ticket) => *ticket,
        other => panic!("expected a pending request, got {:?}", other),
    }
}

fn empty_items() -> TablePickerItems {
    TablePickerItems {
        tables: Vec::new(),
        recents: Vec::new(),
    }
}

#[tokio::test]
async fn test_opening_picker_loads_tables() {
    let (catalog, mut controller) = controller();
    let provider = StaticProvider::new(catalog);

    assert!(controller.load_tables(&provider).await);

    let TablePickerContent::Loaded(items) = controller.table_picker() else {
        panic!("expected loaded tables");
    };
    let names: Vec<String> = items.tables.iter().map(|t| t.label()).collect();
    assert_eq!(names, vec!["Orders", "Products", "People", "Reviews"]);
}

#[tokio::test]
async fn test_other_database_excluded_from_recents() {
    let (catalog, mut controller) = controller();
    let provider = StaticProvider::new(catalog)
        .with_recents(vec![sample::ACCOUNTS_ID, sample::PRODUCTS_ID]);

    controller.load_tables(&provider).await;

    let TablePickerContent::Loaded(items) = controller.table_picker() else {
        panic!("expected loaded tables");
    };
    let recents: Vec<TableId> = items.recents.iter().map(|r| r.table).collect();
    assert_eq!(recents, vec![sample::PRODUCTS_ID]);
    assert!(items.tables.iter().all(|t| t.database == sample::SAMPLE_DB_ID));
}

#[tokio::test]
async fn test_failure_degrades_picker() {
    let (_, mut controller) = controller();

    assert!(controller.load_tables(&Unavailable).await);

    assert_eq!(
        controller.table_picker(),
        &TablePickerContent::Failed(MetadataError::RequestFailed("offline".to_string()))
    );
    // The controller keeps working
    assert_eq!(controller.active_picker(), ActivePicker::RightTable);
    controller.select_right_table(sample::PRODUCTS_ID).unwrap();
    assert_eq!(controller.host().len(), 1);
}

#[tokio::test]
async fn test_nothing_to_load_when_closed() {
    let (catalog, mut controller) = controller();
    controller.close_picker();

    assert!(!controller.load_tables(&StaticProvider::new(catalog)).await);
    assert_eq!(controller.table_picker(), &TablePickerContent::Idle);
}

#[test]
fn test_response_after_close_discarded() {
    let (_, mut controller) = controller();
    let ticket = pending_ticket(&controller);

    controller.close_picker();

    assert!(!controller.receive_tables(ticket, Ok(empty_items())));
    assert_eq!(controller.table_picker(), &TablePickerContent::Idle);
}

#[test]
fn test_stale_response_after_reopen_discarded() {
    let (_, mut controller) = controller();
    let first = pending_ticket(&controller);

    // Switching to another picker and back issues a new request
    controller.open_picker(ActivePicker::Strategy).unwrap();
    controller.open_picker(ActivePicker::RightTable).unwrap();
    let second = pending_ticket(&controller);
    assert_ne!(first, second);

    assert!(!controller.receive_tables(first, Ok(empty_items())));
    assert_eq!(controller.table_picker(), &TablePickerContent::Loading(second));

    assert!(controller.receive_tables(second, Ok(empty_items())));
    assert_eq!(controller.table_picker(), &TablePickerContent::Loaded(empty_items()));
}

#[test]
fn test_selecting_table_tears_picker_down() {
    let (_, mut controller) = controller();
    let ticket = pending_ticket(&controller);

    controller.select_right_table(sample::PRODUCTS_ID).unwrap();

    assert_eq!(controller.active_picker(), ActivePicker::Closed);
    assert!(!controller.receive_tables(ticket, Ok(empty_items())));
}

#[test]
fn test_rejected_action_keeps_pending_request() {
    let (_, mut controller) = controller();
    let ticket = pending_ticket(&controller);

    let result = controller.set_column(
        ConditionSlot::Committed(0),
        Side::Lhs,
        ColumnRef::new(fields::ORDERS_TAX),
    );

    assert!(result.is_err());
    assert_eq!(controller.active_picker(), ActivePicker::RightTable);
    assert_eq!(pending_ticket(&controller), ticket);
    assert!(controller.receive_tables(ticket, Ok(empty_items())));
}
