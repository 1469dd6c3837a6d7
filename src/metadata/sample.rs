//! Bundled sample database.
//!
//! A small commerce schema (orders, products, people, reviews) used by the CLI
//! when no catalog is configured, and by the tests. A second database holds
//! one table so cross-database filtering can be exercised.

use super::catalog::Catalog;
use super::types::{BaseType, DatabaseId, DatabaseInfo, FieldMetadata, TableId, TableMetadata};

pub const SAMPLE_DB_ID: DatabaseId = DatabaseId(1);
pub const OTHER_DB_ID: DatabaseId = DatabaseId(2);

pub const ORDERS_ID: TableId = TableId(1);
pub const PRODUCTS_ID: TableId = TableId(2);
pub const PEOPLE_ID: TableId = TableId(3);
pub const REVIEWS_ID: TableId = TableId(4);
pub const ACCOUNTS_ID: TableId = TableId(5);

pub mod fields {
    use crate::metadata::FieldId;

    pub const ORDERS_ID: FieldId = FieldId(100);
    pub const ORDERS_USER_ID: FieldId = FieldId(101);
    pub const ORDERS_PRODUCT_ID: FieldId = FieldId(102);
    pub const ORDERS_SUBTOTAL: FieldId = FieldId(103);
    pub const ORDERS_TAX: FieldId = FieldId(104);
    pub const ORDERS_TOTAL: FieldId = FieldId(105);
    pub const ORDERS_DISCOUNT: FieldId = FieldId(106);
    pub const ORDERS_CREATED_AT: FieldId = FieldId(107);
    pub const ORDERS_QUANTITY: FieldId = FieldId(108);

    pub const PRODUCTS_ID: FieldId = FieldId(200);
    pub const PRODUCTS_EAN: FieldId = FieldId(201);
    pub const PRODUCTS_TITLE: FieldId = FieldId(202);
    pub const PRODUCTS_CATEGORY: FieldId = FieldId(203);
    pub const PRODUCTS_VENDOR: FieldId = FieldId(204);
    pub const PRODUCTS_PRICE: FieldId = FieldId(205);
    pub const PRODUCTS_RATING: FieldId = FieldId(206);
    pub const PRODUCTS_CREATED_AT: FieldId = FieldId(207);

    pub const PEOPLE_ID: FieldId = FieldId(300);
    pub const PEOPLE_ADDRESS: FieldId = FieldId(301);
    pub const PEOPLE_EMAIL: FieldId = FieldId(302);
    pub const PEOPLE_NAME: FieldId = FieldId(303);
    pub const PEOPLE_CITY: FieldId = FieldId(304);
    pub const PEOPLE_STATE: FieldId = FieldId(305);
    pub const PEOPLE_BIRTH_DATE: FieldId = FieldId(306);
    pub const PEOPLE_CREATED_AT: FieldId = FieldId(307);

    pub const REVIEWS_ID: FieldId = FieldId(400);
    pub const REVIEWS_PRODUCT_ID: FieldId = FieldId(401);
    pub const REVIEWS_REVIEWER: FieldId = FieldId(402);
    pub const REVIEWS_RATING: FieldId = FieldId(403);
    pub const REVIEWS_BODY: FieldId = FieldId(404);
    pub const REVIEWS_CREATED_AT: FieldId = FieldId(405);

    pub const ACCOUNTS_ID: FieldId = FieldId(500);
    pub const ACCOUNTS_CREATED_AT: FieldId = FieldId(501);
}

impl Catalog {
    /// The bundled sample catalog.
    pub fn sample() -> Self {
        let mut catalog = Catalog::new();
        catalog.add_database(DatabaseInfo {
            id: SAMPLE_DB_ID,
            name: "Sample Database".to_string(),
        });
        catalog.add_database(DatabaseInfo {
            id: OTHER_DB_ID,
            name: "Another Database".to_string(),
        });

        for table in sample_tables() {
            catalog.index_table(table);
        }
        catalog
    }
}

fn sample_tables() -> Vec<TableMetadata> {
    use BaseType::*;

    vec![
        TableMetadata::new(1, 1, "ORDERS")
            .with_field(FieldMetadata::new(100, "ID", Integer).primary_key())
            .with_field(FieldMetadata::new(101, "USER_ID", Integer).references(300))
            .with_field(FieldMetadata::new(102, "PRODUCT_ID", Integer).references(200))
            .with_field(FieldMetadata::new(103, "SUBTOTAL", Float))
            .with_field(FieldMetadata::new(104, "TAX", Float))
            .with_field(FieldMetadata::new(105, "TOTAL", Float))
            .with_field(FieldMetadata::new(106, "DISCOUNT", Float))
            .with_field(FieldMetadata::new(107, "CREATED_AT", DateTime))
            .with_field(FieldMetadata::new(108, "QUANTITY", Integer)),
        TableMetadata::new(2, 1, "PRODUCTS")
            .with_field(FieldMetadata::new(200, "ID", Integer).primary_key())
            .with_field(FieldMetadata::new(201, "EAN", Text))
            .with_field(FieldMetadata::new(202, "TITLE", Text))
            .with_field(FieldMetadata::new(203, "CATEGORY", Text))
            .with_field(FieldMetadata::new(204, "VENDOR", Text))
            .with_field(FieldMetadata::new(205, "PRICE", Float))
            .with_field(FieldMetadata::new(206, "RATING", Float))
            .with_field(FieldMetadata::new(207, "CREATED_AT", DateTime)),
        TableMetadata::new(3, 1, "PEOPLE")
            .with_field(FieldMetadata::new(300, "ID", Integer).primary_key())
            .with_field(FieldMetadata::new(301, "ADDRESS", Text))
            .with_field(FieldMetadata::new(302, "EMAIL", Text))
            .with_field(FieldMetadata::new(303, "NAME", Text))
            .with_field(FieldMetadata::new(304, "CITY", Text))
            .with_field(FieldMetadata::new(305, "STATE", Text))
            .with_field(FieldMetadata::new(306, "BIRTH_DATE", Date))
            .with_field(FieldMetadata::new(307, "CREATED_AT", DateTime)),
        TableMetadata::new(4, 1, "REVIEWS")
            .with_field(FieldMetadata::new(400, "ID", Integer).primary_key())
            .with_field(FieldMetadata::new(401, "PRODUCT_ID", Integer).references(200))
            .with_field(FieldMetadata::new(402, "REVIEWER", Text))
            .with_field(FieldMetadata::new(403, "RATING", Integer))
            .with_field(FieldMetadata::new(404, "BODY", Text))
            .with_field(FieldMetadata::new(405, "CREATED_AT", DateTime)),
        TableMetadata::new(5, 2, "ACCOUNTS")
            .with_field(FieldMetadata::new(500, "ID", Integer).primary_key())
            .with_field(FieldMetadata::new(501, "CREATED_AT", DateTime)),
    ]
}
