//! Metadata provider module.
//!
//! This module provides the catalog of databases, tables and fields the join
//! step works against, and the async data-access abstraction pickers load from.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MetadataProvider                           │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  Async requests            │  Picker helpers (ext trait)  │  │
//! │  │  - list_databases()        │  - table_picker_items()      │  │
//! │  │  - list_tables()           │    (same-database filter)    │  │
//! │  │  - get_table()             │                              │  │
//! │  │  - recent_tables()         │                              │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!              │                                  │
//!              ▼                                  ▼
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │  StaticProvider          │      │  CachedProvider<P>           │
//! │  (in-memory Catalog)     │      │  (DashMap memoization)       │
//! └──────────────────────────┘      └──────────────────────────────┘
//! ```
//!
//! The synchronous `Catalog` is also what the query facade reads field and
//! foreign-key information from.

mod cache;
mod catalog;
mod provider;
pub mod sample;
mod types;

pub use cache::CachedProvider;
pub use catalog::{Catalog, CatalogError};
pub use provider::{
    MetadataError, MetadataProvider, MetadataProviderExt, MetadataResult, RecentItem,
    StaticProvider, TablePickerItems,
};
pub use types::*;
