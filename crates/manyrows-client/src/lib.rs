//! Blocking client and data models for the ManyRows entity API.
//!
//! This crate exposes strongly typed request and response structures and a
//! synchronous HTTP client for querying, creating, updating and deleting
//! entities and collection items in ManyRows projects.
//!
//! ```no_run
//! use manyrows_client::{GetOneRequest, ManyRowsClient, QueryRequest};
//!
//! # fn main() -> manyrows_client::Result<()> {
//! let client = ManyRowsClient::builder("https://api.manyrows.com", "my-api-key")?
//!     .with_accept_gzip()
//!     .build()?;
//!
//! let page = client.query("acme", "customers", &QueryRequest::new().with_page(0, 25))?;
//! for entity in &page.items {
//!     let full = client.get_one("acme", "customers", &GetOneRequest::new(entity.id))?;
//!     println!("{} {:?}", full.id, full.attribute_str("name"));
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod transport;

pub use client::{ManyRowsClient, ManyRowsClientBuilder, ResolvedOptions};
pub use manyrows_core::uuid::{
    CollectionItemUuid, CollectionUuid, EntityUuid, ProjectUuid, RelationDefUuid,
};
pub use manyrows_core::{Error, ErrorInfo, ManyRowsConfig, PageRequest, PageResource};
pub use models::{
    Attributes, CreateCollectionItemRequest, CreateEntityRequest, CreateEntityResponse,
    DeleteCollectionItemsRequest, DeleteOneRequest, DeleteProjectRequest, DeleteRequest, Entity,
    Filter, GetOneRequest, MoveCollectionItemRequest, QueryRequest, QueryResponse, RelFilter,
    RequestOptions, UpdateRequest,
};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};

/// Convenient result alias matching the shared ManyRows error type.
pub type Result<T> = manyrows_core::Result<T>;
