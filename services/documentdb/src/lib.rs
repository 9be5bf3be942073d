//! Azure DocumentDB REST client
//!
//! Requests are signed with the account master key using the resource
//! scheme (`type=master&ver=1.0&sig=...`). With
//! [`ConsistencyLevel::Session`] the client replays the session token seen
//! for each request path, and [`stream`] passes query pages through without
//! buffering them.
//!
//! # Example
//!
//! ```rust,no_run
//! use azrest_core::{Context, OsEnv};
//! use azrest_documentdb::{Config, DocumentDb, QueryOptions, QueryResult};
//! use azrest_http_send_reqwest::ReqwestHttpSend;
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> azrest_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!     let db = DocumentDb::new(ctx.clone(), Config::default().from_env(&ctx))?;
//!
//!     let page: QueryResult<Value> = db
//!         .query_documents("db", "coll", "SELECT * FROM c", &QueryOptions::default())
//!         .await?;
//!     println!("{} documents, more: {}", page.documents.len(), page.has_more());
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod resource;
pub use resource::{Conditional, ConsistencyLevel, IndexDirective, ResourceId};

mod session;
pub use session::SessionStore;

pub mod sign_request;

mod operation;
pub use operation::{
    index_directive, slug, Operation, QueryOptions, RequestDecorator, ResponseDecorator,
};

mod query;
pub use query::{Attachment, QueryResult};

mod client;
pub use client::DocumentDb;

pub mod stream;
