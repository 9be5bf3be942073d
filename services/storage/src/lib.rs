//! Azure Blob Storage REST client
//!
//! Requests are signed with the account key using `SharedKeyLite`, and
//! [`SharedAccessSignature`] builds time-bounded urls that grant access to a
//! container or a blob without any further authentication.
//!
//! # Example
//!
//! ```rust,no_run
//! use azrest_core::{Context, OsEnv};
//! use azrest_http_send_reqwest::ReqwestHttpSend;
//! use azrest_storage::{BlobFile, BlobStorage, Config, SharedAccessSignature};
//!
//! #[tokio::main]
//! async fn main() -> azrest_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!     let storage = BlobStorage::new(ctx.clone(), Config::default().from_env(&ctx))?;
//!
//!     storage.create_container("reports").await?;
//!     let blob = BlobFile::new("hello")
//!         .with_file_name("hello.txt")
//!         .with_content_type("text/plain");
//!     storage.put_blob("reports", "hello.txt", blob).await?;
//!
//!     let url = storage.signed_url(&SharedAccessSignature::new("reports").with_blob("hello.txt"))?;
//!     println!("share {url}");
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;
mod connection_string;

mod credential;
pub use credential::Credential;

pub mod sign_request;

mod sas;
pub use sas::SharedAccessSignature;

mod client;
pub use client::{BlobFile, BlobStorage, Container, ContainerList, ContainerProperties};
