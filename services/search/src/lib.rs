//! Azure Search REST client
//!
//! Every request carries the service `api-key` and the `api-version` query
//! parameter. [`SearchQuery`] and [`SuggestQuery`] only send the parameters
//! that were set.
//!
//! # Example
//!
//! ```rust,no_run
//! use azrest_core::{Context, OsEnv};
//! use azrest_http_send_reqwest::ReqwestHttpSend;
//! use azrest_search::{Config, Search, SearchMode, SearchQuery};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> azrest_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!     let search = Search::new(ctx.clone(), Config::default().from_env(&ctx))?;
//!
//!     let query = SearchQuery::new("budget hotel")
//!         .with_search_mode(SearchMode::All)
//!         .with_top(10);
//!     let hits: Value = search.search_documents("hotels", &query).await?;
//!     println!("{hits}");
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod query;
pub use query::{IndexAction, IndexBatch, SearchMode, SearchQuery, SuggestQuery};

mod client;
pub use client::Search;
