#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use azrest_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{default_context, default_context_with_client};

#[cfg(feature = "documentdb")]
pub mod documentdb {
    pub use azrest_documentdb::*;
}

#[cfg(feature = "search")]
pub mod search {
    pub use azrest_search::*;
}

#[cfg(feature = "storage")]
pub mod storage {
    pub use azrest_storage::*;
}
