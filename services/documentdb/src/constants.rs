// Headers used in documentdb services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_CONSISTENCY_LEVEL: &str = "x-ms-consistency-level";
pub const X_MS_SESSION_TOKEN: &str = "x-ms-session-token";
pub const X_MS_CONTINUATION: &str = "x-ms-continuation";
pub const X_MS_MAX_ITEM_COUNT: &str = "x-ms-max-item-count";
pub const X_MS_DOCUMENTDB_ISQUERY: &str = "x-ms-documentdb-isquery";
pub const X_MS_INDEXING_DIRECTIVE: &str = "x-ms-indexing-directive";
pub const SLUG: &str = "slug";

pub const DOCUMENTDB_VERSION: &str = "2014-08-21";
pub const CONTENT_TYPE_SQL: &str = "application/sql";

/// Key injected in front of a streamed query page.
pub const CONTINUATION_KEY: &str = "_continuation";

// Env values used in documentdb services.
pub const AZURE_DOCUMENTDB_ACCOUNT: &str = "AZURE_DOCUMENTDB_ACCOUNT";
pub const AZURE_DOCUMENTDB_MASTER_KEY: &str = "AZURE_DOCUMENTDB_MASTER_KEY";
pub const AZURE_DOCUMENTDB_ENDPOINT: &str = "AZURE_DOCUMENTDB_ENDPOINT";
pub const AZURE_DOCUMENTDB_CONSISTENCY_LEVEL: &str = "AZURE_DOCUMENTDB_CONSISTENCY_LEVEL";
