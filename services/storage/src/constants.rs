// Headers used in azure storage services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";
pub const X_MS_BLOB_CONTENT_DISPOSITION: &str = "x-ms-blob-content-disposition";

pub const STORAGE_VERSION: &str = "2014-02-14";
pub const BLOCK_BLOB: &str = "BlockBlob";

// Env values used in azure storage services.
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";
