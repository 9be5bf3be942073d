// Headers and query parameters used in search services.
pub const API_KEY: &str = "api-key";
pub const API_VERSION: &str = "api-version";

pub const SEARCH_VERSION: &str = "2014-07-31-Preview";

// Env values used in search services.
pub const AZURE_SEARCH_SERVICE: &str = "AZURE_SEARCH_SERVICE";
pub const AZURE_SEARCH_API_KEY: &str = "AZURE_SEARCH_API_KEY";
pub const AZURE_SEARCH_ENDPOINT: &str = "AZURE_SEARCH_ENDPOINT";
