use azrest_core::{Context, OsEnv};
use azrest_http_send_reqwest::ReqwestHttpSend;
use reqwest::Client;

/// Context sending requests with a default [`reqwest::Client`] and reading
/// the process environment.
pub fn default_context() -> Context {
    default_context_with_client(Client::new())
}

/// Same as [`default_context`] with a caller configured client.
pub fn default_context_with_client(client: Client) -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::new(client))
        .with_env(OsEnv)
}
