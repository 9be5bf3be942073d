//! Reqwest-based transport for azrest.
//!
//! `ReqwestHttpSend` implements [`HttpSend`] with a [`reqwest::Client`]. The
//! response body is exposed as a stream so callers can pass large responses
//! through without buffering them.
//!
//! ## Example
//!
//! ```no_run
//! use azrest_core::{Context, OsEnv};
//! use azrest_http_send_reqwest::ReqwestHttpSend;
//!
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//! ```

use async_trait::async_trait;
use azrest_core::{Body, Error, HttpSend, Result};
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::{Client, Request};

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Body>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::unexpected("failed to send request").with_source(e))?;

        let mut builder = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(resp.headers().clone());
        }

        let stream = resp
            .bytes_stream()
            .map_err(|e| Error::unexpected("failed to read response body").with_source(e));

        Ok(builder.body(Body::from_stream(stream))?)
    }
}
