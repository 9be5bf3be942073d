use crate::constants::*;
use crate::{Config, Credential, IndexBatch, SearchQuery, SuggestQuery};
use azrest_core::response::{decode, ensure_status};
use azrest_core::utils::percent_encode_query;
use azrest_core::{Context, Error, Output, Result, ResultShape, StatusPolicy};
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Characters kept as is in an index name or a document key.
static SEGMENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn segment(v: &str) -> String {
    utf8_percent_encode(v, &SEGMENT_ENCODE_SET).to_string()
}

/// Azure Search client, authorized with an `api-key`.
#[derive(Debug, Clone)]
pub struct Search {
    ctx: Context,
    credential: Credential,
    endpoint: String,
}

impl Search {
    /// Create a client from a loaded [`Config`].
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        Ok(Self {
            ctx,
            credential: config.credential()?,
            endpoint: config.endpoint()?,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(&'static str, String)>,
        body: Option<Bytes>,
        expected: StatusCode,
    ) -> Result<Output<T>> {
        let mut uri = format!("{}{}", self.endpoint, path);
        for (i, (k, v)) in query
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain([(API_VERSION, SEARCH_VERSION)])
            .enumerate()
        {
            uri.push(if i == 0 { '?' } else { '&' });
            uri.push_str(k);
            uri.push('=');
            uri.push_str(&percent_encode_query(v));
        }

        let mut req = http::Request::builder()
            .method(method)
            .uri(uri)
            .header(ACCEPT, "application/json");
        if body.is_some() {
            req = req.header(CONTENT_TYPE, "application/json");
        }
        let mut req = req.body(body.unwrap_or_default())?;
        req.headers_mut().insert(API_KEY, {
            let mut value: HeaderValue = self.credential.api_key.parse()?;
            value.set_sensitive(true);
            value
        });

        debug!("sending search request: {} {}", req.method(), req.uri());
        let resp = self.ctx.http_send(req).await?;
        let resp = ensure_status(resp, expected, false, StatusPolicy::default()).await?;
        decode(resp, ResultShape::Json).await
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(&'static str, String)>,
        body: Option<Bytes>,
        expected: StatusCode,
    ) -> Result<T> {
        match self.send(method, path, query, body, expected).await? {
            Output::Value(v) => Ok(v),
            _ => Err(Error::unexpected("search returned an empty body")),
        }
    }

    /// Create an index from its definition.
    pub async fn create_index<S: Serialize>(&self, index: &S) -> Result<Value> {
        let body = serde_json::to_vec(index)?;
        self.json(
            Method::POST,
            "/indexes",
            Vec::new(),
            Some(body.into()),
            StatusCode::CREATED,
        )
        .await
    }

    /// Read an index definition.
    pub async fn get_index(&self, name: &str) -> Result<Value> {
        self.json(
            Method::GET,
            &format!("/indexes/{}", segment(name)),
            Vec::new(),
            None,
            StatusCode::OK,
        )
        .await
    }

    /// List the index definitions.
    pub async fn list_indexes(&self) -> Result<Value> {
        self.json(Method::GET, "/indexes", Vec::new(), None, StatusCode::OK)
            .await
    }

    /// Replace an index definition.
    pub async fn update_index<S: Serialize>(&self, name: &str, index: &S) -> Result<()> {
        let body = serde_json::to_vec(index)?;
        self.send::<Value>(
            Method::PUT,
            &format!("/indexes/{}", segment(name)),
            Vec::new(),
            Some(body.into()),
            StatusCode::NO_CONTENT,
        )
        .await?;
        Ok(())
    }

    /// Delete an index with all its documents.
    pub async fn delete_index(&self, name: &str) -> Result<()> {
        self.send::<Value>(
            Method::DELETE,
            &format!("/indexes/{}", segment(name)),
            Vec::new(),
            None,
            StatusCode::NO_CONTENT,
        )
        .await?;
        Ok(())
    }

    /// Upload, merge or delete a batch of documents.
    pub async fn process_documents<T: Serialize>(
        &self,
        index: &str,
        batch: &IndexBatch<T>,
    ) -> Result<Value> {
        let body = serde_json::to_vec(batch)?;
        self.json(
            Method::POST,
            &format!("/indexes/{}/docs/index", segment(index)),
            Vec::new(),
            Some(body.into()),
            StatusCode::OK,
        )
        .await
    }

    /// Read one document by key, all fields are returned when `select` is empty.
    pub async fn lookup_document<T: DeserializeOwned>(
        &self,
        index: &str,
        key: &str,
        select: &[&str],
    ) -> Result<T> {
        let mut query = Vec::new();
        if !select.is_empty() {
            query.push(("$select", select.join(",")));
        }
        self.json(
            Method::GET,
            &format!("/indexes/{}/docs/{}", segment(index), segment(key)),
            query,
            None,
            StatusCode::OK,
        )
        .await
    }

    /// Run a full text search.
    pub async fn search_documents<T: DeserializeOwned>(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> Result<T> {
        self.json(
            Method::GET,
            &format!("/indexes/{}/docs", segment(index)),
            query.query_pairs(),
            None,
            StatusCode::OK,
        )
        .await
    }

    /// Suggest completions of a partial input.
    pub async fn suggest_documents<T: DeserializeOwned>(
        &self,
        index: &str,
        query: &SuggestQuery,
    ) -> Result<T> {
        self.json(
            Method::GET,
            &format!("/indexes/{}/docs/suggest", segment(index)),
            query.query_pairs(),
            None,
            StatusCode::OK,
        )
        .await
    }
}
