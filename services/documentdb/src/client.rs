use crate::constants::*;
use crate::operation::{index_directive, slug};
use crate::sign_request::authorization;
use crate::{
    Attachment, Conditional, Config, ConsistencyLevel, Credential, IndexDirective, Operation,
    QueryOptions, QueryResult, ResourceId, SessionStore,
};
use azrest_core::response::{decode, ensure_status};
use azrest_core::time::{format_http_date, now, DateTime};
use azrest_core::{Body, Context, Error, Output, Result, ResultShape, StatusPolicy};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Characters escaped when a resource path is put into a request uri.
static PATH_ENCODE_SET: AsciiSet = CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// DocumentDB client.
///
/// Every call is signed with the master key. When the consistency level is
/// [`ConsistencyLevel::Session`] the client replays the last session token
/// seen for the request path.
///
/// Clones share the session store.
#[derive(Debug, Clone)]
pub struct DocumentDb {
    ctx: Context,
    credential: Credential,
    endpoint: String,
    consistency_level: Option<ConsistencyLevel>,
    session: Arc<SessionStore>,
    status_policy: StatusPolicy,
    time: Option<DateTime>,
}

impl DocumentDb {
    /// Create a client from a loaded [`Config`].
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let credential = config.credential()?;
        let endpoint = config.endpoint(&credential.account);

        Ok(Self {
            ctx,
            credential,
            endpoint,
            consistency_level: config.consistency_level,
            session: Arc::new(SessionStore::default()),
            status_policy: StatusPolicy::default(),
            time: None,
        })
    }

    /// Set how a conditional request relaxes status validation.
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Use a shared session store.
    pub fn with_session_store(mut self, store: Arc<SessionStore>) -> Self {
        self.session = store;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// The session store used by this client.
    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Sign and send `op`, validate the status and shape the body.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        op: Operation<'_>,
        shape: ResultShape,
    ) -> Result<Output<T>> {
        let Operation {
            method,
            path,
            resource_type,
            resource_id,
            expected,
            conditional,
            content_type,
            body,
            on_request,
            on_response,
        } = op;

        let date = format_http_date(self.time.unwrap_or_else(now));

        let mut headers = HeaderMap::new();
        headers.insert(X_MS_DATE, date.parse()?);
        headers.insert(X_MS_VERSION, HeaderValue::from_static(DOCUMENTDB_VERSION));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(conditional) = &conditional {
            let (name, etag) = conditional.header();
            headers.insert(name, etag.parse()?);
        }
        headers.insert(AUTHORIZATION, {
            let token = authorization(
                &self.credential,
                &method,
                &resource_type,
                &resource_id,
                &date,
            )?;
            let mut value: HeaderValue = token.parse()?;
            value.set_sensitive(true);
            value
        });
        if let Some(level) = self.consistency_level {
            headers.insert(
                X_MS_CONSISTENCY_LEVEL,
                HeaderValue::from_static(level.as_str()),
            );
            if level == ConsistencyLevel::Session {
                if let Some(token) = self.session.get(&path) {
                    headers.insert(X_MS_SESSION_TOKEN, token.parse()?);
                }
            }
        }
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, content_type);
        }
        if let Some(f) = on_request {
            f(&mut headers)?;
        }

        let uri = format!(
            "{}{}",
            self.endpoint,
            utf8_percent_encode(&path, &PATH_ENCODE_SET)
        );
        let mut req = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(body)?;
        *req.headers_mut() = headers;

        debug!("sending documentdb request: {} {}", req.method(), req.uri());
        let resp = self.ctx.http_send(req).await?;
        let resp = ensure_status(resp, expected, conditional.is_some(), self.status_policy).await?;

        if let Some(f) = on_response {
            f(resp.headers());
        }

        if !resource_id.is_empty() {
            let token = resp
                .headers()
                .get(X_MS_SESSION_TOKEN)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());
            self.session.put(&path, token);
        }

        decode(resp, shape).await
    }

    async fn json<T: DeserializeOwned>(&self, op: Operation<'_>) -> Result<T> {
        match self.execute(op, ResultShape::Json).await? {
            Output::Value(v) => Ok(v),
            _ => Err(Error::unexpected("documentdb returned an empty body")),
        }
    }

    async fn discard(&self, op: Operation<'_>) -> Result<()> {
        self.execute::<Value>(op, ResultShape::Discard).await?;
        Ok(())
    }

    /// Read any resource by its parsed id.
    pub async fn read(&self, id: &ResourceId) -> Result<Value> {
        self.json(Operation::item(Method::GET, id)).await
    }

    /// Create a database.
    pub async fn create_database(&self, id: &str) -> Result<Value> {
        let op = Operation::new(Method::POST, "/dbs", "dbs", "")
            .with_expected(StatusCode::CREATED)
            .with_json(&json!({ "id": id }))?;
        self.json(op).await
    }

    /// Get a database.
    pub async fn get_database(&self, db: &str) -> Result<Value> {
        self.read(&ResourceId::database(db)?).await
    }

    /// List all databases.
    pub async fn list_databases(&self) -> Result<Value> {
        self.json(Operation::new(Method::GET, "/dbs", "dbs", ""))
            .await
    }

    /// Delete a database.
    pub async fn delete_database(&self, db: &str) -> Result<()> {
        let op = Operation::item(Method::DELETE, &ResourceId::database(db)?)
            .with_expected(StatusCode::NO_CONTENT);
        self.discard(op).await
    }

    /// Create a collection, optionally with an indexing policy.
    pub async fn create_collection(
        &self,
        db: &str,
        id: &str,
        indexing_policy: Option<&Value>,
    ) -> Result<Value> {
        let mut body = json!({ "id": id });
        if let Some(policy) = indexing_policy {
            body["IndexingPolicy"] = policy.clone();
        }
        let op = Operation::feed(Method::POST, &ResourceId::database(db)?, "colls")
            .with_expected(StatusCode::CREATED)
            .with_json(&body)?;
        self.json(op).await
    }

    /// Get a collection.
    pub async fn get_collection(&self, db: &str, coll: &str) -> Result<Value> {
        self.read(&ResourceId::database(db)?.collection(coll)?).await
    }

    /// List the collections of a database.
    pub async fn list_collections(&self, db: &str) -> Result<Value> {
        self.json(Operation::feed(
            Method::GET,
            &ResourceId::database(db)?,
            "colls",
        ))
        .await
    }

    /// Delete a collection.
    pub async fn delete_collection(&self, db: &str, coll: &str) -> Result<()> {
        let op = Operation::item(Method::DELETE, &ResourceId::database(db)?.collection(coll)?)
            .with_expected(StatusCode::NO_CONTENT);
        self.discard(op).await
    }

    /// Create a document.
    pub async fn create_document<S, R>(
        &self,
        db: &str,
        coll: &str,
        document: &S,
        directive: Option<IndexDirective>,
    ) -> Result<R>
    where
        S: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let op = Operation::feed(
            Method::POST,
            &ResourceId::database(db)?.collection(coll)?,
            "docs",
        )
        .with_expected(StatusCode::CREATED)
        .with_json(document)?
        .on_request(index_directive(directive));
        self.json(op).await
    }

    /// List the documents of a collection.
    pub async fn list_documents<R: DeserializeOwned>(&self, db: &str, coll: &str) -> Result<R> {
        self.json(Operation::feed(
            Method::GET,
            &ResourceId::database(db)?.collection(coll)?,
            "docs",
        ))
        .await
    }

    /// Get a document.
    ///
    /// Returns `None` when the service answers without a body, which is the
    /// case for `304 Not Modified` on an `If-None-Match` read.
    pub async fn get_document<R: DeserializeOwned>(
        &self,
        db: &str,
        coll: &str,
        doc: &str,
        conditional: Option<Conditional>,
    ) -> Result<Option<R>> {
        let id = ResourceId::database(db)?.collection(coll)?.document(doc)?;
        let op = Operation::item(Method::GET, &id).with_conditional(conditional);
        Ok(self.execute(op, ResultShape::Json).await?.into_value())
    }

    /// Replace a document, `If-Match` protects against lost updates.
    pub async fn replace_document<S, R>(
        &self,
        db: &str,
        coll: &str,
        doc: &str,
        document: &S,
        directive: Option<IndexDirective>,
        conditional: Option<Conditional>,
    ) -> Result<R>
    where
        S: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let id = ResourceId::database(db)?.collection(coll)?.document(doc)?;
        let op = Operation::item(Method::PUT, &id)
            .with_conditional(conditional)
            .with_json(document)?
            .on_request(index_directive(directive));
        self.json(op).await
    }

    /// Delete a document.
    pub async fn delete_document(&self, db: &str, coll: &str, doc: &str) -> Result<()> {
        let id = ResourceId::database(db)?.collection(coll)?.document(doc)?;
        let op = Operation::item(Method::DELETE, &id).with_expected(StatusCode::NO_CONTENT);
        self.discard(op).await
    }

    /// Run a SQL query and decode one page.
    ///
    /// The continuation of the page is taken from the response headers.
    pub async fn query_documents<R: DeserializeOwned>(
        &self,
        db: &str,
        coll: &str,
        query: &str,
        options: &QueryOptions,
    ) -> Result<QueryResult<R>> {
        let mut continuation = None;
        let op = self
            .query_operation(db, coll, query, options)?
            .on_response(|headers| {
                continuation = headers
                    .get(X_MS_CONTINUATION)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.to_string());
            });

        let mut page: QueryResult<R> = self.json(op).await?;
        page.continuation = continuation;
        Ok(page)
    }

    /// Run a SQL query and return the unread response.
    ///
    /// Pair it with [`crate::stream::stream_response`] to pass a page through
    /// without buffering it.
    pub async fn query_documents_raw(
        &self,
        db: &str,
        coll: &str,
        query: &str,
        options: &QueryOptions,
    ) -> Result<http::Response<Body>> {
        let op = self.query_operation(db, coll, query, options)?;
        match self.execute::<Value>(op, ResultShape::Raw).await? {
            Output::Raw(resp) => Ok(resp),
            _ => Err(Error::unexpected("raw response expected")),
        }
    }

    fn query_operation<'a>(
        &self,
        db: &str,
        coll: &str,
        query: &str,
        options: &'a QueryOptions,
    ) -> Result<Operation<'a>> {
        let op = Operation::feed(
            Method::POST,
            &ResourceId::database(db)?.collection(coll)?,
            "docs",
        )
        .with_body(CONTENT_TYPE_SQL, query.to_string())
        .on_request(move |headers| options.apply(headers));
        Ok(op)
    }

    /// Create an attachment, `file_name` is sent as `Slug`.
    pub async fn create_attachment(
        &self,
        db: &str,
        coll: &str,
        doc: &str,
        attachment: &Attachment,
        file_name: Option<&str>,
        directive: Option<IndexDirective>,
    ) -> Result<Value> {
        attachment.check()?;
        let parent = ResourceId::database(db)?.collection(coll)?.document(doc)?;
        let op = Operation::feed(Method::POST, &parent, "attachments")
            .with_expected(StatusCode::CREATED)
            .with_json(attachment)?
            .on_request(slug(file_name.map(|v| v.to_string()), directive));
        self.json(op).await
    }

    /// List the attachments of a document.
    pub async fn list_attachments(&self, db: &str, coll: &str, doc: &str) -> Result<Value> {
        let parent = ResourceId::database(db)?.collection(coll)?.document(doc)?;
        self.json(Operation::feed(Method::GET, &parent, "attachments"))
            .await
    }

    /// Get an attachment.
    pub async fn get_attachment(
        &self,
        db: &str,
        coll: &str,
        doc: &str,
        att: &str,
    ) -> Result<Value> {
        self.read(
            &ResourceId::database(db)?
                .collection(coll)?
                .document(doc)?
                .attachment(att)?,
        )
        .await
    }

    /// Replace an attachment.
    #[allow(clippy::too_many_arguments)]
    pub async fn replace_attachment(
        &self,
        db: &str,
        coll: &str,
        doc: &str,
        att: &str,
        attachment: &Attachment,
        file_name: Option<&str>,
        directive: Option<IndexDirective>,
    ) -> Result<Value> {
        attachment.check()?;
        let id = ResourceId::database(db)?
            .collection(coll)?
            .document(doc)?
            .attachment(att)?;
        let op = Operation::item(Method::PUT, &id)
            .with_json(attachment)?
            .on_request(slug(file_name.map(|v| v.to_string()), directive));
        self.json(op).await
    }

    /// Delete an attachment.
    pub async fn delete_attachment(
        &self,
        db: &str,
        coll: &str,
        doc: &str,
        att: &str,
    ) -> Result<()> {
        let id = ResourceId::database(db)?
            .collection(coll)?
            .document(doc)?
            .attachment(att)?;
        let op = Operation::item(Method::DELETE, &id).with_expected(StatusCode::NO_CONTENT);
        self.discard(op).await
    }
}
