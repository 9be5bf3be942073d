use crate::{Conditional, IndexDirective, ResourceId};
use crate::constants::*;
use azrest_core::Result;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::Serialize;

/// Callback that adds command specific headers before the request is sent.
pub type RequestDecorator<'a> = Box<dyn FnOnce(&mut HeaderMap) -> Result<()> + Send + 'a>;

/// Callback that inspects response headers before the body is consumed.
pub type ResponseDecorator<'a> = Box<dyn FnOnce(&HeaderMap) + Send + 'a>;

/// Operation describes one call against a DocumentDB resource.
///
/// `resource_type` and `resource_id` feed the signature, `path` is the
/// request path and the session store key.
pub struct Operation<'a> {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) resource_type: String,
    pub(crate) resource_id: String,
    pub(crate) expected: StatusCode,
    pub(crate) conditional: Option<Conditional>,
    pub(crate) content_type: Option<HeaderValue>,
    pub(crate) body: Bytes,
    pub(crate) on_request: Option<RequestDecorator<'a>>,
    pub(crate) on_response: Option<ResponseDecorator<'a>>,
}

impl<'a> Operation<'a> {
    /// Create an operation expecting `200 OK` and carrying no body.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            expected: StatusCode::OK,
            conditional: None,
            content_type: None,
            body: Bytes::new(),
            on_request: None,
            on_response: None,
        }
    }

    /// Create an operation addressing the item identified by `id`.
    pub fn item(method: Method, id: &ResourceId) -> Self {
        let (resource_type, resource_id) = id.signing_parts();
        Self::new(method, id.path(), resource_type, resource_id)
    }

    /// Create an operation on the `feed` (for example `docs`) under `parent`.
    ///
    /// Listing the databases uses [`Operation::new`] with an empty resource id.
    pub fn feed(method: Method, parent: &ResourceId, feed: &'static str) -> Self {
        let (_, parent_id) = parent.signing_parts();
        Self::new(
            method,
            format!("{}/{}", parent.path(), feed),
            feed,
            parent_id,
        )
    }

    /// Set the expected status code.
    pub fn with_expected(mut self, status: StatusCode) -> Self {
        self.expected = status;
        self
    }

    /// Send a conditional token.
    pub fn with_conditional(mut self, conditional: Option<Conditional>) -> Self {
        self.conditional = conditional;
        self
    }

    /// Send a raw body with the given content type.
    pub fn with_body(mut self, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        self.content_type = Some(HeaderValue::from_static(content_type));
        self.body = body.into();
        self
    }

    /// Send `value` serialized as JSON.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.with_body("application/json", body))
    }

    /// Run `f` on the request headers after the standard ones are set.
    pub fn on_request(
        mut self,
        f: impl FnOnce(&mut HeaderMap) -> Result<()> + Send + 'a,
    ) -> Self {
        self.on_request = Some(Box::new(f));
        self
    }

    /// Run `f` on the response headers once the status is validated.
    pub fn on_response(mut self, f: impl FnOnce(&HeaderMap) + Send + 'a) -> Self {
        self.on_response = Some(Box::new(f));
        self
    }
}

/// Request decorator setting `x-ms-indexing-directive` when a directive is given.
pub fn index_directive(directive: Option<IndexDirective>) -> impl FnOnce(&mut HeaderMap) -> Result<()> + Send {
    move |headers: &mut HeaderMap| {
        if let Some(directive) = directive {
            headers.insert(
                X_MS_INDEXING_DIRECTIVE,
                HeaderValue::from_static(directive.as_str()),
            );
        }
        Ok(())
    }
}

/// Request decorator for attachments: `Slug` carries the file name.
pub fn slug(
    file_name: Option<String>,
    directive: Option<IndexDirective>,
) -> impl FnOnce(&mut HeaderMap) -> Result<()> + Send {
    move |headers: &mut HeaderMap| {
        if let Some(name) = file_name {
            headers.insert(SLUG, name.parse()?);
        }
        index_directive(directive)(headers)
    }
}

/// Paging options of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Maximum number of documents per page.
    pub page_size: Option<u32>,
    /// Continuation token returned by the previous page.
    pub continuation: Option<String>,
}

impl QueryOptions {
    /// Set the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Continue from a previous page.
    pub fn with_continuation(mut self, continuation: impl Into<String>) -> Self {
        self.continuation = Some(continuation.into());
        self
    }

    /// Add the query headers: query flag, page size and continuation.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(X_MS_DOCUMENTDB_ISQUERY, HeaderValue::from_static("true"));
        if let Some(size) = self.page_size.filter(|v| *v > 0) {
            headers.insert(X_MS_MAX_ITEM_COUNT, HeaderValue::from(size));
        }
        if let Some(token) = self.continuation.as_deref().filter(|v| !v.is_empty()) {
            headers.insert(X_MS_CONTINUATION, token.parse()?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_feed_and_item() {
        let coll = ResourceId::database("D1").unwrap().collection("C1").unwrap();
        let op = Operation::feed(Method::POST, &coll, "docs");
        assert_eq!(op.path, "/dbs/D1/colls/C1/docs");
        assert_eq!(op.resource_type, "docs");
        assert_eq!(op.resource_id, "C1");

        let op = Operation::item(Method::GET, &coll.document("X").unwrap());
        assert_eq!(op.path, "/dbs/D1/colls/C1/docs/X");
        assert_eq!(op.resource_type, "docs");
        assert_eq!(op.resource_id, "X");
        assert_eq!(op.expected, StatusCode::OK);
    }

    #[test]
    fn test_query_options_apply() {
        let mut headers = HeaderMap::new();
        QueryOptions::default()
            .with_page_size(10)
            .with_continuation("+RID:abc")
            .apply(&mut headers)
            .unwrap();
        assert_eq!(headers[X_MS_DOCUMENTDB_ISQUERY], "true");
        assert_eq!(headers[X_MS_MAX_ITEM_COUNT], "10");
        assert_eq!(headers[X_MS_CONTINUATION], "+RID:abc");

        let mut headers = HeaderMap::new();
        QueryOptions::default().apply(&mut headers).unwrap();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_slug_and_directive() {
        let mut headers = HeaderMap::new();
        slug(Some("report.pdf".to_string()), Some(IndexDirective::Exclude))(&mut headers).unwrap();
        assert_eq!(headers[SLUG], "report.pdf");
        assert_eq!(headers[X_MS_INDEXING_DIRECTIVE], "Exclude");

        let mut headers = HeaderMap::new();
        index_directive(None)(&mut headers).unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_with_json() {
        let op = Operation::new(Method::POST, "/dbs", "dbs", "")
            .with_json(&serde_json::json!({"id": "D1"}))
            .unwrap();
        assert_eq!(op.content_type.unwrap(), "application/json");
        assert_eq!(op.body.as_ref(), br#"{"id":"D1"}"#);
    }
}
