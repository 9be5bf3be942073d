use std::collections::VecDeque;
use std::env;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azrest_core::time::DateTime;
use azrest_core::{Body, Context, Error, ErrorKind, HttpSend, OsEnv, Result, StatusPolicy};
use azrest_documentdb::stream::stream_response;
use azrest_documentdb::{
    Attachment, Conditional, Config, ConsistencyLevel, DocumentDb, IndexDirective, QueryOptions,
    QueryResult, ResourceId,
};
use azrest_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;
use http::StatusCode;
use log::warn;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Records every request and answers with queued responses.
#[derive(Debug, Clone, Default)]
struct MockHttpSend {
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    responses: Arc<Mutex<VecDeque<http::Response<Bytes>>>>,
}

impl MockHttpSend {
    fn respond(&self, status: StatusCode, headers: &[(&str, &str)], body: &str) {
        let mut builder = http::Response::builder().status(status);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let resp = builder.body(Bytes::from(body.to_string())).unwrap();
        self.responses.lock().unwrap().push_back(resp);
    }

    fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests.lock().unwrap().drain(..).collect()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Body>> {
        self.requests.lock().unwrap().push(req);
        let resp = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::unexpected("no response queued"))?;
        let (parts, body) = resp.into_parts();
        Ok(http::Response::from_parts(parts, Body::from(body)))
    }
}

// base64("documentdb-master-key")
const MASTER_KEY: &str = "ZG9jdW1lbnRkYi1tYXN0ZXIta2V5";

fn test_time() -> DateTime {
    DateTime::from_str("2022-03-01T08:02:04Z").unwrap()
}

fn client(level: Option<ConsistencyLevel>) -> (MockHttpSend, DocumentDb) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mock = MockHttpSend::default();
    let ctx = Context::new().with_http_send(mock.clone());
    let config = Config {
        account: Some("acct".to_string()),
        master_key: Some(MASTER_KEY.to_string()),
        consistency_level: level,
        ..Default::default()
    };
    let db = DocumentDb::new(ctx, config).unwrap().with_time(test_time());
    (mock, db)
}

#[tokio::test]
async fn test_signed_headers() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(StatusCode::OK, &[], r#"{"id":"D1"}"#);

    let v = db.get_database("D1").await?;
    assert_eq!(v["id"], "D1");

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method(), http::Method::GET);
    assert_eq!(req.uri(), "https://acct.documents.azure.com/dbs/D1");
    assert_eq!(req.headers()["x-ms-date"], "Tue, 01 Mar 2022 08:02:04 GMT");
    assert_eq!(req.headers()["x-ms-version"], "2014-08-21");
    assert_eq!(req.headers()["accept"], "application/json");
    assert_eq!(
        req.headers()["authorization"],
        "type%3Dmaster%26ver%3D1.0%26sig%3Dt5czAMybQLLyAe52eVgmEs%2FCPG7Lm4odGIaHsRPJkjc%3D"
    );
    assert!(!req.headers().contains_key("x-ms-consistency-level"));
    assert!(!req.headers().contains_key("x-ms-session-token"));
    Ok(())
}

#[tokio::test]
async fn test_session_token_replayed_per_path() -> anyhow::Result<()> {
    let (mock, db) = client(Some(ConsistencyLevel::Session));
    mock.respond(StatusCode::OK, &[("x-ms-session-token", "T1")], "{}");
    mock.respond(StatusCode::OK, &[("x-ms-session-token", "T2")], "{}");
    mock.respond(StatusCode::OK, &[], "{}");

    db.get_database("D1").await?;
    db.get_database("D1").await?;
    db.get_database("D2").await?;

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 3);
    for req in &reqs {
        assert_eq!(req.headers()["x-ms-consistency-level"], "Session");
    }
    assert!(!reqs[0].headers().contains_key("x-ms-session-token"));
    assert_eq!(reqs[1].headers()["x-ms-session-token"], "T1");
    assert!(!reqs[2].headers().contains_key("x-ms-session-token"));

    assert_eq!(db.session_store().get("/dbs/D1").as_deref(), Some("T2"));
    assert_eq!(db.session_store().get("/dbs/D2"), None);
    Ok(())
}

#[tokio::test]
async fn test_session_not_recorded_for_empty_resource_id() -> anyhow::Result<()> {
    let (mock, db) = client(Some(ConsistencyLevel::Session));
    mock.respond(
        StatusCode::CREATED,
        &[("x-ms-session-token", "T1")],
        r#"{"id":"D1"}"#,
    );

    db.create_database("D1").await?;
    assert!(db.session_store().is_empty());

    let req = &mock.requests()[0];
    assert_eq!(req.method(), http::Method::POST);
    assert_eq!(req.uri().path(), "/dbs");
    assert_eq!(req.headers()["content-type"], "application/json");
    assert_eq!(req.body().as_ref(), br#"{"id":"D1"}"#);
    Ok(())
}

#[tokio::test]
async fn test_unexpected_status_carries_response() {
    let (mock, db) = client(None);
    mock.respond(
        StatusCode::NOT_FOUND,
        &[("x-ms-activity-id", "a1")],
        r#"{"code":"NotFound"}"#,
    );

    let err = db.get_database("D1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    let resp = err.response().unwrap();
    assert_eq!(resp.headers()["x-ms-activity-id"], "a1");
    assert_eq!(resp.body().as_ref(), br#"{"code":"NotFound"}"#);
}

#[tokio::test]
async fn test_not_modified_with_conditional_token() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(StatusCode::NOT_MODIFIED, &[], "");

    let doc: Option<Value> = db
        .get_document(
            "D1",
            "C1",
            "X",
            Some(Conditional::NoMatch("\"etag-1\"".to_string())),
        )
        .await?;
    assert!(doc.is_none());

    let req = &mock.requests()[0];
    assert_eq!(req.headers()["if-none-match"], "\"etag-1\"");
    assert_eq!(req.uri().path(), "/dbs/D1/colls/C1/docs/X");
    Ok(())
}

#[tokio::test]
async fn test_strict_policy_rejects_other_status() {
    let (mock, db) = client(None);
    let db = db.with_status_policy(StatusPolicy::Strict);
    mock.respond(StatusCode::PRECONDITION_FAILED, &[], "{}");

    let err = db
        .replace_document::<_, Value>(
            "D1",
            "C1",
            "X",
            &json!({"id": "X"}),
            None,
            Some(Conditional::Match("\"etag-1\"".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::PRECONDITION_FAILED));
    assert_eq!(mock.requests()[0].headers()["if-match"], "\"etag-1\"");
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Item {
    id: String,
    n: i64,
}

#[tokio::test]
async fn test_create_document_with_directive() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(StatusCode::CREATED, &[], r#"{"id":"a","n":1,"_rid":"x"}"#);

    let item = Item {
        id: "a".to_string(),
        n: 1,
    };
    let created: Item = db
        .create_document("D1", "C1", &item, Some(IndexDirective::Exclude))
        .await?;
    assert_eq!(created, item);

    let req = &mock.requests()[0];
    assert_eq!(req.uri().path(), "/dbs/D1/colls/C1/docs");
    assert_eq!(req.headers()["x-ms-indexing-directive"], "Exclude");
    assert_eq!(req.body().as_ref(), br#"{"id":"a","n":1}"#);
    Ok(())
}

#[tokio::test]
async fn test_query_documents() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(
        StatusCode::OK,
        &[("x-ms-continuation", "next-page")],
        r#"{"_rid":"r1","Documents":[{"id":"a","n":1},{"id":"b","n":2}],"_count":2}"#,
    );

    let options = QueryOptions::default()
        .with_page_size(2)
        .with_continuation("prev-page");
    let page: QueryResult<Item> = db
        .query_documents("D1", "C1", "SELECT * FROM c", &options)
        .await?;
    assert_eq!(page.documents.len(), 2);
    assert_eq!(page.documents[1].n, 2);
    assert_eq!(page.continuation.as_deref(), Some("next-page"));

    let req = &mock.requests()[0];
    assert_eq!(req.method(), http::Method::POST);
    assert_eq!(req.headers()["content-type"], "application/sql");
    assert_eq!(req.headers()["x-ms-documentdb-isquery"], "true");
    assert_eq!(req.headers()["x-ms-max-item-count"], "2");
    assert_eq!(req.headers()["x-ms-continuation"], "prev-page");
    assert_eq!(req.body().as_ref(), b"SELECT * FROM c");
    Ok(())
}

#[tokio::test]
async fn test_stream_query_page() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(
        StatusCode::OK,
        &[("x-ms-continuation", "tok")],
        r#"{"Documents":[{"id":"a"}],"_count":1}"#,
    );

    let resp = db
        .query_documents_raw("D1", "C1", "SELECT * FROM c", &QueryOptions::default())
        .await?;
    let mut out = Vec::new();
    stream_response(resp, &mut out).await?;
    assert_eq!(
        String::from_utf8(out)?,
        r#"{"_continuation":"tok","Documents":[{"id":"a"}],"_count":1}"#
    );
    Ok(())
}

#[tokio::test]
async fn test_attachment_requires_fields() {
    let (mock, db) = client(None);

    let err = db
        .create_attachment(
            "D1",
            "C1",
            "X",
            &Attachment::new("a1", "image/png", ""),
            Some("a.png"),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_create_attachment_sends_slug() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(StatusCode::CREATED, &[], r#"{"id":"a1"}"#);

    db.create_attachment(
        "D1",
        "C1",
        "X",
        &Attachment::new("a1", "image/png", "/media/a1"),
        Some("a.png"),
        None,
    )
    .await?;

    let req = &mock.requests()[0];
    assert_eq!(req.uri().path(), "/dbs/D1/colls/C1/docs/X/attachments");
    assert_eq!(req.headers()["slug"], "a.png");
    Ok(())
}

#[tokio::test]
async fn test_read_parsed_resource_id() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(StatusCode::OK, &[], r#"{"id":"A"}"#);

    let id = ResourceId::parse("dbs/D1/colls/C1/docs/X/attachments/A/")?;
    db.read(&id).await?;
    assert_eq!(
        mock.requests()[0].uri().path(),
        "/dbs/D1/colls/C1/docs/X/attachments/A"
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_discards_body() -> anyhow::Result<()> {
    let (mock, db) = client(None);
    mock.respond(StatusCode::NO_CONTENT, &[], "");
    db.delete_document("D1", "C1", "X").await?;
    assert_eq!(mock.requests()[0].method(), http::Method::DELETE);
    Ok(())
}

#[tokio::test]
async fn test_invalid_document_id_is_not_sent() {
    let (mock, db) = client(None);

    let err = db
        .get_document::<Value>("D1", "C1", "a/b", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    let err = db.delete_collection("D1", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(mock.requests().is_empty());
}

fn init_live() -> Option<DocumentDb> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("AZREST_DOCUMENTDB_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    Some(DocumentDb::new(ctx, config).expect("documentdb config must be set"))
}

#[tokio::test]
async fn test_live_list_databases() -> anyhow::Result<()> {
    let Some(db) = init_live() else {
        warn!("AZREST_DOCUMENTDB_TEST is not set, skipped");
        return Ok(());
    };

    let v = db.list_databases().await?;
    assert!(v.get("Databases").is_some());
    Ok(())
}
