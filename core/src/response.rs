//! Response validation and decoding shared by every client.

use crate::{Body, Error, Result};
use http::StatusCode;
use log::warn;
use serde::de::DeserializeOwned;

/// ResultShape tells a client how the caller wants the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Return the response untouched, body unread.
    Raw,
    /// Decode a non-empty JSON body into the requested type.
    ///
    /// The type may be concrete (`serde_json::Value`, `Database`) or generic
    /// (`QueryResult<MyDoc>`); an empty body yields [`Output::Empty`].
    Json,
    /// Drain the body and return [`Output::Empty`].
    Discard,
}

/// Output is the result of an operation, shaped by [`ResultShape`].
#[derive(Debug)]
pub enum Output<T> {
    /// The raw response, returned for [`ResultShape::Raw`].
    Raw(http::Response<Body>),
    /// The decoded body.
    Value(T),
    /// The response carried no body, or the body was discarded.
    Empty,
}

impl<T> Output<T> {
    /// Take the decoded value.
    pub fn into_value(self) -> Option<T> {
        match self {
            Output::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Take the raw response.
    pub fn into_raw(self) -> Option<http::Response<Body>> {
        match self {
            Output::Raw(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if no body was returned.
    pub fn is_empty(&self) -> bool {
        matches!(self, Output::Empty)
    }
}

/// StatusPolicy decides how a conditional request relaxes status validation.
///
/// Without a conditional token the actual status must always equal the
/// expected one; the policy only matters when `If-Match` or `If-None-Match`
/// was sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Accept any status once a conditional token was sent.
    #[default]
    Permissive,
    /// Accept the expected status or `304 Not Modified` only.
    Strict,
}

/// Check `actual` against `expected`.
pub fn status_accepted(
    expected: StatusCode,
    actual: StatusCode,
    conditional: bool,
    policy: StatusPolicy,
) -> bool {
    if actual == expected {
        return true;
    }
    if !conditional {
        return false;
    }

    match policy {
        StatusPolicy::Permissive => true,
        StatusPolicy::Strict => actual == StatusCode::NOT_MODIFIED,
    }
}

/// Validate the response status, buffering the body into the error on failure.
pub async fn ensure_status(
    resp: http::Response<Body>,
    expected: StatusCode,
    conditional: bool,
    policy: StatusPolicy,
) -> Result<http::Response<Body>> {
    if status_accepted(expected, resp.status(), conditional, policy) {
        return Ok(resp);
    }

    let (parts, body) = resp.into_parts();
    // The status error is what matters, a broken error body must not hide it.
    let body = body.bytes().await.unwrap_or_default();
    warn!(
        "expected status {} but got {}: {}",
        expected,
        parts.status,
        String::from_utf8_lossy(&body)
    );

    Err(Error::unexpected_status(http::Response::from_parts(
        parts, body,
    )))
}

/// Decode the response according to `shape`.
pub async fn decode<T: DeserializeOwned>(
    resp: http::Response<Body>,
    shape: ResultShape,
) -> Result<Output<T>> {
    match shape {
        ResultShape::Raw => Ok(Output::Raw(resp)),
        ResultShape::Json => {
            let bs = resp.into_body().bytes().await?;
            if bs.is_empty() {
                return Ok(Output::Empty);
            }
            Ok(Output::Value(serde_json::from_slice(&bs)?))
        }
        ResultShape::Discard => {
            resp.into_body().bytes().await?;
            Ok(Output::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use test_case::test_case;

    #[test_case(StatusCode::OK, false, StatusPolicy::Permissive, true; "exact match")]
    #[test_case(StatusCode::NOT_FOUND, false, StatusPolicy::Permissive, false; "mismatch without token")]
    #[test_case(StatusCode::NOT_MODIFIED, false, StatusPolicy::Permissive, false; "not modified without token")]
    #[test_case(StatusCode::NOT_MODIFIED, true, StatusPolicy::Permissive, true; "not modified with token")]
    #[test_case(StatusCode::PRECONDITION_FAILED, true, StatusPolicy::Permissive, true; "permissive accepts any with token")]
    #[test_case(StatusCode::NOT_MODIFIED, true, StatusPolicy::Strict, true; "strict accepts not modified")]
    #[test_case(StatusCode::PRECONDITION_FAILED, true, StatusPolicy::Strict, false; "strict rejects others")]
    fn test_status_accepted(
        actual: StatusCode,
        conditional: bool,
        policy: StatusPolicy,
        accepted: bool,
    ) {
        assert_eq!(
            status_accepted(StatusCode::OK, actual, conditional, policy),
            accepted
        );
    }

    #[tokio::test]
    async fn test_ensure_status_carries_response() {
        let resp = http::Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .body(Body::from("{\"code\":\"BadRequest\"}"))
            .unwrap();

        let err = ensure_status(resp, StatusCode::OK, false, StatusPolicy::Permissive)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        let resp = err.response().expect("response must be attached");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.body().as_ref(), b"{\"code\":\"BadRequest\"}");
    }

    #[tokio::test]
    async fn test_decode_shapes() {
        let resp = || {
            http::Response::builder()
                .body(Body::from("{\"id\":\"a\"}"))
                .unwrap()
        };

        let out: Output<serde_json::Value> = decode(resp(), ResultShape::Json).await.unwrap();
        assert_eq!(out.into_value().unwrap()["id"], "a");

        let out: Output<serde_json::Value> = decode(resp(), ResultShape::Raw).await.unwrap();
        assert!(out.into_raw().is_some());

        let out: Output<serde_json::Value> =
            decode(resp(), ResultShape::Discard).await.unwrap();
        assert!(out.is_empty());

        let empty = http::Response::builder().body(Body::empty()).unwrap();
        let out: Output<serde_json::Value> = decode(empty, ResultShape::Json).await.unwrap();
        assert!(out.is_empty());
    }
}
