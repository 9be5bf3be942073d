use crate::Result;
use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use std::fmt::{Debug, Formatter};
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

/// HttpSend is used to send the signed request to the service.
///
/// Implementations own the transport (connection pooling, TLS, timeouts).
/// azrest never retries: every error returned here is handed back to the
/// caller unchanged.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response with a streaming body.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Body>>;
}

/// Body is the response body returned by [`HttpSend`].
///
/// It is either fully buffered or a stream of chunks that is consumed lazily,
/// so a response can be passed through without holding all of it in memory.
pub struct Body {
    inner: Inner,
}

enum Inner {
    Empty,
    Full(Bytes),
    Stream(BoxStream<'static, Result<Bytes>>),
}

impl Body {
    /// Create an empty body.
    pub fn empty() -> Self {
        Self {
            inner: Inner::Empty,
        }
    }

    /// Create a body from a stream of chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: Inner::Stream(stream.boxed()),
        }
    }

    /// Read the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        match self.inner {
            Inner::Empty => Ok(Bytes::new()),
            Inner::Full(bs) => Ok(bs),
            Inner::Stream(mut s) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = s.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Inner::Empty => f.write_str("Body::Empty"),
            Inner::Full(bs) => write!(f, "Body::Full({} bytes)", bs.len()),
            Inner::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bs: Bytes) -> Self {
        Self {
            inner: Inner::Full(bs),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bs: Vec<u8>) -> Self {
        Bytes::from(bs).into()
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Bytes::from(s).into()
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Bytes::from_static(s.as_bytes()).into()
    }
}

impl Stream for Body {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match &mut this.inner {
            Inner::Empty => Poll::Ready(None),
            Inner::Full(bs) => {
                let bs = std::mem::take(bs);
                this.inner = Inner::Empty;
                if bs.is_empty() {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(bs)))
                }
            }
            Inner::Stream(s) => s.as_mut().poll_next(cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn test_body_collects_stream() {
        let body = Body::from_stream(stream::iter(vec![
            Ok(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ]));
        assert_eq!(body.bytes().await.unwrap().as_ref(), b"hello world");
    }

    #[tokio::test]
    async fn test_full_body_yields_once() {
        let mut body = Body::from("abc");
        assert_eq!(body.next().await.unwrap().unwrap().as_ref(), b"abc");
        assert!(body.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_error_is_returned() {
        let body = Body::from_stream(stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(crate::Error::unexpected("connection reset")),
        ]));
        assert!(body.bytes().await.is_err());
    }
}
