use std::collections::BTreeMap;
use std::mem;
use std::str::FromStr;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters, kept in their encoded form.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    v.split('&')
                        .filter(|kv| !kv.is_empty())
                        .map(|kv| match kv.split_once('=') {
                            Some((k, v)) => (k.to_string(), v.to_string()),
                            None => (kv.to_string(), String::new()),
                        })
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let mut s = self.path;
                for (i, (k, v)) in self.query.iter().enumerate() {
                    s.push(if i == 0 { '?' } else { '&' });
                    s.push_str(k);
                    if !v.is_empty() {
                        s.push('=');
                        s.push_str(v);
                    }
                }

                Some(PathAndQuery::from_str(&s)?)
            };
            Uri::from_parts(uri_parts)
                .map_err(|e| Error::request_invalid("invalid uri parts").with_source(e))?
        };

        Ok(())
    }

    /// Get the first query value by name.
    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get header names with given prefix, one pair per value.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        self.headers
            .iter()
            .filter(|(k, _)| k.as_str().starts_with(prefix))
            .map(|(k, v)| Ok((k.as_str().to_lowercase(), v.to_str()?.to_string())))
            .collect()
    }

    /// Build the canonicalized headers block used by `SharedKeyLite`.
    ///
    /// Names are lowercased and sorted, every header starts with `\n`.
    /// A header with several values concatenates them as
    /// `v1-1v2-2...`, which is what the service expects.
    ///
    /// ```text
    /// [(X-Ms-Version, V), (x-ms-date, D)] => "\nx-ms-date:D\nx-ms-version:V"
    /// ```
    pub fn canonicalize_headers<K, V>(headers: impl IntoIterator<Item = (K, V)>) -> String
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (k, v) in headers {
            grouped
                .entry(k.as_ref().to_lowercase())
                .or_default()
                .push(v.as_ref().to_string());
        }

        let mut s = String::with_capacity(64);
        for (k, values) in grouped {
            s.push('\n');
            s.push_str(&k);
            s.push(':');
            if let [value] = values.as_slice() {
                s.push_str(value);
            } else {
                for (idx, value) in values.iter().enumerate() {
                    s.push_str(value);
                    s.push('-');
                    s.push_str(&(idx + 1).to_string());
                }
            }
        }

        s
    }
}
