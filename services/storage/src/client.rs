use crate::constants::*;
use crate::sign_request::sign_parts;
use crate::{Config, Credential, SharedAccessSignature};
use azrest_core::response::ensure_status;
use azrest_core::time::{now, DateTime};
use azrest_core::{Body, Context, Error, Result, StatusPolicy};
use bytes::Bytes;
use http::header::{HeaderName, ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use quick_xml::de;
use serde::Deserialize;

/// Characters escaped in container and blob names, `/` is kept.
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

pub(crate) fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, &PATH_ENCODE_SET).to_string()
}

/// A blob read from or written to the service.
#[derive(Debug)]
pub struct BlobFile {
    /// Blob content, streamed when read from the service.
    pub content: Body,
    /// File name carried by `Content-Disposition`.
    pub file_name: Option<String>,
    /// Content type of the blob.
    pub content_type: Option<String>,
}

impl BlobFile {
    /// Create a blob from its content.
    pub fn new(content: impl Into<Body>) -> Self {
        Self {
            content: content.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// Set the file name announced in `Content-Disposition`.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Extract `name` from `attachment; filename="name"`.
fn parse_file_name(disposition: &str) -> Option<String> {
    let (_, rest) = disposition.rsplit_once("filename=\"")?;
    let name = rest.strip_suffix('"')?;
    Some(name.to_string())
}

/// Properties of a container.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerProperties {
    /// `Last-Modified` in RFC 1123 format.
    #[serde(rename = "Last-Modified")]
    pub last_modified: String,
    /// Entity tag of the container.
    #[serde(rename = "Etag")]
    pub etag: String,
}

/// A container returned by [`BlobStorage::list_containers`].
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Container {
    /// Container name.
    pub name: String,
    /// Container properties.
    pub properties: ContainerProperties,
}

/// One page of containers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ContainerList {
    /// Containers in this page.
    pub containers: Vec<Container>,
    /// Marker of the next page, `None` on the last one.
    pub next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct EnumerationResults {
    containers: Containers,
    next_marker: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct Containers {
    #[serde(rename = "Container")]
    container: Vec<Container>,
}

/// Blob storage client, authorized with `SharedKeyLite`.
#[derive(Debug, Clone)]
pub struct BlobStorage {
    ctx: Context,
    credential: Credential,
    endpoint: String,
    time: Option<DateTime>,
}

impl BlobStorage {
    /// Create a client from a loaded [`Config`].
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let credential = config.credential()?;
        let endpoint = config.endpoint(&credential.account_name);

        Ok(Self {
            ctx,
            credential,
            endpoint,
            time: None,
        })
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

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        mut headers: HeaderMap,
        body: Bytes,
        expected: StatusCode,
    ) -> Result<http::Response<Body>> {
        let mut uri = format!("{}{}", self.endpoint, encode_path(path));
        for (i, (k, v)) in query.iter().enumerate() {
            uri.push(if i == 0 { '?' } else { '&' });
            uri.push_str(k);
            uri.push('=');
            uri.push_str(&form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>());
        }

        headers.insert(X_MS_VERSION, HeaderValue::from_static(STORAGE_VERSION));
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));

        let mut req = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(body)?;
        *req.headers_mut() = headers;

        let (mut parts, body) = req.into_parts();
        sign_parts(&mut parts, &self.credential, self.time.unwrap_or_else(now))?;
        let req = http::Request::from_parts(parts, body);

        debug!("sending storage request: {} {}", req.method(), req.uri());
        let resp = self.ctx.http_send(req).await?;
        ensure_status(resp, expected, false, StatusPolicy::default()).await
    }

    /// Create a container.
    pub async fn create_container(&self, name: &str) -> Result<()> {
        let resp = self
            .send(
                Method::PUT,
                &format!("/{name}"),
                &[("restype", "container")],
                HeaderMap::new(),
                Bytes::new(),
                StatusCode::CREATED,
            )
            .await?;
        resp.into_body().bytes().await?;
        Ok(())
    }

    /// Read the properties of a container.
    pub async fn get_container_properties(&self, name: &str) -> Result<ContainerProperties> {
        let resp = self
            .send(
                Method::GET,
                &format!("/{name}"),
                &[("restype", "container")],
                HeaderMap::new(),
                Bytes::new(),
                StatusCode::OK,
            )
            .await?;

        let header = |key: HeaderName| {
            resp.headers()
                .get(key)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let properties = ContainerProperties {
            last_modified: header(LAST_MODIFIED),
            etag: header(ETAG),
        };
        resp.into_body().bytes().await?;
        Ok(properties)
    }

    /// Delete a container.
    pub async fn delete_container(&self, name: &str) -> Result<()> {
        let resp = self
            .send(
                Method::DELETE,
                &format!("/{name}"),
                &[("restype", "container")],
                HeaderMap::new(),
                Bytes::new(),
                StatusCode::ACCEPTED,
            )
            .await?;
        resp.into_body().bytes().await?;
        Ok(())
    }

    /// List one page of containers, starting after `marker`.
    pub async fn list_containers(&self, marker: Option<&str>) -> Result<ContainerList> {
        let mut query = vec![("comp", "list")];
        if let Some(marker) = marker {
            query.push(("marker", marker));
        }

        let resp = self
            .send(
                Method::GET,
                "/",
                &query,
                HeaderMap::new(),
                Bytes::new(),
                StatusCode::OK,
            )
            .await?;
        let bs = resp.into_body().bytes().await?;
        let content = String::from_utf8(bs.to_vec())?;

        let result: EnumerationResults = de::from_str(content.trim_start_matches('\u{feff}'))
            .map_err(|e| Error::unexpected("deserialize container list failed").with_source(e))?;
        Ok(ContainerList {
            containers: result.containers.container,
            next_marker: Some(result.next_marker).filter(|v| !v.is_empty()),
        })
    }

    /// Upload `blob` as a block blob, replacing any existing one.
    ///
    /// The content is sent in a single request.
    pub async fn put_blob(&self, container: &str, name: &str, blob: BlobFile) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(X_MS_BLOB_TYPE, HeaderValue::from_static(BLOCK_BLOB));
        if let Some(file_name) = &blob.file_name {
            headers.insert(
                X_MS_BLOB_CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\"").parse()?,
            );
        }
        if let Some(content_type) = &blob.content_type {
            headers.insert(CONTENT_TYPE, content_type.parse()?);
        }
        let body = blob.content.bytes().await?;

        let resp = self
            .send(
                Method::PUT,
                &format!("/{container}/{name}"),
                &[],
                headers,
                body,
                StatusCode::CREATED,
            )
            .await?;
        resp.into_body().bytes().await?;
        Ok(())
    }

    /// Read a blob, its content is streamed.
    pub async fn get_blob(&self, container: &str, name: &str) -> Result<BlobFile> {
        let resp = self
            .send(
                Method::GET,
                &format!("/{container}/{name}"),
                &[],
                HeaderMap::new(),
                Bytes::new(),
                StatusCode::OK,
            )
            .await?;

        let (parts, content) = resp.into_parts();
        let header = |key: HeaderName| {
            parts
                .headers
                .get(key)
                .and_then(|v| v.to_str().ok())
        };
        Ok(BlobFile {
            content,
            file_name: header(CONTENT_DISPOSITION).and_then(parse_file_name),
            content_type: header(CONTENT_TYPE).map(|v| v.to_string()),
        })
    }

    /// Build a signed url for `sas` under this client's endpoint.
    pub fn signed_url(&self, sas: &SharedAccessSignature) -> Result<String> {
        sas.signed_url(&self.credential, &self.endpoint)
    }
}
