use serde::{Deserialize, Serialize};

/// One page of a document query.
///
/// `T` is the caller's document type, decoded from the `Documents` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult<T> {
    /// Documents of this page.
    #[serde(rename = "Documents", default = "Vec::new")]
    pub documents: Vec<T>,
    /// Resource id of the queried collection.
    #[serde(rename = "_rid", default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    /// Number of documents in this page.
    #[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Continuation token of the next page, taken from `x-ms-continuation`.
    #[serde(skip)]
    pub continuation: Option<String>,
}

impl<T> QueryResult<T> {
    /// Returns true if another page is available.
    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

/// Attachment metadata sent when creating or replacing an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment id.
    pub id: String,
    /// Content type of the media.
    #[serde(rename = "contentType")]
    pub content_type: String,
    /// Location of the media.
    pub media: String,
}

impl Attachment {
    /// Create attachment metadata.
    pub fn new(
        id: impl Into<String>,
        content_type: impl Into<String>,
        media: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content_type: content_type.into(),
            media: media.into(),
        }
    }

    pub(crate) fn check(&self) -> azrest_core::Result<()> {
        if self.id.is_empty() || self.content_type.is_empty() || self.media.is_empty() {
            return Err(azrest_core::Error::request_invalid(format!(
                "required attachment value missing: id: {:?} contentType: {:?} media: {:?}",
                self.id, self.content_type, self.media
            )));
        }
        Ok(())
    }
}
