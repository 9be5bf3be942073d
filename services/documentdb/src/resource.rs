use azrest_core::{Error, Result};
use http::header::{IF_MATCH, IF_NONE_MATCH};
use http::HeaderName;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Consistency level requested for every call of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyLevel {
    /// Strong consistency.
    Strong,
    /// Bounded staleness.
    Bounded,
    /// Session consistency, replays the last seen session token per path.
    Session,
    /// Eventual consistency.
    Eventual,
}

impl ConsistencyLevel {
    /// Value sent in `x-ms-consistency-level`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Strong => "Strong",
            ConsistencyLevel::Bounded => "BoundedStaleness",
            ConsistencyLevel::Session => "Session",
            ConsistencyLevel::Eventual => "Eventual",
        }
    }
}

impl FromStr for ConsistencyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strong" => Ok(ConsistencyLevel::Strong),
            "bounded" | "boundedstaleness" => Ok(ConsistencyLevel::Bounded),
            "session" => Ok(ConsistencyLevel::Session),
            "eventual" => Ok(ConsistencyLevel::Eventual),
            _ => Err(Error::config_invalid(format!(
                "unknown consistency level: {s}"
            ))),
        }
    }
}

/// Indexing directive sent with document writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirective {
    /// Index the document.
    Include,
    /// Skip indexing the document.
    Exclude,
}

impl IndexDirective {
    /// Value sent in `x-ms-indexing-directive`.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexDirective::Include => "Include",
            IndexDirective::Exclude => "Exclude",
        }
    }
}

/// Conditional token sent as `If-Match` or `If-None-Match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional {
    /// Succeed only if the resource still has this etag.
    Match(String),
    /// Succeed only if the resource changed from this etag.
    NoMatch(String),
}

impl Conditional {
    pub(crate) fn header(&self) -> (HeaderName, &str) {
        match self {
            Conditional::Match(etag) => (IF_MATCH, etag),
            Conditional::NoMatch(etag) => (IF_NONE_MATCH, etag),
        }
    }
}

/// ResourceId addresses a database, collection, document or attachment.
///
/// The textual form is `dbs/{db}/colls/{coll}/docs/{doc}/attachments/{att}`,
/// every level after the database is optional but the order is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    database: String,
    collection: Option<String>,
    document: Option<String>,
    attachment: Option<String>,
}

impl ResourceId {
    /// Address a database.
    ///
    /// Ids must be non-empty and must not contain `/`.
    ///
    /// ```
    /// use azrest_documentdb::ResourceId;
    ///
    /// let id = ResourceId::database("D1")?.collection("C1")?;
    /// assert_eq!(id.path(), "/dbs/D1/colls/C1");
    /// assert!(ResourceId::database("D1/colls/C1").is_err());
    /// # Ok::<(), azrest_core::Error>(())
    /// ```
    pub fn database(db: impl Into<String>) -> Result<Self> {
        Ok(Self {
            database: check_id("database", db.into())?,
            collection: None,
            document: None,
            attachment: None,
        })
    }

    /// Address a collection inside this database.
    pub fn collection(mut self, coll: impl Into<String>) -> Result<Self> {
        self.collection = Some(check_id("collection", coll.into())?);
        Ok(self)
    }

    /// Address a document inside this collection.
    pub fn document(mut self, doc: impl Into<String>) -> Result<Self> {
        self.document = Some(check_id("document", doc.into())?);
        Ok(self)
    }

    /// Address an attachment inside this document.
    pub fn attachment(mut self, att: impl Into<String>) -> Result<Self> {
        self.attachment = Some(check_id("attachment", att.into())?);
        Ok(self)
    }

    /// Parse the textual form, leading and trailing slash are optional.
    ///
    /// ```
    /// use azrest_documentdb::ResourceId;
    ///
    /// let id = ResourceId::parse("/dbs/D1/colls/C1/").unwrap();
    /// assert_eq!(id.collection_id(), Some("C1"));
    /// assert_eq!(id.path(), "/dbs/D1/colls/C1");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let invalid = || Error::request_invalid(format!("invalid resource id: {s}"));

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() % 2 != 0 || segments.iter().any(|v| v.is_empty()) {
            return Err(invalid());
        }

        let mut levels = segments.chunks(2);
        let mut id = match levels.next() {
            Some(["dbs", db]) => ResourceId::database(*db)?,
            _ => return Err(invalid()),
        };
        for (expected, level) in ["colls", "docs", "attachments"].iter().zip(&mut levels) {
            let [kind, value] = level else {
                return Err(invalid());
            };
            if kind != expected {
                return Err(invalid());
            }
            match *kind {
                "colls" => id.collection = Some(value.to_string()),
                "docs" => id.document = Some(value.to_string()),
                _ => id.attachment = Some(value.to_string()),
            }
        }
        if levels.next().is_some() {
            return Err(invalid());
        }

        Ok(id)
    }

    /// Database id.
    pub fn database_id(&self) -> &str {
        &self.database
    }

    /// Collection id, if addressed.
    pub fn collection_id(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Document id, if addressed.
    pub fn document_id(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Attachment id, if addressed.
    pub fn attachment_id(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    /// Request path of the addressed resource, such as `/dbs/D1/colls/C1`.
    pub fn path(&self) -> String {
        let mut s = format!("/dbs/{}", self.database);
        if let Some(v) = &self.collection {
            s.push_str("/colls/");
            s.push_str(v);
        }
        if let Some(v) = &self.document {
            s.push_str("/docs/");
            s.push_str(v);
        }
        if let Some(v) = &self.attachment {
            s.push_str("/attachments/");
            s.push_str(v);
        }
        s
    }

    /// Resource type and id of the deepest addressed level, as used for signing.
    pub fn signing_parts(&self) -> (&'static str, &str) {
        if let Some(v) = &self.attachment {
            ("attachments", v)
        } else if let Some(v) = &self.document {
            ("docs", v)
        } else if let Some(v) = &self.collection {
            ("colls", v)
        } else {
            ("dbs", &self.database)
        }
    }
}

fn check_id(level: &str, id: String) -> Result<String> {
    if id.is_empty() || id.contains('/') {
        return Err(Error::request_invalid(format!("invalid {level} id: {id:?}")));
    }
    Ok(id)
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path()[1..])
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrest_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("dbs/D1/", "/dbs/D1"; "database")]
    #[test_case("/dbs/D1", "/dbs/D1"; "leading slash")]
    #[test_case("dbs/D1/colls/C1/", "/dbs/D1/colls/C1"; "collection")]
    #[test_case("dbs/D1/colls/C1/docs/X/", "/dbs/D1/colls/C1/docs/X"; "document")]
    #[test_case("dbs/D1/colls/C1/docs/X/attachments/A", "/dbs/D1/colls/C1/docs/X/attachments/A"; "attachment")]
    fn test_parse(input: &str, path: &str) {
        let id = ResourceId::parse(input).unwrap();
        assert_eq!(id.path(), path);
        assert_eq!(id.to_string(), &path[1..]);
    }

    #[test_case(""; "empty")]
    #[test_case("colls/C1/"; "missing database")]
    #[test_case("dbs/"; "missing database id")]
    #[test_case("dbs/D1/docs/X/"; "skipped collection")]
    #[test_case("dbs/D1/colls/C1/colls/C2/"; "repeated level")]
    #[test_case("dbs/D1/colls/C1/docs/X/attachments/A/extra/E"; "too deep")]
    #[test_case("dbs//colls/C1"; "empty segment")]
    fn test_parse_invalid(input: &str) {
        let err = ResourceId::parse(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_parse_fields() {
        let id: ResourceId = "dbs/D1/colls/C1/docs/X".parse().unwrap();
        assert_eq!(id.database_id(), "D1");
        assert_eq!(id.collection_id(), Some("C1"));
        assert_eq!(id.document_id(), Some("X"));
        assert_eq!(id.attachment_id(), None);
        assert_eq!(id.signing_parts(), ("docs", "X"));
        assert_eq!(
            id,
            ResourceId::database("D1")
                .unwrap()
                .collection("C1")
                .unwrap()
                .document("X")
                .unwrap()
        );
    }

    #[test]
    fn test_builders_reject_invalid_ids() {
        for id in ["", "D1/colls/C2"] {
            let err = ResourceId::database(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::RequestInvalid, "id: {id:?}");
        }

        let db = ResourceId::database("D1").unwrap();
        assert_eq!(
            db.clone().collection("C1/docs/X").unwrap_err().kind(),
            ErrorKind::RequestInvalid
        );
        let coll = db.collection("C1").unwrap();
        assert_eq!(
            coll.clone().document("").unwrap_err().kind(),
            ErrorKind::RequestInvalid
        );
        let doc = coll.document("X").unwrap();
        assert_eq!(
            doc.clone().attachment("A/B").unwrap_err().kind(),
            ErrorKind::RequestInvalid
        );
        assert_eq!(
            doc.attachment("A").unwrap().path(),
            "/dbs/D1/colls/C1/docs/X/attachments/A"
        );
    }

    #[test]
    fn test_consistency_level_from_str() {
        assert_eq!(
            "session".parse::<ConsistencyLevel>().unwrap(),
            ConsistencyLevel::Session
        );
        assert_eq!(
            "Bounded".parse::<ConsistencyLevel>().unwrap().as_str(),
            "BoundedStaleness"
        );
        assert!("linear".parse::<ConsistencyLevel>().is_err());
    }
}
