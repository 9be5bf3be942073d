use serde::Serialize;

fn to_csv<I, S>(fields: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = fields
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",");
    Some(joined).filter(|v| !v.is_empty())
}

/// SearchMode decides whether any or all of the terms must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// At least one term must match.
    Any,
    /// Every term must match.
    All,
}

impl SearchMode {
    /// The value sent in `searchMode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Any => "any",
            SearchMode::All => "all",
        }
    }
}

/// Parameters of a full text search.
///
/// Only the parameters that were set are sent.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    search: Option<String>,
    search_mode: Option<SearchMode>,
    search_fields: Option<String>,
    skip: Option<u32>,
    top: Option<u32>,
    count: Option<bool>,
    order_by: Option<String>,
    select: Option<String>,
    facet: Option<String>,
    filter: Option<String>,
    highlight: Option<String>,
    scoring_profile: Option<String>,
    scoring_parameter: Option<String>,
}

impl SearchQuery {
    /// Create a query for `search`, `*` matches every document.
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    /// Set the search mode.
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = Some(mode);
        self
    }

    /// Restrict the search to these fields.
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.search_fields = to_csv(fields);
        self
    }

    /// Skip the first `skip` results.
    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Return at most `top` results.
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Ask for the total count of matches.
    pub fn with_count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }

    /// Sort by these expressions, like `rating desc`.
    pub fn with_order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order_by = to_csv(fields);
        self
    }

    /// Return only these fields.
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select = to_csv(fields);
        self
    }

    /// Set the facet expression.
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Set the OData filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Highlight hits in these fields.
    pub fn with_highlight<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.highlight = to_csv(fields);
        self
    }

    /// Rank with a named scoring profile.
    pub fn with_scoring_profile(mut self, profile: impl Into<String>) -> Self {
        self.scoring_profile = Some(profile.into());
        self
    }

    /// Set a scoring function parameter, like `mylocation:-122.2,44.8`.
    pub fn with_scoring_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.scoring_parameter = Some(parameter.into());
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.search {
            pairs.push(("search", v.clone()));
        }
        if let Some(v) = self.search_mode {
            pairs.push(("searchMode", v.as_str().to_string()));
        }
        if let Some(v) = &self.search_fields {
            pairs.push(("searchFields", v.clone()));
        }
        if let Some(v) = self.skip {
            pairs.push(("$skip", v.to_string()));
        }
        if let Some(v) = self.top {
            pairs.push(("$top", v.to_string()));
        }
        if let Some(v) = self.count {
            pairs.push(("$count", v.to_string()));
        }
        if let Some(v) = &self.order_by {
            pairs.push(("$orderby", v.clone()));
        }
        if let Some(v) = &self.select {
            pairs.push(("$select", v.clone()));
        }
        if let Some(v) = &self.facet {
            pairs.push(("facet", v.clone()));
        }
        if let Some(v) = &self.filter {
            pairs.push(("$filter", v.clone()));
        }
        if let Some(v) = &self.highlight {
            pairs.push(("highlight", v.clone()));
        }
        if let Some(v) = &self.scoring_profile {
            pairs.push(("scoringProfile", v.clone()));
        }
        if let Some(v) = &self.scoring_parameter {
            pairs.push(("scoringParameter", v.clone()));
        }
        pairs
    }
}

/// Parameters of a suggestion request.
#[derive(Debug, Clone, Default)]
pub struct SuggestQuery {
    search: String,
    suggester_name: String,
    fuzzy: Option<bool>,
    search_fields: Option<String>,
    top: Option<u32>,
    filter: Option<String>,
    order_by: Option<String>,
    select: Option<String>,
}

impl SuggestQuery {
    /// Create a query suggesting completions of `search` with the suggester
    /// named `suggester_name` in the index definition.
    pub fn new(search: impl Into<String>, suggester_name: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            suggester_name: suggester_name.into(),
            ..Default::default()
        }
    }

    /// Enable fuzzy matching.
    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = Some(fuzzy);
        self
    }

    /// Restrict the suggestions to these fields.
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.search_fields = to_csv(fields);
        self
    }

    /// Return at most `top` suggestions.
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Set the OData filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sort by these expressions.
    pub fn with_order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order_by = to_csv(fields);
        self
    }

    /// Return only these fields.
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select = to_csv(fields);
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("search", self.search.clone()),
            ("suggesterName", self.suggester_name.clone()),
        ];
        if let Some(v) = self.fuzzy {
            pairs.push(("fuzzy", v.to_string()));
        }
        if let Some(v) = &self.search_fields {
            pairs.push(("searchFields", v.clone()));
        }
        if let Some(v) = self.top {
            pairs.push(("$top", v.to_string()));
        }
        if let Some(v) = &self.filter {
            pairs.push(("$filter", v.clone()));
        }
        if let Some(v) = &self.order_by {
            pairs.push(("$orderby", v.clone()));
        }
        if let Some(v) = &self.select {
            pairs.push(("$select", v.clone()));
        }
        pairs
    }
}

/// What to do with a document in an [`IndexBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexAction {
    /// Insert the document, replacing an existing one.
    Upload,
    /// Update fields of an existing document.
    Merge,
    /// Merge when the document exists, upload otherwise.
    MergeOrUpload,
    /// Remove the document, only its key is needed.
    Delete,
}

#[derive(Debug, Clone, Serialize)]
struct IndexDocument<T> {
    #[serde(rename = "@search.action")]
    action: IndexAction,
    #[serde(flatten)]
    document: T,
}

/// A batch of documents sent to [`Search::process_documents`](crate::Search::process_documents).
///
/// ```
/// use azrest_search::{IndexAction, IndexBatch};
/// use serde_json::json;
///
/// let batch = IndexBatch::new()
///     .with(IndexAction::Upload, json!({"hotelId": "1", "description": "Marriott"}))
///     .with(IndexAction::Delete, json!({"hotelId": "2"}));
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct IndexBatch<T> {
    value: Vec<IndexDocument<T>>,
}

impl<T> Default for IndexBatch<T> {
    fn default() -> Self {
        Self { value: Vec::new() }
    }
}

impl<T: Serialize> IndexBatch<T> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document.
    pub fn push(&mut self, action: IndexAction, document: T) {
        self.value.push(IndexDocument { action, document });
    }

    /// Add a document, builder style.
    pub fn with(mut self, action: IndexAction, document: T) -> Self {
        self.push(action, document);
        self
    }

    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true if the batch holds no document.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
