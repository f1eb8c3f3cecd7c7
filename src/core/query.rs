//! Query parameter compilation
//!
//! List requests carry three JSON-encoded query parameters:
//!
//! ```text
//! GET /posts?sort=["title","ASC"]&range=[0,24]&filter={"q":"rust","author":"ada"}
//! ```
//!
//! [`FilterCompiler`] turns them into a [`QueryDescriptor`]: an optional sort,
//! a skip/limit window and an ordered list of [`Predicate`]s that any
//! [`ResourceStore`](crate::core::store::ResourceStore) can execute.

use crate::core::error::RestError;
use crate::core::identifier::{CLIENT_ID_FIELD, DEFAULT_IDENTIFIER_FIELD, is_object_id};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved filter key triggering a full-text search
pub const SEARCH_KEY: &str = "q";

/// Number of records returned when the client sends no range
pub const DEFAULT_LIMIT: i64 = 1000;

/// Raw list query parameters, each one a JSON document in a string
///
/// ```text
/// sort=["name","DESC"]
/// range=[0,9]
/// filter={"status":"published","tags":["rust","axum"]}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// `[field, "ASC" | "DESC"]`
    pub sort: Option<String>,

    /// `[skip, end]`, end being an exclusive upper bound
    pub range: Option<String>,

    /// JSON object of field → value conditions
    pub filter: Option<String>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `"ASC"` is ascending, anything else descending
    pub fn from_client(value: &Value) -> Self {
        match value.as_str() {
            Some("ASC") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    /// Numeric form used by document stores (1 / -1)
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// A single filter condition compiled from one filter key/value pair
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact equality, produced by the `id`/identifier keys
    Equals { field: String, value: Value },

    /// Full-text search; `phrase` is already quote-wrapped
    FullTextSearch { phrase: String },

    /// Field equals a store-native identifier
    IdentityMatch { field: String, id: String },

    /// Case-insensitive, unanchored pattern over the field's value
    PatternMatch { field: String, pattern: String },

    /// Field equals any one of the values
    AnyOf { field: String, values: Vec<Value> },

    /// Nested object handed to the store untouched
    Raw { field: String, value: Value },
}

impl Predicate {
    /// Build a full-text predicate, quote-wrapping the term as a phrase
    pub fn full_text(term: &str) -> Self {
        Predicate::FullTextSearch {
            phrase: format!("\"{}\"", term),
        }
    }

    /// Field targeted by the predicate, `None` for full-text search
    pub fn field(&self) -> Option<&str> {
        match self {
            Predicate::Equals { field, .. }
            | Predicate::IdentityMatch { field, .. }
            | Predicate::PatternMatch { field, .. }
            | Predicate::AnyOf { field, .. }
            | Predicate::Raw { field, .. } => Some(field),
            Predicate::FullTextSearch { .. } => None,
        }
    }
}

/// Normalized sort/pagination/predicate bundle for one list request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// `None` keeps the store's natural order
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub skip: u64,
    /// `end - skip` as sent by the client; not clamped
    pub limit: i64,
    pub predicates: Vec<Predicate>,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            sort_field: None,
            sort_direction: SortDirection::Asc,
            skip: 0,
            limit: DEFAULT_LIMIT,
            predicates: Vec::new(),
        }
    }
}

impl QueryDescriptor {
    /// Value of the `Content-Range` header: `skip-(skip+limit)/total`
    pub fn content_range(&self, total: u64) -> String {
        let end = i128::from(self.skip) + i128::from(self.limit);
        format!("{}-{}/{}", self.skip, end, total)
    }
}

/// How array-valued filters interact with the other predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayFilterMode {
    /// An array filter discards every predicate compiled before it
    #[default]
    Replace,

    /// Every predicate is kept and AND-combined
    Combine,
}

/// Compiles client query parameters into a [`QueryDescriptor`]
///
/// Stateless; one compiler can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    identifier_field: String,
    default_limit: i64,
    array_filters: ArrayFilterMode,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTIFIER_FIELD)
    }
}

impl FilterCompiler {
    /// Create a compiler for a store whose canonical identifier is `identifier_field`
    pub fn new(identifier_field: impl Into<String>) -> Self {
        Self {
            identifier_field: identifier_field.into(),
            default_limit: DEFAULT_LIMIT,
            array_filters: ArrayFilterMode::default(),
        }
    }

    /// Override the limit applied when no range is sent
    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Choose how array-valued filters combine with other predicates
    pub fn with_array_filters(mut self, mode: ArrayFilterMode) -> Self {
        self.array_filters = mode;
        self
    }

    /// Canonical identifier field `id` filters are rewritten to
    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    /// Compile extracted list parameters
    pub fn compile_params(&self, params: &ListParams) -> Result<QueryDescriptor, RestError> {
        self.compile(
            params.sort.as_deref(),
            params.range.as_deref(),
            params.filter.as_deref(),
        )
    }

    /// Compile raw `sort`, `range` and `filter` strings
    ///
    /// Any parameter that is not valid JSON of the expected shape yields
    /// [`RestError::InvalidQueryParameter`].
    pub fn compile<'a>(
        &self,
        sort: Option<&'a str>,
        range: Option<&'a str>,
        filter: Option<&'a str>,
    ) -> Result<QueryDescriptor, RestError> {
        let mut descriptor = QueryDescriptor {
            limit: self.default_limit,
            ..QueryDescriptor::default()
        };

        // Empty parameters count as absent
        let present = |raw: Option<&'a str>| raw.filter(|raw| !raw.is_empty());

        if let Some(raw) = present(sort) {
            let (field, direction): (String, Value) = serde_json::from_str(raw)
                .map_err(|e| RestError::invalid_query("sort", e))?;
            descriptor.sort_field = Some(field);
            descriptor.sort_direction = SortDirection::from_client(&direction);
        }

        if let Some(raw) = present(range) {
            let (skip, end): (u64, i64) = serde_json::from_str(raw)
                .map_err(|e| RestError::invalid_query("range", e))?;
            descriptor.limit = i64::try_from(skip)
                .ok()
                .and_then(|skip| end.checked_sub(skip))
                .ok_or_else(|| {
                    RestError::invalid_query("range", format!("window [{}, {}] out of bounds", skip, end))
                })?;
            descriptor.skip = skip;
        }

        let filter = match present(filter) {
            Some(raw) => serde_json::from_str::<Map<String, Value>>(raw)
                .map_err(|e| RestError::invalid_query("filter", e))?,
            None => Map::new(),
        };
        descriptor.predicates = self.compile_filter(filter);

        Ok(descriptor)
    }

    /// Compile a filter object, walking its keys in client order
    pub fn compile_filter(&self, filter: Map<String, Value>) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(filter.len());

        for (key, value) in filter {
            let predicate = self.classify(key, value);
            if matches!(predicate, Predicate::AnyOf { .. })
                && self.array_filters == ArrayFilterMode::Replace
            {
                predicates.clear();
            }
            predicates.push(predicate);
        }

        predicates
    }

    fn classify(&self, key: String, value: Value) -> Predicate {
        if key == DEFAULT_IDENTIFIER_FIELD || key == self.identifier_field {
            return Predicate::Equals { field: key, value };
        }

        match key.as_str() {
            CLIENT_ID_FIELD => Predicate::Equals {
                field: self.identifier_field.clone(),
                value,
            },
            SEARCH_KEY => Predicate::full_text(&scalar_text(&value)),
            _ => match value {
                Value::String(s) if is_object_id(&s) => Predicate::IdentityMatch { field: key, id: s },
                Value::String(s) => Predicate::PatternMatch { field: key, pattern: s },
                Value::Number(_) | Value::Bool(_) => Predicate::PatternMatch {
                    field: key,
                    pattern: value.to_string(),
                },
                Value::Array(values) => Predicate::AnyOf { field: key, values },
                // Objects and null are handed to the store as-is
                other => Predicate::Raw { field: key, value: other },
            },
        }
    }
}

/// Compile with the default identifier field (`_id`) and limit
pub fn compile(
    sort: Option<&str>,
    range: Option<&str>,
    filter: Option<&str>,
) -> Result<QueryDescriptor, RestError> {
    FilterCompiler::default().compile(sort, range, filter)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
