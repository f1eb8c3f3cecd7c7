//! In-memory implementation of ResourceStore for testing and development

use crate::core::identifier::{DEFAULT_IDENTIFIER_FIELD, generate_object_id};
use crate::core::query::{Predicate, QueryDescriptor, SortDirection};
use crate::core::record::{Projection, Record};
use crate::core::store::ResourceStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

/// In-memory resource store
///
/// Records keep their insertion order, which is the natural order used when
/// a query carries no sort. Uses RwLock for thread-safe access.
///
/// Predicates follow document-store semantics: equality against an array
/// field matches when any element is equal, patterns only match strings, and
/// a raw object is either an operator document (`{"$gte": 3}`) or an exact
/// value.
#[derive(Clone)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<Record>>>,
    identifier_field: String,
}

impl InMemoryStore {
    /// Create an empty store keyed by `_id`
    pub fn new() -> Self {
        Self::with_identifier_field(DEFAULT_IDENTIFIER_FIELD)
    }

    /// Create an empty store keyed by a custom identifier field
    pub fn with_identifier_field(identifier_field: impl Into<String>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            identifier_field: identifier_field.into(),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Whether the store holds no record
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn identifier_of<'a>(&self, record: &'a Record) -> Result<&'a Value> {
        record
            .get(&self.identifier_field)
            .ok_or_else(|| anyhow!("Record has no '{}' field", self.identifier_field))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    async fn find(&self, query: &QueryDescriptor, projection: &Projection) -> Result<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let matcher = Matcher::new(&query.predicates);
        let mut matched: Vec<&Record> = records
            .iter()
            .filter(|record| matcher.matches(record))
            .collect();

        if let Some(field) = &query.sort_field {
            matched.sort_by(|a, b| {
                let ordering = compare_field(a.get(field), b.get(field));
                match query.sort_direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        // A non-positive limit means no cap, as with a document store's limit(0)
        let take = if query.limit > 0 {
            query.limit as usize
        } else {
            usize::MAX
        };

        Ok(matched
            .into_iter()
            .skip(query.skip as usize)
            .take(take)
            .map(|record| projection.apply(record, &self.identifier_field))
            .collect())
    }

    async fn count(&self, predicates: &[Predicate]) -> Result<u64> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let matcher = Matcher::new(predicates);
        Ok(records
            .iter()
            .filter(|record| matcher.matches(record))
            .count() as u64)
    }

    async fn find_one(
        &self,
        predicates: &[Predicate],
        projection: &Projection,
    ) -> Result<Option<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let matcher = Matcher::new(predicates);
        Ok(records
            .iter()
            .find(|record| matcher.matches(record))
            .map(|record| projection.apply(record, &self.identifier_field)))
    }

    async fn create(&self, mut data: Record) -> Result<Record> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !data.contains_key(&self.identifier_field) {
            data.insert(
                self.identifier_field.clone(),
                Value::String(generate_object_id()),
            );
        }

        let id = self.identifier_of(&data)?;
        if records
            .iter()
            .any(|record| record.get(&self.identifier_field) == Some(id))
        {
            return Err(anyhow!("Duplicate key: {} already exists", id));
        }

        records.push(data.clone());

        Ok(data)
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = self.identifier_of(&record)?;
        let stored = records
            .iter_mut()
            .find(|stored| stored.get(&self.identifier_field) == Some(id))
            .ok_or_else(|| anyhow!("No record found for {}", id))?;

        for (key, value) in &record {
            stored.insert(key.clone(), value.clone());
        }

        Ok(record)
    }

    async fn delete_one(&self, predicates: &[Predicate]) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let matcher = Matcher::new(predicates);
        if let Some(position) = records
            .iter()
            .position(|record| matcher.matches(record))
        {
            records.remove(position);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Predicate evaluation
// ---------------------------------------------------------------------------

/// Predicates prepared for scanning many records
///
/// Patterns and search terms are compiled once per query, not per record.
struct Matcher<'a> {
    predicates: Vec<Prepared<'a>>,
}

enum Prepared<'a> {
    Pattern { field: &'a str, regex: Option<Regex> },
    FullText { term: String },
    Other(&'a Predicate),
}

impl<'a> Matcher<'a> {
    fn new(predicates: &'a [Predicate]) -> Self {
        let predicates = predicates
            .iter()
            .map(|predicate| match predicate {
                Predicate::PatternMatch { field, pattern } => Prepared::Pattern {
                    field,
                    regex: pattern_regex(pattern),
                },
                Predicate::FullTextSearch { phrase } => Prepared::FullText {
                    term: unquote_phrase(phrase).to_lowercase(),
                },
                other => Prepared::Other(other),
            })
            .collect();
        Self { predicates }
    }

    fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|prepared| match prepared {
            Prepared::Pattern { field, regex } => regex.as_ref().is_some_and(|regex| {
                any_element(record.get(*field), |v| {
                    v.as_str().is_some_and(|s| regex.is_match(s))
                })
            }),
            Prepared::FullText { term } => record.values().any(|value| {
                any_element(Some(value), |v| {
                    v.as_str()
                        .is_some_and(|s| s.to_lowercase().contains(term.as_str()))
                })
            }),
            Prepared::Other(predicate) => matches_predicate(record, predicate),
        })
    }
}

fn matches_predicate(record: &Record, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { field, value } => field_equals(record.get(field), value),
        Predicate::IdentityMatch { field, id } => {
            any_element(record.get(field), |v| {
                v.as_str().is_some_and(|s| s.eq_ignore_ascii_case(id))
            })
        }
        Predicate::PatternMatch { .. } | Predicate::FullTextSearch { .. } => {
            Matcher::new(std::slice::from_ref(predicate)).matches(record)
        }
        Predicate::AnyOf { field, values } => values
            .iter()
            .any(|value| field_equals(record.get(field), value)),
        Predicate::Raw { field, value } => match value {
            Value::Object(ops) if is_operator_document(ops) => {
                ops.iter().all(|(op, arg)| apply_operator(record.get(field), op, arg, ops))
            }
            other => field_equals(record.get(field), other),
        },
    }
}

/// Remove exactly one pair of wrapping quotes from a search phrase
fn unquote_phrase(phrase: &str) -> &str {
    phrase
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(phrase)
}

/// Case-insensitive regex, falling back to a literal match for invalid patterns
fn pattern_regex(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

fn any_element(stored: Option<&Value>, test: impl Fn(&Value) -> bool) -> bool {
    match stored {
        Some(Value::Array(items)) => items.iter().any(&test),
        Some(value) => test(value),
        None => false,
    }
}

fn field_equals(stored: Option<&Value>, expected: &Value) -> bool {
    match (stored, expected) {
        (None, Value::Null) => true,
        (Some(Value::Array(items)), expected) if !expected.is_array() => {
            items.iter().any(|item| item == expected)
        }
        (Some(value), expected) => value == expected,
        (None, _) => false,
    }
}

fn is_operator_document(ops: &Map<String, Value>) -> bool {
    !ops.is_empty() && ops.keys().all(|key| key.starts_with('$'))
}

fn apply_operator(stored: Option<&Value>, op: &str, arg: &Value, ops: &Map<String, Value>) -> bool {
    let ordered = |accept: fn(Ordering) -> bool| {
        any_element(stored, |v| compare_values(v, arg).is_some_and(accept))
    };

    match op {
        "$eq" => field_equals(stored, arg),
        "$ne" => !field_equals(stored, arg),
        "$gt" => ordered(|o| o == Ordering::Greater),
        "$gte" => ordered(|o| o != Ordering::Less),
        "$lt" => ordered(|o| o == Ordering::Less),
        "$lte" => ordered(|o| o != Ordering::Greater),
        "$in" => arg
            .as_array()
            .is_some_and(|values| values.iter().any(|v| field_equals(stored, v))),
        "$nin" => arg
            .as_array()
            .is_none_or(|values| !values.iter().any(|v| field_equals(stored, v))),
        "$exists" => stored.is_some() == arg.as_bool().unwrap_or(true),
        "$regex" => {
            let pattern = arg.as_str().unwrap_or_default();
            let case_insensitive = ops
                .get("$options")
                .and_then(Value::as_str)
                .is_some_and(|options| options.contains('i'));
            match RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
            {
                Ok(regex) => any_element(stored, |v| v.as_str().is_some_and(|s| regex.is_match(s))),
                Err(_) => false,
            }
        }
        "$options" => true,
        _ => false,
    }
}

/// Comparison between two values of the same JSON type
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order used for sorting: missing/null, numbers, strings, objects, arrays, booleans
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Object(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Bool(_)) => 5,
        }
    }

    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or_else(|| rank(a).cmp(&rank(b))),
        _ => rank(a).cmp(&rank(b)),
    }
}
