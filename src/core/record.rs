//! Records, projections and identifier shaping
//!
//! Storage backends hand out plain JSON objects. Before a record leaves the
//! adapter its canonical identifier field is renamed to `id`; on the way in
//! the reverse mapping is applied.

use crate::core::identifier::CLIENT_ID_FIELD;
use serde::Deserialize;
use serde_json::{Map, Value};

/// An opaque record as stored by a [`ResourceStore`](crate::core::store::ResourceStore)
pub type Record = Map<String, Value>;

/// Rename the identifier field of a record to `id`
///
/// A record never carries both keys afterwards.
pub fn expose_identifier(mut record: Record, identifier_field: &str) -> Record {
    if identifier_field == CLIENT_ID_FIELD {
        return record;
    }
    if let Some(id) = record.remove(identifier_field) {
        record.insert(CLIENT_ID_FIELD.to_string(), id);
    }
    record
}

/// Map a client-supplied `id` onto the identifier field of a new record
pub fn accept_identifier(mut data: Record, identifier_field: &str) -> Record {
    if identifier_field == CLIENT_ID_FIELD {
        return data;
    }
    if let Some(id) = data.remove(CLIENT_ID_FIELD)
        && !data.contains_key(identifier_field)
    {
        data.insert(identifier_field.to_string(), id);
    }
    data
}

/// Shallow-assign every body field onto `record`
///
/// Identifier keys are skipped so an update never re-keys a record.
pub fn merge_fields(record: &mut Record, body: Record, identifier_field: &str) {
    for (key, value) in body {
        if key == CLIENT_ID_FIELD || key == identifier_field {
            continue;
        }
        record.insert(key, value);
    }
}

/// Field selection applied to reads
///
/// Parsed from a select string such as `"title body -secret"`: bare names are
/// included, names prefixed with `-` are excluded. An empty selection returns
/// every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "SelectSpec")]
pub struct Projection {
    include: Vec<String>,
    exclude: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectSpec {
    Text(String),
    Fields(Map<String, Value>),
}

impl From<SelectSpec> for Projection {
    fn from(spec: SelectSpec) -> Self {
        match spec {
            SelectSpec::Text(select) => Projection::parse(&select),
            SelectSpec::Fields(fields) => Projection::from_fields(&fields),
        }
    }
}

impl Projection {
    /// Projection returning every field
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a space-separated select string
    pub fn parse(select: &str) -> Self {
        let mut projection = Self::default();
        for token in select.split_whitespace() {
            match token.strip_prefix('-') {
                Some(field) if !field.is_empty() => projection.exclude.push(field.to_string()),
                Some(_) => {}
                None => projection.include.push(token.trim_start_matches('+').to_string()),
            }
        }
        projection
    }

    /// Build from a `{field: 1 | 0}` map; truthy values include, falsy exclude
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let mut projection = Self::default();
        for (field, flag) in fields {
            let included = match flag {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                _ => true,
            };
            if included {
                projection.include.push(field.clone());
            } else {
                projection.exclude.push(field.clone());
            }
        }
        projection
    }

    /// `true` when every field is returned
    pub fn is_all(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Explicitly included fields
    pub fn included(&self) -> &[String] {
        &self.include
    }

    /// Explicitly excluded fields
    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }

    /// Apply the projection to a stored record
    ///
    /// Inclusion projections always keep the identifier field unless it is
    /// explicitly excluded.
    pub fn apply(&self, record: &Record, identifier_field: &str) -> Record {
        if self.is_all() {
            return record.clone();
        }

        if self.include.is_empty() {
            return record
                .iter()
                .filter(|(key, _)| !self.exclude.iter().any(|f| f == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
        }

        let keep_identifier = !self.exclude.iter().any(|f| f == identifier_field);
        record
            .iter()
            .filter(|(key, _)| {
                (keep_identifier && key.as_str() == identifier_field)
                    || self.include.iter().any(|f| f == *key)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
