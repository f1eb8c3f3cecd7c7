//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoStore`, a [`ResourceStore`] over one collection of a
//! `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! simple-rest = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Query translation
//!
//! | Predicate | Filter clause |
//! |---|---|
//! | `Equals` | `{field: value}`, identifier strings cast to `ObjectId` |
//! | `FullTextSearch` | `{"$text": {"$search": "\"term\""}}` |
//! | `IdentityMatch` | `{field: ObjectId(..)}` |
//! | `PatternMatch` | `{field: /pattern/i}` |
//! | `AnyOf` | `{"$or": [{field: a}, {field: b}]}` |
//! | `Raw` | `{field: value}` untouched |
//!
//! Clauses whose key is already taken are moved under `$and`.
//!
//! Object identifiers are exposed as their 24-hex string form and dates as
//! RFC 3339 strings; every other BSON value uses relaxed extended JSON.

use crate::core::identifier::is_object_id;
use crate::core::query::{Predicate, QueryDescriptor};
use crate::core::record::{Projection, Record};
use crate::core::store::ResourceStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, Regex, doc};
use mongodb::{Collection, Database};
use serde_json::Value;

const MONGO_ID: &str = "_id";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a JSON value to BSON, casting identifier strings to `ObjectId`
fn identifier_bson(value: &Value) -> Result<Bson> {
    match value {
        Value::String(s) if is_object_id(s) => Ok(Bson::ObjectId(ObjectId::parse_str(s)?)),
        other => json_to_bson(other),
    }
}

fn json_to_bson(value: &Value) -> Result<Bson> {
    mongodb::bson::to_bson(value).map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))
}

/// Convert a record into a BSON document, casting its identifier to `ObjectId`
fn record_to_document(record: &Record) -> Result<Document> {
    let mut document = Document::new();
    for (key, value) in record {
        let bson = if key == MONGO_ID {
            identifier_bson(value)?
        } else {
            json_to_bson(value)?
        };
        document.insert(key.clone(), bson);
    }
    Ok(document)
}

/// Convert BSON back into plain JSON
fn bson_to_json(bson: Bson) -> Value {
    match bson {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(document) => Value::Object(document_to_record(document)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

fn document_to_record(document: Document) -> Record {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// Insert a clause, moving it under `$and` when its key is already used
fn push_clause(filter: &mut Document, and_clauses: &mut Vec<Bson>, key: String, value: Bson) {
    if filter.contains_key(&key) {
        and_clauses.push(Bson::Document(doc! { key: value }));
    } else {
        filter.insert(key, value);
    }
}

/// Compile predicates into a MongoDB filter document
pub fn filter_document(predicates: &[Predicate]) -> Result<Document> {
    let mut filter = Document::new();
    let mut and_clauses = Vec::new();

    for predicate in predicates {
        let (key, value) = match predicate {
            Predicate::Equals { field, value } if field == MONGO_ID => {
                (field.clone(), identifier_bson(value)?)
            }
            Predicate::Equals { field, value } | Predicate::Raw { field, value } => {
                (field.clone(), json_to_bson(value)?)
            }
            Predicate::FullTextSearch { phrase } => {
                ("$text".to_string(), Bson::Document(doc! { "$search": phrase }))
            }
            Predicate::IdentityMatch { field, id } => {
                (field.clone(), Bson::ObjectId(ObjectId::parse_str(id)?))
            }
            Predicate::PatternMatch { field, pattern } => (
                field.clone(),
                Bson::RegularExpression(Regex {
                    pattern: pattern.clone(),
                    options: "i".to_string(),
                }),
            ),
            Predicate::AnyOf { field, values } => {
                let alternatives = values
                    .iter()
                    .map(|value| -> Result<Bson> {
                        Ok(Bson::Document(doc! { field: json_to_bson(value)? }))
                    })
                    .collect::<Result<Vec<_>>>()?;
                ("$or".to_string(), Bson::Array(alternatives))
            }
        };
        push_clause(&mut filter, &mut and_clauses, key, value);
    }

    if !and_clauses.is_empty() {
        filter.insert("$and", and_clauses);
    }

    Ok(filter)
}

/// Compile a projection into a MongoDB projection document
pub fn projection_document(projection: &Projection) -> Option<Document> {
    if projection.is_all() {
        return None;
    }

    let mut document = Document::new();
    if projection.included().is_empty() {
        for field in projection.excluded() {
            document.insert(field.clone(), 0);
        }
    } else {
        for field in projection.included() {
            document.insert(field.clone(), 1);
        }
        if projection.excluded().iter().any(|f| f == MONGO_ID) {
            document.insert(MONGO_ID, 0);
        }
    }
    Some(document)
}

// ---------------------------------------------------------------------------
// MongoStore
// ---------------------------------------------------------------------------

/// Resource store backed by a MongoDB collection.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use simple_rest::storage::MongoStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoStore::new(client.database("blog"), "posts");
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Create a store over `collection` in `database`
    pub fn new(database: Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }

    /// Get a reference to the underlying collection.
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }
}

#[async_trait]
impl ResourceStore for MongoStore {
    async fn find(&self, query: &QueryDescriptor, projection: &Projection) -> Result<Vec<Record>> {
        let mut find = self
            .collection
            .find(filter_document(&query.predicates)?)
            .skip(query.skip);

        if let Some(field) = &query.sort_field {
            find = find.sort(doc! { field: query.sort_direction.as_i32() });
        }
        if query.limit != 0 {
            find = find.limit(query.limit);
        }
        if let Some(projection) = projection_document(projection) {
            find = find.projection(projection);
        }

        let cursor = find
            .await
            .map_err(|e| anyhow!("Failed to find records: {}", e))?;
        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect records: {}", e))?;

        Ok(documents.into_iter().map(document_to_record).collect())
    }

    async fn count(&self, predicates: &[Predicate]) -> Result<u64> {
        self.collection
            .count_documents(filter_document(predicates)?)
            .await
            .map_err(|e| anyhow!("Failed to count records: {}", e))
    }

    async fn find_one(
        &self,
        predicates: &[Predicate],
        projection: &Projection,
    ) -> Result<Option<Record>> {
        let mut find_one = self.collection.find_one(filter_document(predicates)?);
        if let Some(projection) = projection_document(projection) {
            find_one = find_one.projection(projection);
        }

        let document = find_one
            .await
            .map_err(|e| anyhow!("Failed to find record: {}", e))?;

        Ok(document.map(document_to_record))
    }

    async fn create(&self, data: Record) -> Result<Record> {
        let mut document = record_to_document(&data)?;
        if !document.contains_key(MONGO_ID) {
            document.insert(MONGO_ID, ObjectId::new());
        }

        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| anyhow!("Failed to create record: {}", e))?;

        Ok(document_to_record(document))
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let mut document = record_to_document(&record)?;
        let id = document
            .remove(MONGO_ID)
            .ok_or_else(|| anyhow!("Record has no '{}' field", MONGO_ID))?;

        let result = self
            .collection
            .update_one(doc! { MONGO_ID: id.clone() }, doc! { "$set": document })
            .await
            .map_err(|e| anyhow!("Failed to save record: {}", e))?;

        if result.matched_count == 0 {
            return Err(anyhow!("No record found for {}", id));
        }

        Ok(record)
    }

    async fn delete_one(&self, predicates: &[Predicate]) -> Result<()> {
        self.collection
            .delete_one(filter_document(predicates)?)
            .await
            .map_err(|e| anyhow!("Failed to delete record: {}", e))?;

        Ok(())
    }
}
