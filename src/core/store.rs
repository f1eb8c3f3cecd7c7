//! Storage collaborator contract

use crate::core::query::{Predicate, QueryDescriptor};
use crate::core::record::{Projection, Record};
use anyhow::Result;
use async_trait::async_trait;

/// Capability interface a backing store must offer to be exposed over REST
///
/// The adapter is agnostic to the underlying storage mechanism: document
/// stores, relational tables and key-value stores can all implement it.
/// Predicates are AND-combined.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Name of the store's canonical identifier field (`_id` by default)
    fn identifier_field(&self) -> &str {
        crate::core::identifier::DEFAULT_IDENTIFIER_FIELD
    }

    /// Records matching the predicates, sorted, windowed and projected
    async fn find(&self, query: &QueryDescriptor, projection: &Projection) -> Result<Vec<Record>>;

    /// Number of records matching the predicates, ignoring any window
    async fn count(&self, predicates: &[Predicate]) -> Result<u64>;

    /// First record matching the predicates
    async fn find_one(
        &self,
        predicates: &[Predicate],
        projection: &Projection,
    ) -> Result<Option<Record>>;

    /// Insert a new record, generating its identifier when absent
    async fn create(&self, data: Record) -> Result<Record>;

    /// Persist the fields of `record` onto the stored record with the same identifier
    async fn save(&self, record: Record) -> Result<Record>;

    /// Delete the first record matching the predicates; no-op when none does
    async fn delete_one(&self, predicates: &[Predicate]) -> Result<()>;
}
