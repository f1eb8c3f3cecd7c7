//! Core module containing the query compiler, storage contract and shared types

pub mod error;
pub mod identifier;
pub mod query;
pub mod record;
pub mod store;

pub use error::RestError;
pub use identifier::{generate_object_id, is_object_id};
pub use query::{
    ArrayFilterMode, FilterCompiler, ListParams, Predicate, QueryDescriptor, SortDirection,
};
pub use record::{Projection, Record};
pub use store::ResourceStore;
