//! Server module binding resource stores to HTTP routes
//!
//! This module provides a `ResourceRouter` that registers, for one store:
//! - list/get-one/create/update/delete handlers
//! - the middlewares guarding them
//! - pagination headers and identifier renaming on every response

pub mod action;
pub mod handlers;
pub mod resource;

pub use action::{Action, RouteTarget, UnknownAction};
pub use handlers::{ResourceSettings, ResourceState};
pub use resource::ResourceRouter;
