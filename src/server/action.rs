//! The five resource actions and their route bindings

use crate::server::handlers::{self, ResourceState};
use axum::routing::{MethodRouter, delete, get, post, put};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A CRUD action exposed for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// GET {route}
    GetList,
    /// GET {route}/{id}
    GetOne,
    /// POST {route}
    Create,
    /// PUT {route}/{id}
    Update,
    /// DELETE {route}/{id}
    Delete,
}

/// Path an action is mounted on, relative to the resource route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// The resource route itself
    Collection,
    /// The resource route followed by `/{id}`
    Item,
}

/// Returned when parsing an unknown action name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl Action {
    /// Every action, in registration order
    pub const ALL: [Action; 5] = [
        Action::GetList,
        Action::GetOne,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::GetList => "GET_LIST",
            Action::GetOne => "GET_ONE",
            Action::Create => "CREATE",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }

    pub fn target(self) -> RouteTarget {
        match self {
            Action::GetList | Action::Create => RouteTarget::Collection,
            Action::GetOne | Action::Update | Action::Delete => RouteTarget::Item,
        }
    }

    /// Method router serving this action
    pub fn method_router(self) -> MethodRouter<ResourceState> {
        match self {
            Action::GetList => get(handlers::get_list),
            Action::GetOne => get(handlers::get_one),
            Action::Create => post(handlers::create),
            Action::Update => put(handlers::update),
            Action::Delete => delete(handlers::delete_one),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
