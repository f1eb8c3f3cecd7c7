//! Configuration loading and management

use crate::core::query::{ArrayFilterMode, DEFAULT_LIMIT};
use crate::core::record::Projection;
use crate::server::action::Action;
use anyhow::Result;
use serde::Deserialize;

/// Configuration of one REST resource
///
/// ```yaml
/// route: /posts
/// actions: [GET_LIST, GET_ONE, CREATE]
/// select: "title body author -secret"
/// default_limit: 50
/// array_filters: combine
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    /// Base route the resource is mounted under (e.g., "/posts")
    #[serde(default)]
    pub route: String,

    /// Enabled actions, all five when omitted
    #[serde(default = "default_actions")]
    pub actions: Vec<Action>,

    /// Field selection applied to every read
    #[serde(default)]
    pub select: Projection,

    /// Overrides the store's canonical identifier field
    #[serde(default)]
    pub identifier_field: Option<String>,

    /// Number of records listed when the client sends no range
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    /// How array-valued filters combine with other predicates
    #[serde(default)]
    pub array_filters: ArrayFilterMode,

    /// Expose the `Content-Range` header to cross-origin clients
    #[serde(default = "default_expose_content_range")]
    pub expose_content_range: bool,
}

fn default_actions() -> Vec<Action> {
    Action::ALL.to_vec()
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_expose_content_range() -> bool {
    true
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            route: String::new(),
            actions: default_actions(),
            select: Projection::all(),
            identifier_field: None,
            default_limit: DEFAULT_LIMIT,
            array_filters: ArrayFilterMode::default(),
            expose_content_range: true,
        }
    }
}

impl ResourceConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Identifier field to use for a store keyed by `store_identifier`
    pub fn identifier_field_or<'a>(&'a self, store_identifier: &'a str) -> &'a str {
        self.identifier_field.as_deref().unwrap_or(store_identifier)
    }
}
