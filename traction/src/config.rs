//! API configuration.

use serde::{Deserialize, Serialize};

use crate::sync::Endpoint;

/// Where models and collections fetch from.
///
/// Passed explicitly to every [`Endpoint`] that needs it; there is no
/// process-wide base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix for every resource URL, without a trailing slash.
    #[serde(default)]
    pub base_url: String,
}

impl ApiConfig {
    /// Create a new config with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint for the resource called `name` under this base URL.
    pub fn endpoint(&self, name: impl Into<String>) -> Endpoint {
        Endpoint::new(self, name)
    }
}
