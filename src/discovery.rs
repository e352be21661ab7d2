//! Model candidate discovery across the two generative API surfaces.
//!
//! Both listing calls run concurrently and independently; a failure on one
//! surface (transport error, non-2xx, malformed body) degrades that surface to
//! an empty contribution instead of failing the whole discovery. Results are
//! merged into a `BTreeMap` so downstream iteration order is lexicographic by
//! model id rather than whatever a hash map happens to expose.

use crate::http::{create_client_with_timeout, LISTING_TIMEOUT};
use reqwest::Client;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Default base URLs for the two independently versioned API surfaces.
pub const DEFAULT_V1BETA_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_V1_URL: &str = "https://generativelanguage.googleapis.com/v1";

/// Which backend API surface a model is reachable through.
///
/// `V1Beta` is the primary surface (new models land there first); `V1` is the
/// secondary, stable surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiSurface {
    V1Beta,
    V1,
}

impl ApiSurface {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiSurface::V1Beta => "v1beta",
            ApiSurface::V1 => "v1",
        }
    }
}

/// Model id mapped to the set of surfaces that can generate with it.
pub type Availability = BTreeMap<String, BTreeSet<ApiSurface>>;

/// Discovers which models currently support generation.
#[derive(Clone)]
pub struct ModelDiscovery {
    client: Client,
    v1beta_url: String,
    v1_url: String,
    api_key: String,
}

impl ModelDiscovery {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: create_client_with_timeout(LISTING_TIMEOUT),
            v1beta_url: DEFAULT_V1BETA_URL.to_string(),
            v1_url: DEFAULT_V1_URL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn with_v1beta_url(mut self, url: &str) -> Self {
        self.v1beta_url = url.to_string();
        self
    }

    pub fn with_v1_url(mut self, url: &str) -> Self {
        self.v1_url = url.to_string();
        self
    }

    fn base_url(&self, surface: ApiSurface) -> &str {
        match surface {
            ApiSurface::V1Beta => &self.v1beta_url,
            ApiSurface::V1 => &self.v1_url,
        }
    }

    /// Best-effort discovery: both surfaces listed concurrently, partial
    /// results are valid.
    pub async fn discover(&self) -> Availability {
        let (v1beta, v1) = tokio::join!(
            self.fetch_surface(ApiSurface::V1Beta),
            self.fetch_surface(ApiSurface::V1)
        );

        let mut availability = Availability::new();
        for (surface, result) in [(ApiSurface::V1Beta, v1beta), (ApiSurface::V1, v1)] {
            match result {
                Ok(ids) => {
                    for id in ids {
                        availability.entry(id).or_default().insert(surface);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        surface = surface.as_str(),
                        error = %e,
                        "model listing failed; treating surface as empty"
                    );
                }
            }
        }

        tracing::debug!(models = availability.len(), "model discovery complete");
        availability
    }

    /// List one surface, keeping only models whose capability set includes
    /// generation.
    async fn fetch_surface(&self, surface: ApiSurface) -> Result<Vec<String>, reqwest::Error> {
        let url = format!("{}/models", self.base_url(surface));
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        // Non-error statuses without a listing body (e.g. 304) fail the JSON
        // parse below and degrade the surface like any other failure.
        let data: Value = response.json().await?;
        let models = data["models"].as_array().cloned().unwrap_or_default();

        Ok(models
            .iter()
            .filter_map(|model| {
                let name = model["name"].as_str()?;
                let methods = model["supportedGenerationMethods"].as_array()?;
                let generates = methods
                    .iter()
                    .any(|method| method.as_str() == Some("generateContent"));
                if generates {
                    Some(name.strip_prefix("models/").unwrap_or(name).to_string())
                } else {
                    None
                }
            })
            .collect())
    }
}
