//! Elevation provider seam.
//!
//! The catalog never computes elevations itself; it asks an external
//! provider through [`AltitudeService`] and propagates failures unchanged.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub trait AltitudeService {
    /// Elevation in meters for a single WGS84 point. No caching, no retry.
    fn altitude(&self, latitude: f64, longitude: f64) -> Result<f64>;
}

/// Adapter over the open-elevation lookup API, one blocking request per
/// point.
pub struct OpenElevationAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

const DEFAULT_BASE_URL: &str = "https://api.open-elevation.com";

#[derive(Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Deserialize)]
struct LookupResult {
    elevation: f64,
}

impl OpenElevationAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        OpenElevationAdapter {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenElevationAdapter {
    fn default() -> Self {
        OpenElevationAdapter::new(DEFAULT_BASE_URL)
    }
}

impl AltitudeService for OpenElevationAdapter {
    fn altitude(&self, latitude: f64, longitude: f64) -> Result<f64> {
        let url = format!(
            "{}/api/v1/lookup?locations={},{}",
            self.base_url, latitude, longitude
        );
        debug!(latitude, longitude, "elevation lookup");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Elevation(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Elevation(format!(
                "provider answered {}",
                response.status()
            )));
        }
        let body: LookupResponse = response
            .json()
            .map_err(|e| Error::Elevation(e.to_string()))?;
        body.results
            .first()
            .map(|r| r.elevation)
            .ok_or_else(|| Error::Elevation("empty result set".to_string()))
    }
}
