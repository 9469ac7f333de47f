//! Location capability abstraction.
//!
//! The alert flow only ever consumes a coordinate snapshot; permission
//! prompts, caching and retries belong to the capability implementation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// A shareable map link for this position.
    #[must_use]
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A source of the device's current position.
///
/// Implementations decide how a snapshot is obtained (OS location service,
/// pinned configuration, test double); the alert flow treats the capability
/// as opaque.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    /// The name of this provider (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Ask the platform for permission to read the position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] when the user refuses.
    async fn request_permission(&self) -> Result<()>;

    /// Take one snapshot of the current position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocationUnavailable`] when no position can be
    /// resolved, or [`Error::PermissionDenied`] when access was refused.
    async fn current_location(&self) -> Result<Coordinates>;
}

/// A provider pinned to fixed coordinates (or to none at all).
///
/// Desktop machines have no location service; coordinates come from
/// configuration or CLI flags instead. Also serves as the test double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation {
    coords: Option<Coordinates>,
}

impl FixedLocation {
    /// A provider that always reports the given position.
    #[must_use]
    pub fn new(coords: Coordinates) -> Self {
        Self {
            coords: Some(coords),
        }
    }

    /// A provider with no position at all.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { coords: None }
    }
}

#[async_trait::async_trait]
impl LocationProvider for FixedLocation {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn request_permission(&self) -> Result<()> {
        Ok(())
    }

    async fn current_location(&self) -> Result<Coordinates> {
        self.coords.ok_or(Error::LocationUnavailable)
    }
}
