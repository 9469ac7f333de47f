//! Error types for beacon.
//!
//! This module defines all error types used throughout the beacon crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for beacon operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Alert Errors ===
    /// An alert countdown is already active for this session.
    #[error("an alert countdown is already active")]
    AlertActive,

    /// No location snapshot is available; dispatch cannot proceed.
    #[error("current location is unavailable; cannot build a location link")]
    LocationUnavailable,

    /// A delivery channel failed for one contact.
    #[error("channel '{channel}' failed: {message}")]
    Channel {
        /// Name of the channel that failed.
        channel: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    // === Capability Errors ===
    /// A required device capability permission was denied.
    #[error("permission denied for {capability}. {instructions}")]
    PermissionDenied {
        /// Name of the capability (location, microphone, ...).
        capability: String,
        /// Instructions for granting the permission.
        instructions: String,
    },

    // === Contact Errors ===
    /// A required input field was left empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// No contact with the given id exists.
    #[error("no contact with id '{id}'")]
    ContactNotFound {
        /// The id that was looked up.
        id: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Preference Errors ===
    /// The persisted theme preference could not be parsed.
    #[error("unrecognized theme preference '{value}' (expected 'light' or 'dark')")]
    PreferenceParse {
        /// The value found in the preference file.
        value: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for beacon operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new channel error.
    #[must_use]
    pub fn channel(channel: &'static str, message: impl Into<String>) -> Self {
        Self::Channel {
            channel,
            message: message.into(),
        }
    }

    /// Create a permission denied error with instructions.
    #[must_use]
    pub fn permission_denied(
        capability: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self::PermissionDenied {
            capability: capability.into(),
            instructions: instructions.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means no location was available.
    #[must_use]
    pub fn is_location_unavailable(&self) -> bool {
        matches!(self, Self::LocationUnavailable)
    }

    /// Check if this error is a permission issue.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Check if this error is local to a single delivery channel.
    ///
    /// Channel errors are caught per contact and never abort the fan-out.
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(self, Self::Channel { .. })
    }
}
