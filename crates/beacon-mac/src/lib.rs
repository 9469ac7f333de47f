//! macOS-specific implementation for beacon.
//!
//! This crate provides macOS-specific functionality for the beacon project:
//! handing `sms:`, `tel:` and chat-app URIs to Launch Services via the
//! `open` command. `sms:` URIs are only serviceable when Messages.app is
//! installed, so availability is probed rather than assumed.

#![cfg(target_os = "macos")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Path of the system Messages application, the default `sms:` handler.
const MESSAGES_APP_PATH: &str = "/System/Applications/Messages.app";

/// Errors from launching URIs through Launch Services.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The `open` command could not be spawned.
    #[error("failed to spawn open: {0}")]
    Spawn(#[from] std::io::Error),

    /// `open` exited with a non-zero status.
    #[error("open exited with status {status} for URI scheme '{scheme}'")]
    OpenerFailed {
        /// Exit status reported by `open`.
        status: i32,
        /// Scheme of the URI that failed (the full URI is not echoed back,
        /// it may contain a phone number).
        scheme: String,
    },
}

/// Result type for launch operations.
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Initialize macOS-specific components.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Initializing macOS platform components");
    Ok(())
}

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "macOS"
}

/// Check whether the text-message channel is serviceable on this machine.
///
/// Messages.app answers `sms:` URIs; without it the caller should fall
/// back to a voice call.
#[must_use]
pub fn text_channel_available() -> bool {
    Path::new(MESSAGES_APP_PATH).exists()
}

/// Check whether a URI of this kind can be handed to Launch Services.
///
/// `sms:` URIs are gated on Messages.app being present; everything else is
/// left to Launch Services to resolve at open time.
#[must_use]
pub fn can_launch_uri(uri: &str) -> bool {
    if uri_scheme(uri) == "sms" {
        text_channel_available()
    } else {
        true
    }
}

/// Hand a URI to Launch Services.
///
/// # Errors
///
/// Returns an error if `open` cannot be spawned or reports failure (for
/// example, no application is registered for the URI's scheme).
pub fn launch_uri(uri: &str) -> Result<()> {
    let scheme = uri_scheme(uri);
    debug!(scheme, "launching URI via open");

    let status = Command::new("open").arg(uri).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(LaunchError::OpenerFailed {
            status: status.code().unwrap_or(-1),
            scheme: scheme.to_string(),
        })
    }
}

fn uri_scheme(uri: &str) -> &str {
    uri.split(':').next().unwrap_or("")
}
