//! Linux-specific implementation for beacon.
//!
//! This crate provides Linux-specific functionality for the beacon project:
//! handing `sms:`, `tel:` and chat-app URIs to the desktop environment's
//! default handler via `xdg-open`.

#![cfg(target_os = "linux")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors from launching URIs through the desktop opener.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The opener binary could not be spawned.
    #[error("failed to spawn xdg-open: {0}")]
    Spawn(#[from] std::io::Error),

    /// The opener exited with a non-zero status.
    #[error("xdg-open exited with status {status} for URI scheme '{scheme}'")]
    OpenerFailed {
        /// Exit status reported by the opener.
        status: i32,
        /// Scheme of the URI that failed (the full URI is not echoed back,
        /// it may contain a phone number).
        scheme: String,
    },
}

/// Result type for launch operations.
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Initialize Linux-specific components.
///
/// # Errors
///
/// Returns an error if initialization fails.
pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    Ok(())
}

/// Get platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}

/// Check whether a URI of this kind can be handed to the desktop opener.
///
/// On Linux the URI-intent path is considered available whenever `xdg-open`
/// is on the `PATH`; which application answers a given scheme is the
/// desktop environment's business.
#[must_use]
pub fn can_launch_uri(_uri: &str) -> bool {
    opener_on_path()
}

/// Hand a URI to the desktop environment's default handler.
///
/// # Errors
///
/// Returns an error if `xdg-open` cannot be spawned or reports failure.
pub fn launch_uri(uri: &str) -> Result<()> {
    let scheme = uri_scheme(uri);
    debug!(scheme, "launching URI via xdg-open");

    let status = Command::new("xdg-open").arg(uri).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(LaunchError::OpenerFailed {
            status: status.code().unwrap_or(-1),
            scheme: scheme.to_string(),
        })
    }
}

fn opener_on_path() -> bool {
    Command::new("xdg-open")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

fn uri_scheme(uri: &str) -> &str {
    uri.split(':').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
    }

    #[test]
    fn test_platform_name() {
        assert_eq!(platform_name(), "Linux");
    }

    #[test]
    fn test_uri_scheme() {
        assert_eq!(uri_scheme("sms:100?body=hi"), "sms");
        assert_eq!(uri_scheme("tel:15551234567"), "tel");
        assert_eq!(uri_scheme("no-scheme"), "no-scheme");
        assert_eq!(uri_scheme(""), "");
    }

    #[test]
    fn test_launch_error_display() {
        let err = LaunchError::OpenerFailed {
            status: 3,
            scheme: "tel".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("status 3"));
        assert!(msg.contains("'tel'"));
    }
}
