//! `beacon` - personal-safety emergency alert dispatcher
//!
//! This library provides the core emergency alert flow: a cancellable
//! countdown grace period, followed by sequential multi-channel delivery of
//! a location-bearing alert message to registered emergency contacts.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod contact;
pub mod dispatch;
pub mod error;
pub mod haptics;
pub mod location;
pub mod logging;
pub mod session;
pub mod theme;

pub mod cli;

pub use channel::{IntentTextChannel, TextChannel, UriOpener};
pub use config::Config;
pub use contact::{ContactBook, ContactDraft, EmergencyContact};
pub use dispatch::{ChannelOutcome, DispatchReport, Dispatcher};
pub use error::{Error, Result};
pub use haptics::{HapticPattern, Haptics, LogHaptics};
pub use location::{Coordinates, FixedLocation, LocationProvider};
pub use logging::init_logging;
pub use session::{AlertSession, SessionPhase};
pub use theme::{ThemeContext, ThemeMode, ThemeStore};
