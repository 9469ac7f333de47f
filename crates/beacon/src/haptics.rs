//! Haptic feedback patterns.
//!
//! The alert flow fires two distinguishable vibration patterns: a short one
//! acknowledging cancellation and a long one confirming that dispatch has
//! finished (completion, not just initiation).

use tracing::debug;

/// A named vibration pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticPattern {
    /// Short acknowledgement after the user cancels a countdown.
    Cancelled,
    /// Long confirmation after every contact has been processed.
    DispatchComplete,
}

impl HapticPattern {
    /// Alternating off/on segment durations in milliseconds.
    #[must_use]
    pub fn timings(&self) -> &'static [u64] {
        match self {
            Self::Cancelled => &[0, 100, 100, 100],
            Self::DispatchComplete => &[0, 500, 200, 500],
        }
    }
}

impl std::fmt::Display for HapticPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::DispatchComplete => write!(f, "dispatch_complete"),
        }
    }
}

/// Vibration primitive.
///
/// Firing a pattern is fire-and-forget; there is nothing useful to do when
/// a vibration motor misbehaves.
pub trait Haptics: Send + Sync {
    /// Fire the given pattern.
    fn vibrate(&self, pattern: HapticPattern);
}

/// A [`Haptics`] implementation that logs patterns instead of vibrating.
///
/// Desktop machines have no vibration motor; the log line stands in for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn vibrate(&self, pattern: HapticPattern) {
        debug!(%pattern, timings = ?pattern.timings(), "haptic feedback");
    }
}
