//! Alert session lifecycle: the cancellable grace period before dispatch.
//!
//! One [`AlertSession`] covers one emergency trigger. The countdown runs in
//! a single owned tokio task whose handle lives in the session; the handle
//! is destroyed on completion, on cancellation and on drop, so a session
//! can never leak a second timer.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, warn};

use crate::config::AlertConfig;
use crate::contact::EmergencyContact;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::haptics::{HapticPattern, Haptics};
use crate::location::LocationProvider;

const PHASE_IDLE: u8 = 0;
const PHASE_COUNTING_DOWN: u8 = 1;
const PHASE_DISPATCHING: u8 = 2;

/// Where a session currently stands.
///
/// `Idle → CountingDown → {Dispatching, Idle}`; `Idle` (after a cancel) and
/// `Dispatching` are terminal for a given session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No countdown running; the session can be triggered.
    Idle,
    /// The grace period is ticking; the user may still cancel.
    CountingDown,
    /// The count hit zero; dispatch runs to completion, uncancellable.
    Dispatching,
}

impl SessionPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            PHASE_COUNTING_DOWN => Self::CountingDown,
            PHASE_DISPATCHING => Self::Dispatching,
            _ => Self::Idle,
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::CountingDown => write!(f, "counting_down"),
            Self::Dispatching => write!(f, "dispatching"),
        }
    }
}

/// One emergency-trigger lifecycle.
pub struct AlertSession {
    ticks: u32,
    tick_interval: Duration,
    phase: Arc<AtomicU8>,
    remaining: Arc<AtomicU32>,
    dispatcher: Arc<Dispatcher>,
    location: Arc<dyn LocationProvider>,
    haptics: Arc<dyn Haptics>,
    timer: Option<JoinHandle<Option<DispatchReport>>>,
}

impl std::fmt::Debug for AlertSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertSession")
            .field("phase", &self.phase())
            .field("ticks", &self.ticks)
            .field("tick_interval", &self.tick_interval)
            .field("location_provider", &self.location.name())
            .finish_non_exhaustive()
    }
}

impl AlertSession {
    /// Create an idle session over the given collaborators.
    #[must_use]
    pub fn new(
        config: &AlertConfig,
        dispatcher: Arc<Dispatcher>,
        location: Arc<dyn LocationProvider>,
        haptics: Arc<dyn Haptics>,
    ) -> Self {
        Self {
            ticks: config.countdown_ticks,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            phase: Arc::new(AtomicU8::new(PHASE_IDLE)),
            remaining: Arc::new(AtomicU32::new(0)),
            dispatcher,
            location,
            haptics,
            timer: None,
        }
    }

    /// Current phase of the session.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Ticks left in the grace period, if one is running.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        if self.phase() == SessionPhase::CountingDown {
            Some(self.remaining.load(Ordering::SeqCst))
        } else {
            None
        }
    }

    /// Start the grace period; the given contacts will be alerted when it
    /// elapses.
    ///
    /// The location snapshot is taken when the countdown reaches zero, not
    /// here, so the freshest position goes into the message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AlertActive`] when a countdown is already
    /// running or dispatch has begun; the existing timer is untouched and
    /// no second one is created. Returns [`crate::Error::ConfigValidation`]
    /// when the session was built with zero ticks, which would mean an
    /// alert with no grace period.
    pub fn trigger(&mut self, contacts: Vec<EmergencyContact>) -> crate::Result<()> {
        if self.ticks == 0 {
            return Err(crate::Error::ConfigValidation {
                message: "countdown_ticks must be greater than 0".to_string(),
            });
        }
        if self
            .phase
            .compare_exchange(
                PHASE_IDLE,
                PHASE_COUNTING_DOWN,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(crate::Error::AlertActive);
        }

        self.remaining.store(self.ticks, Ordering::SeqCst);
        debug!(ticks = self.ticks, "countdown started");

        let phase = Arc::clone(&self.phase);
        let remaining = Arc::clone(&self.remaining);
        let dispatcher = Arc::clone(&self.dispatcher);
        let location = Arc::clone(&self.location);
        let tick_interval = self.tick_interval;

        self.timer = Some(tokio::spawn(async move {
            let mut ticker = interval(tick_interval);
            // The first tick of an interval fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let left = remaining.fetch_sub(1, Ordering::SeqCst) - 1;
                debug!(remaining = left, "countdown tick");
                if left == 0 {
                    break;
                }
            }

            // A cancellation that raced the final tick wins; the session is
            // already Idle again and nothing may be dispatched.
            if phase
                .compare_exchange(
                    PHASE_COUNTING_DOWN,
                    PHASE_DISPATCHING,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_err()
            {
                return None;
            }

            let snapshot = match location.current_location().await {
                Ok(coords) => Some(coords),
                Err(e) => {
                    warn!(error = %e, "no location snapshot at dispatch time");
                    None
                }
            };

            match dispatcher.dispatch(&contacts, snapshot).await {
                Ok(report) => Some(report),
                Err(e) => {
                    error!(error = %e, "dispatch aborted");
                    None
                }
            }
        }));

        Ok(())
    }

    /// Cancel the grace period.
    ///
    /// Idempotent: a no-op unless a countdown is running. Once dispatch has
    /// begun it runs to completion for all contacts.
    pub fn cancel(&mut self) {
        if self
            .phase
            .compare_exchange(
                PHASE_COUNTING_DOWN,
                PHASE_IDLE,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return;
        }

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.remaining.store(0, Ordering::SeqCst);
        self.haptics.vibrate(HapticPattern::Cancelled);
        debug!("countdown cancelled");
    }

    /// Wait for the session to finish.
    ///
    /// Returns the dispatch report when the countdown elapsed and dispatch
    /// ran, `None` when the session was cancelled or dispatch could not
    /// start (for example, no location).
    pub async fn wait(&mut self) -> Option<DispatchReport> {
        match self.timer.take() {
            Some(timer) => timer.await.ok().flatten(),
            None => None,
        }
    }
}

impl Drop for AlertSession {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
