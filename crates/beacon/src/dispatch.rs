//! Emergency alert fan-out.
//!
//! Delivers one fixed-format message, containing a live map link, to every
//! registered contact. Contacts are processed strictly in order and one at
//! a time so that OS-level intents never overlap; a failure for one contact
//! is logged and never blocks the rest of the list.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::channel::{chat_uri, tel_uri, TextChannel, UriOpener};
use crate::config::DispatchConfig;
use crate::contact::EmergencyContact;
use crate::error::{Error, Result};
use crate::haptics::{HapticPattern, Haptics};
use crate::location::Coordinates;

/// Build the alert message for a location snapshot.
///
/// A single fixed format: alert phrase followed by a map link.
#[must_use]
pub fn alert_message(coords: &Coordinates) -> String {
    format!(
        "EMERGENCY ALERT! I need help. My current location: {}",
        coords.maps_url()
    )
}

/// Outcome of one channel attempt for one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The channel accepted the message.
    Sent,
    /// The text channel was unusable; a voice call was placed instead.
    VoiceFallback,
    /// The channel was not attempted (no handler, disabled, or undialable).
    Skipped,
    /// The channel and its fallback both failed.
    Failed(String),
}

impl ChannelOutcome {
    /// Whether this outcome reached the contact through any mechanism.
    #[must_use]
    pub fn reached(&self) -> bool {
        matches!(self, Self::Sent | Self::VoiceFallback)
    }
}

/// Per-contact delivery outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactOutcome {
    /// Id of the contact.
    pub contact_id: String,
    /// Name of the contact (for log/report display).
    pub name: String,
    /// Outcome of the text channel (channel A), including voice fallback.
    pub text: ChannelOutcome,
    /// Outcome of the chat deep link (channel B).
    pub chat: ChannelOutcome,
}

/// Result of one full fan-out. Informational only; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Per-contact outcomes, in dispatch order.
    pub outcomes: Vec<ContactOutcome>,
    /// When the fan-out finished.
    pub completed_at: DateTime<Utc>,
}

impl DispatchReport {
    /// Number of contacts reached through at least one channel.
    #[must_use]
    pub fn reached(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.text.reached() || o.chat.reached())
            .count()
    }

    /// Number of contacts processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Sequential multi-channel contact dispatcher.
///
/// Channel policy per contact: text message first (falling back to a voice
/// call when the text channel is unusable), a fixed delay, then a
/// best-effort chat-app deep link.
pub struct Dispatcher {
    text: Arc<dyn TextChannel>,
    uris: Arc<dyn UriOpener>,
    haptics: Arc<dyn Haptics>,
    inter_channel_delay: Duration,
    chat_links_enabled: bool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("text_channel", &self.text.name())
            .field("inter_channel_delay", &self.inter_channel_delay)
            .field("chat_links_enabled", &self.chat_links_enabled)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher over the given capabilities.
    #[must_use]
    pub fn new(
        text: Arc<dyn TextChannel>,
        uris: Arc<dyn UriOpener>,
        haptics: Arc<dyn Haptics>,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            text,
            uris,
            haptics,
            inter_channel_delay: Duration::from_millis(config.inter_channel_delay_ms),
            chat_links_enabled: config.chat_links_enabled,
        }
    }

    /// Alert every contact, in list order.
    ///
    /// Runs to completion once started; per-contact failures are logged and
    /// swallowed. Fires the completion haptic after the last contact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocationUnavailable`] before any channel attempt
    /// when no location snapshot is supplied; a message without a location
    /// link would be useless.
    pub async fn dispatch(
        &self,
        contacts: &[EmergencyContact],
        location: Option<Coordinates>,
    ) -> Result<DispatchReport> {
        let coords = location.ok_or(Error::LocationUnavailable)?;
        let message = alert_message(&coords);

        info!(
            contacts = contacts.len(),
            position = %coords,
            "dispatching emergency alert"
        );

        let mut outcomes = Vec::with_capacity(contacts.len());
        for contact in contacts {
            outcomes.push(self.notify_contact(contact, &message).await);
        }

        self.haptics.vibrate(HapticPattern::DispatchComplete);

        let report = DispatchReport {
            outcomes,
            completed_at: Utc::now(),
        };
        info!(
            reached = report.reached(),
            total = report.total(),
            "dispatch complete"
        );
        Ok(report)
    }

    /// Run the full channel sequence for one contact.
    ///
    /// Never returns an error; whatever goes wrong is recorded in the
    /// outcome and logged, so the remaining contacts still get their turn.
    async fn notify_contact(&self, contact: &EmergencyContact, message: &str) -> ContactOutcome {
        let phone = contact.normalized_phone();
        if phone.is_empty() {
            warn!(
                contact = %contact.name,
                "contact has no dialable digits, skipping all channels"
            );
            return ContactOutcome {
                contact_id: contact.id.clone(),
                name: contact.name.clone(),
                text: ChannelOutcome::Failed("no dialable digits".to_string()),
                chat: ChannelOutcome::Skipped,
            };
        }

        let text = self.send_text(&phone, message, &contact.name).await;

        let chat = if self.chat_links_enabled {
            // Let the first intent settle before raising the next one.
            sleep(self.inter_channel_delay).await;
            self.send_chat_link(&phone, message, &contact.name).await
        } else {
            ChannelOutcome::Skipped
        };

        ContactOutcome {
            contact_id: contact.id.clone(),
            name: contact.name.clone(),
            text,
            chat,
        }
    }

    /// Channel A: text message, with voice-call fallback.
    async fn send_text(&self, phone: &str, message: &str, name: &str) -> ChannelOutcome {
        if self.text.is_available().await {
            match self.text.send(phone, message).await {
                Ok(()) => {
                    debug!(contact = %name, channel = self.text.name(), "text sent");
                    return ChannelOutcome::Sent;
                }
                Err(e) => {
                    warn!(contact = %name, error = %e, "text channel failed, falling back to voice call");
                }
            }
        } else {
            debug!(contact = %name, "text channel unavailable, falling back to voice call");
        }

        self.place_call(phone, name).await
    }

    /// Ultimate channel-A fallback: raise a voice-call URI.
    async fn place_call(&self, phone: &str, name: &str) -> ChannelOutcome {
        match self.uris.open(&tel_uri(phone)).await {
            Ok(()) => {
                debug!(contact = %name, "voice call placed");
                ChannelOutcome::VoiceFallback
            }
            Err(e) => {
                warn!(contact = %name, error = %e, "voice call fallback failed");
                ChannelOutcome::Failed(e.to_string())
            }
        }
    }

    /// Channel B: chat-app deep link, best-effort with no further fallback.
    async fn send_chat_link(&self, phone: &str, message: &str, name: &str) -> ChannelOutcome {
        let uri = chat_uri(phone, message);
        if !self.uris.can_open(&uri).await {
            debug!(contact = %name, "no chat app handler, skipping deep link");
            return ChannelOutcome::Skipped;
        }

        match self.uris.open(&uri).await {
            Ok(()) => {
                debug!(contact = %name, "chat deep link opened");
                ChannelOutcome::Sent
            }
            Err(e) => {
                // Channel A already gave a baseline guarantee.
                warn!(contact = %name, error = %e, "chat deep link failed, skipping");
                ChannelOutcome::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every channel call in arrival order.
    #[derive(Debug, Default)]
    struct Transcript {
        events: Mutex<Vec<String>>,
    }

    impl Transcript {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[derive(Debug)]
    struct FakeText {
        transcript: Arc<Transcript>,
        available: bool,
        failing_phones: HashSet<String>,
    }

    impl FakeText {
        fn new(transcript: Arc<Transcript>) -> Self {
            Self {
                transcript,
                available: true,
                failing_phones: HashSet::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl TextChannel for FakeText {
        fn name(&self) -> &'static str {
            "fake-text"
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn send(&self, phone: &str, body: &str) -> Result<()> {
            if self.failing_phones.contains(phone) {
                return Err(Error::channel("fake-text", format!("send to {phone} failed")));
            }
            self.transcript.push(format!("text:{phone}:{body}"));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FakeOpener {
        transcript: Arc<Transcript>,
        chat_handler: bool,
        failing_uris: HashSet<String>,
    }

    impl FakeOpener {
        fn new(transcript: Arc<Transcript>) -> Self {
            Self {
                transcript,
                chat_handler: true,
                failing_uris: HashSet::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl UriOpener for FakeOpener {
        async fn can_open(&self, uri: &str) -> bool {
            if uri.starts_with("whatsapp://") {
                self.chat_handler
            } else {
                true
            }
        }

        async fn open(&self, uri: &str) -> Result<()> {
            if self.failing_uris.contains(uri) {
                return Err(Error::channel("uri", "handler crashed"));
            }
            self.transcript.push(format!("open:{uri}"));
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct CountingHaptics {
        complete: AtomicUsize,
        cancelled: AtomicUsize,
    }

    impl Haptics for CountingHaptics {
        fn vibrate(&self, pattern: HapticPattern) {
            match pattern {
                HapticPattern::DispatchComplete => {
                    self.complete.fetch_add(1, Ordering::SeqCst);
                }
                HapticPattern::Cancelled => {
                    self.cancelled.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }

    struct Harness {
        transcript: Arc<Transcript>,
        haptics: Arc<CountingHaptics>,
        dispatcher: Dispatcher,
    }

    fn harness_with(
        text_mod: impl FnOnce(&mut FakeText),
        uri_mod: impl FnOnce(&mut FakeOpener),
    ) -> Harness {
        let transcript = Arc::new(Transcript::default());
        let mut text = FakeText::new(Arc::clone(&transcript));
        text_mod(&mut text);
        let mut opener = FakeOpener::new(Arc::clone(&transcript));
        uri_mod(&mut opener);
        let haptics = Arc::new(CountingHaptics::default());

        let dispatcher = Dispatcher::new(
            Arc::new(text),
            Arc::new(opener),
            Arc::clone(&haptics) as Arc<dyn Haptics>,
            &DispatchConfig::default(),
        );
        Harness {
            transcript,
            haptics,
            dispatcher,
        }
    }

    fn harness() -> Harness {
        harness_with(|_| {}, |_| {})
    }

    fn contact(id: &str, name: &str, phone: &str) -> EmergencyContact {
        EmergencyContact::new(id, name, phone, "Contact")
    }

    fn bangalore() -> Coordinates {
        Coordinates::new(12.9716, 77.5946)
    }

    #[test]
    fn test_alert_message_contains_map_link() {
        let message = alert_message(&bangalore());
        assert_eq!(
            message,
            "EMERGENCY ALERT! I need help. My current location: \
             https://www.google.com/maps?q=12.9716,77.5946"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_location_aborts_before_any_attempt() {
        let h = harness();
        let contacts = [contact("1", "Helpline", "100")];

        let result = h.dispatcher.dispatch(&contacts, None).await;

        assert!(result.unwrap_err().is_location_unavailable());
        assert!(h.transcript.events().is_empty());
        assert_eq!(h.haptics.complete.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_contacts_completes_and_signals() {
        let h = harness();

        let report = h.dispatcher.dispatch(&[], Some(bangalore())).await.unwrap();

        assert_eq!(report.total(), 0);
        assert!(h.transcript.events().is_empty());
        assert_eq!(h.haptics.complete.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_single_contact() {
        let h = harness();
        let contacts = [contact("1", "Helpline", "100")];

        let report = h
            .dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        let events = h.transcript.events();
        assert_eq!(events.len(), 2);
        // Channel A first, then (after the delay) channel B.
        assert!(events[0].starts_with("text:100:"));
        assert!(events[0].contains("https://www.google.com/maps?q=12.9716,77.5946"));
        assert!(events[1].starts_with("open:whatsapp://send?phone=100&text="));
        // Completion haptic fires exactly once.
        assert_eq!(h.haptics.complete.load(Ordering::SeqCst), 1);
        assert_eq!(report.reached(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_contacts_processed_in_order() {
        let h = harness();
        let contacts = [
            contact("1", "First", "111"),
            contact("2", "Second", "222"),
            contact("3", "Third", "333"),
        ];

        h.dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        let phones: Vec<String> = h
            .transcript
            .events()
            .iter()
            .filter(|e| e.starts_with("text:"))
            .map(|e| e.split(':').nth(1).unwrap().to_string())
            .collect();
        assert_eq!(phones, ["111", "222", "333"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_contact_does_not_block_others() {
        let h = harness_with(
            |text| {
                // B's sends always blow up.
                text.failing_phones.insert("999".to_string());
            },
            |uris| {
                // And so does B's voice-call fallback.
                uris.failing_uris.insert("tel:999".to_string());
            },
        );
        let contacts = [contact("1", "A", "111"), contact("2", "B", "999")];

        let report = h
            .dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        assert_eq!(report.outcomes[0].text, ChannelOutcome::Sent);
        assert!(matches!(report.outcomes[1].text, ChannelOutcome::Failed(_)));
        // A was reached despite B failing.
        assert!(h
            .transcript
            .events()
            .iter()
            .any(|e| e.starts_with("text:111:")));
        assert_eq!(h.haptics.complete.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_contact_first_in_list() {
        let h = harness_with(
            |text| {
                text.failing_phones.insert("999".to_string());
            },
            |uris| {
                uris.failing_uris.insert("tel:999".to_string());
            },
        );
        let contacts = [contact("1", "B", "999"), contact("2", "A", "111")];

        let report = h
            .dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        assert!(matches!(report.outcomes[0].text, ChannelOutcome::Failed(_)));
        assert_eq!(report.outcomes[1].text, ChannelOutcome::Sent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_text_channel_falls_back_to_call() {
        let h = harness_with(
            |text| {
                text.available = false;
            },
            |_| {},
        );
        let contacts = [contact("1", "Helpline", "100")];

        let report = h
            .dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        assert_eq!(report.outcomes[0].text, ChannelOutcome::VoiceFallback);
        assert!(h
            .transcript
            .events()
            .iter()
            .any(|e| e == "open:tel:100"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_link_skipped_without_handler() {
        let h = harness_with(
            |_| {},
            |uris| {
                uris.chat_handler = false;
            },
        );
        let contacts = [contact("1", "Helpline", "100")];

        let report = h
            .dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        assert_eq!(report.outcomes[0].chat, ChannelOutcome::Skipped);
        assert!(!h
            .transcript
            .events()
            .iter()
            .any(|e| e.contains("whatsapp")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_links_disabled_by_config() {
        let transcript = Arc::new(Transcript::default());
        let haptics = Arc::new(CountingHaptics::default());
        let dispatcher = Dispatcher::new(
            Arc::new(FakeText::new(Arc::clone(&transcript))),
            Arc::new(FakeOpener::new(Arc::clone(&transcript))),
            Arc::clone(&haptics) as Arc<dyn Haptics>,
            &DispatchConfig {
                chat_links_enabled: false,
                ..DispatchConfig::default()
            },
        );
        let contacts = [contact("1", "Helpline", "100")];

        let report = dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        assert_eq!(report.outcomes[0].chat, ChannelOutcome::Skipped);
        assert_eq!(transcript.events().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undialable_contact_skips_all_channels() {
        let h = harness();
        let contacts = [contact("1", "Nobody", "---"), contact("2", "A", "111")];

        let report = h
            .dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        assert!(matches!(report.outcomes[0].text, ChannelOutcome::Failed(_)));
        assert_eq!(report.outcomes[0].chat, ChannelOutcome::Skipped);
        assert_eq!(report.reached(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_normalized_phone_used_in_channels() {
        let h = harness();
        let contacts = [contact("1", "Aunt May", "+1 (555) 123-4567")];

        h.dispatcher
            .dispatch(&contacts, Some(bangalore()))
            .await
            .unwrap();

        let events = h.transcript.events();
        assert!(events[0].starts_with("text:15551234567:"));
        assert!(events[1].contains("phone=15551234567"));
    }

    #[test]
    fn test_channel_outcome_reached() {
        assert!(ChannelOutcome::Sent.reached());
        assert!(ChannelOutcome::VoiceFallback.reached());
        assert!(!ChannelOutcome::Skipped.reached());
        assert!(!ChannelOutcome::Failed("x".to_string()).reached());
    }

    #[test]
    fn test_dispatcher_debug() {
        let transcript = Arc::new(Transcript::default());
        let dispatcher = Dispatcher::new(
            Arc::new(FakeText::new(Arc::clone(&transcript))),
            Arc::new(FakeOpener::new(transcript)),
            Arc::new(CountingHaptics::default()),
            &DispatchConfig::default(),
        );
        let debug_str = format!("{dispatcher:?}");
        assert!(debug_str.contains("Dispatcher"));
        assert!(debug_str.contains("fake-text"));
    }
}
