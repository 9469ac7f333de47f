//! Delivery channel abstractions.
//!
//! A channel is a distinct OS-level or app-level mechanism for reaching a
//! contact: the platform text-message primitive, a chat-app deep link, or a
//! voice call. The dispatcher only sees the traits defined here.

use url::form_urlencoded;

use crate::error::Result;

/// The platform text-message channel (channel A).
///
/// On some platforms this is an always-available URI intent, on others a
/// runtime-probed native primitive; either way the dispatcher asks for
/// availability first and falls back to a voice call when the answer is no.
#[async_trait::async_trait]
pub trait TextChannel: Send + Sync {
    /// The name of this channel (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Whether the channel can be used on this device right now.
    async fn is_available(&self) -> bool;

    /// Send a text message to a normalized (digits-only) phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying send primitive fails.
    async fn send(&self, phone: &str, body: &str) -> Result<()>;
}

/// Generic URI-opening primitive.
///
/// Voice calls (`tel:`), chat-app deep links (`whatsapp://`) and the
/// URI-intent flavor of texting (`sms:`) all travel through this seam.
#[async_trait::async_trait]
pub trait UriOpener: Send + Sync {
    /// Whether a handler exists for this URI.
    async fn can_open(&self, uri: &str) -> bool;

    /// Hand the URI to its handler.
    ///
    /// # Errors
    ///
    /// Returns an error if no handler exists or the handler reports failure.
    async fn open(&self, uri: &str) -> Result<()>;
}

/// Build an `sms:` URI carrying a message body.
#[must_use]
pub fn sms_uri(phone: &str, body: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("body", body)
        .finish();
    format!("sms:{phone}?{query}")
}

/// Build a `tel:` URI for a voice call.
#[must_use]
pub fn tel_uri(phone: &str) -> String {
    format!("tel:{phone}")
}

/// Build the chat-app deep link for a contact and message.
#[must_use]
pub fn chat_uri(phone: &str, text: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("phone", phone)
        .append_pair("text", text)
        .finish();
    format!("whatsapp://send?{query}")
}

/// A [`TextChannel`] that sends through the platform's `sms:` URI intent.
///
/// This is the always-available flavor of channel A; the OS picks which
/// messaging application answers the intent.
#[derive(Debug, Clone)]
pub struct IntentTextChannel<O> {
    opener: O,
}

impl<O: UriOpener> IntentTextChannel<O> {
    /// Wrap a URI opener as a text channel.
    #[must_use]
    pub fn new(opener: O) -> Self {
        Self { opener }
    }
}

#[async_trait::async_trait]
impl<O: UriOpener> TextChannel for IntentTextChannel<O> {
    fn name(&self) -> &'static str {
        "sms-intent"
    }

    async fn is_available(&self) -> bool {
        self.opener.can_open("sms:").await
    }

    async fn send(&self, phone: &str, body: &str) -> Result<()> {
        self.opener.open(&sms_uri(phone, body)).await
    }
}
