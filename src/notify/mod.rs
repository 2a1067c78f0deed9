//! Alert delivery.
//!
//! - `message`: renders the display table and the combined alert text
//! - `telegram`: delivers text through the Telegram Bot API

mod message;
mod telegram;

pub use message::{format_alert_message, format_display_line, ALERT_HEADER};
pub use telegram::TelegramNotifier;

use crate::error::AlertError;
use async_trait::async_trait;

/// Destination for a composed alert message.
///
/// Implementations must not panic: every transport or API failure is
/// returned as an `AlertError`, and missing credentials are reported as
/// `AlertError::ConfigMissing` before any network call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one message. `Ok(())` means the endpoint accepted it.
    async fn send(&self, text: &str) -> Result<(), AlertError>;
}
