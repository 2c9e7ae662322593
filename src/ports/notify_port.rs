//! Notification channel port trait.

use crate::domain::error::ScreenerError;

/// One text message per call; no delivery guarantee. Callers truncate to the
/// channel ceiling (see [`crate::domain::report::MAX_MESSAGE_LEN`]) first.
pub trait NotifyPort {
    fn send(&self, text: &str) -> Result<(), ScreenerError>;
}
