//! Console notification adapter.
//!
//! Stands in for the real channel when none is configured, so a run on a
//! workstation still shows what would have been sent.

use crate::domain::error::ScreenerError;
use crate::ports::notify_port::NotifyPort;

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl NotifyPort for ConsoleNotifier {
    fn send(&self, text: &str) -> Result<(), ScreenerError> {
        println!("{text}");
        Ok(())
    }
}
