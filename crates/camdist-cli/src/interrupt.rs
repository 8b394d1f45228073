//! Ctrl+C handling for the waits in the default command.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use anyhow::Result;
use tracing::info;

/// Ctrl+C flag whose sleeps wake up as soon as it is raised.
pub struct Interrupt {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl Interrupt {
    pub fn new() -> Self {
        Self {
            raised: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Create an interrupt raised by Ctrl+C.
    pub fn install() -> Result<Arc<Self>> {
        let interrupt = Arc::new(Self::new());
        let handler_interrupt = Arc::clone(&interrupt);
        ctrlc::set_handler(move || {
            info!("Received interrupt, stopping...");
            handler_interrupt.raise();
        })?;
        Ok(interrupt)
    }

    pub fn raise(&self) {
        // A poisoned lock still holds a usable flag
        let mut raised = self.raised.lock().unwrap_or_else(|e| e.into_inner());
        *raised = true;
        self.condvar.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep for `duration` unless raised first. Returns `true` if raised.
    pub fn sleep(&self, duration: Duration) -> bool {
        let guard = self.raised.lock().unwrap_or_else(|e| e.into_inner());
        let (raised, _) = self
            .condvar
            .wait_timeout_while(guard, duration, |raised| !*raised)
            .unwrap_or_else(|e| e.into_inner());
        *raised
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}
