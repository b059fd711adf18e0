//! Cooldown-based debouncing for refresh requests

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// What the caller should do with a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Refresh right away
    Now,
    /// Schedule one trailing refresh at the given instant
    Deferred(Instant),
    /// A trailing refresh is already scheduled
    Coalesced,
}

#[derive(Debug, Default)]
struct DebounceState {
    cooldown_until: Option<Instant>,
    trailing_scheduled: bool,
}

/// Leading-edge debouncer: the first call in a window runs immediately,
/// later calls in the same window collapse into a single trailing call.
#[derive(Debug)]
pub(crate) struct Debouncer {
    cooldown: Duration,
    state: Mutex<DebounceState>,
}

impl Debouncer {
    pub(crate) fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            state: Mutex::new(DebounceState::default()),
        }
    }

    pub(crate) async fn admit(&self) -> Admission {
        if self.cooldown.is_zero() {
            return Admission::Now;
        }

        let mut state = self.state.lock().await;
        let now = Instant::now();
        match state.cooldown_until {
            Some(until) if now < until => {
                if state.trailing_scheduled {
                    Admission::Coalesced
                } else {
                    state.trailing_scheduled = true;
                    Admission::Deferred(until)
                }
            }
            _ => {
                state.cooldown_until = Some(now + self.cooldown);
                Admission::Now
            }
        }
    }

    /// Called when the trailing refresh fires; opens a new cooldown window
    pub(crate) async fn start_trailing(&self) {
        let mut state = self.state.lock().await;
        state.trailing_scheduled = false;
        state.cooldown_until = Some(Instant::now() + self.cooldown);
    }
}
