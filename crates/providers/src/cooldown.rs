//! Cooldown gate — exponential backoff after provider throttling.
//!
//! Tracks consecutive throttling errors for one provider and refuses calls
//! until the cooldown window has passed. Non-throttling errors leave the
//! state untouched. The window doubles with every consecutive throttle up
//! to a ceiling: 60s, 120s, 240s, ..., capped at 600s with the defaults.

use aula_core::error::ProviderError;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Per-provider throttling state.
///
/// Interior-mutable and mutex-guarded: the gateway serves requests
/// concurrently and the read-modify-write on a throttle burst must not
/// lose updates.
pub struct CooldownGate {
    base: Duration,
    max: Duration,
    reset_on_success: bool,
    state: Mutex<GateState>,
}

#[derive(Default)]
struct GateState {
    cooldown_until: Option<Instant>,
    consecutive_throttles: u32,
}

impl CooldownGate {
    /// Create a gate with the given base and ceiling cooldowns.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            reset_on_success: false,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Reset the consecutive-throttle counter when a call succeeds.
    ///
    /// Off by default: the counter then only ever grows, so a provider that
    /// throttles again after a quiet period restarts at the longer window.
    pub fn with_reset_on_success(mut self, reset: bool) -> Self {
        self.reset_on_success = reset;
        self
    }

    /// Whether the provider may be attempted right now.
    pub fn can_call(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.cooldown_until {
            Some(until) => {
                let now = Instant::now();
                if now < until {
                    info!(
                        remaining_secs = (until - now).as_secs(),
                        "Provider in cooldown"
                    );
                    false
                } else {
                    true
                }
            }
            None => true,
        }
    }

    /// Remaining cooldown, if any.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .cooldown_until
            .and_then(|until| until.checked_duration_since(Instant::now()))
    }

    /// Inspect a call error. Throttling starts (or extends) the cooldown;
    /// anything else is the caller's problem and does not touch the state.
    pub fn on_error(&self, error: &ProviderError) {
        if !error.is_throttle() {
            return;
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.consecutive_throttles += 1;

        let exponent = state.consecutive_throttles.saturating_sub(1).min(31);
        let backoff = self
            .base
            .checked_mul(1u32 << exponent)
            .map(|d| d.min(self.max))
            .unwrap_or(self.max);

        state.cooldown_until = Some(Instant::now() + backoff);
        warn!(
            consecutive = state.consecutive_throttles,
            cooldown_secs = backoff.as_secs(),
            "Provider throttled, entering cooldown"
        );
    }

    /// Record a successful call.
    pub fn on_success(&self) {
        if !self.reset_on_success {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.consecutive_throttles = 0;
        state.cooldown_until = None;
    }

    /// Number of consecutive throttling errors seen so far.
    pub fn consecutive_throttles(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .consecutive_throttles
    }
}
