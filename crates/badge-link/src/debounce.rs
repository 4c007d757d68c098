//! Duplicate read suppression
//!
//! A badge left on the reader is read on every poll. The filter lets a new
//! code through at once and holds back repeats of the same code until the
//! cooldown has run out. The cooldown is counted in poll cycles: the polling
//! loop calls [`DebounceFilter::tick`] once per cycle, tag or no tag.

use std::time::Duration;

use badge_protocol::BadgeCode;

/// Default time a repeated badge is held back for
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Stateful repeat filter, owned by the polling loop
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    last_code: Option<BadgeCode>,
    cooldown_ticks: u32,
    window_ticks: u32,
}

impl DebounceFilter {
    /// Create a filter that holds repeats back for `window_ticks` cycles
    pub fn new(window_ticks: u32) -> Self {
        Self {
            last_code: None,
            cooldown_ticks: 0,
            window_ticks,
        }
    }

    /// Create a filter whose window covers `cooldown` at one tick per `cycle`
    pub fn with_window(cooldown: Duration, cycle: Duration) -> Self {
        let cycle_ms = cycle.as_millis().max(1);
        let ticks = cooldown.as_millis().div_ceil(cycle_ms);
        Self::new(u32::try_from(ticks).unwrap_or(u32::MAX))
    }

    /// Decide whether a read should be reported
    pub fn accept(&mut self, code: &BadgeCode) -> bool {
        if self.last_code.as_ref() != Some(code) || self.cooldown_ticks == 0 {
            self.last_code = Some(code.clone());
            self.cooldown_ticks = self.window_ticks;
            return true;
        }
        false
    }

    /// Count down one elapsed poll cycle
    pub fn tick(&mut self) {
        self.cooldown_ticks = self.cooldown_ticks.saturating_sub(1);
    }

    /// Forget the last code (e.g. after the reader went away)
    pub fn reset(&mut self) {
        self.last_code = None;
        self.cooldown_ticks = 0;
    }

    /// Cycles left before a repeat of the last code is reported again
    pub fn cooldown_ticks(&self) -> u32 {
        self.cooldown_ticks
    }

    /// Configured window in cycles
    pub fn window_ticks(&self) -> u32 {
        self.window_ticks
    }
}
