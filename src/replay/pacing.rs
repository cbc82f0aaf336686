use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Every timing constant a replay uses. Loaded from the `replay:` section of
/// the config file; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pacing {
    /// Human mode: delay after each keystroke, drawn from [min, max)
    #[serde(default = "default_keystroke_min")]
    pub keystroke_min_ms: u64,
    #[serde(default = "default_keystroke_max")]
    pub keystroke_max_ms: u64,

    /// Human mode: pause after each typed field, drawn from [min, max)
    #[serde(default = "default_field_gap_min")]
    pub field_gap_min_ms: u64,
    #[serde(default = "default_field_gap_max")]
    pub field_gap_max_ms: u64,

    /// Human mode: fixed pause after a directly-set field (select, checkbox, radio)
    #[serde(default = "default_select_pause")]
    pub select_pause_ms: u64,

    #[serde(default = "default_slow_gap")]
    pub slow_gap_ms: u64,

    #[serde(default = "default_paste_gap")]
    pub paste_gap_ms: u64,

    /// How long a filled field stays highlighted
    #[serde(default = "default_highlight")]
    pub highlight_ms: u64,

    /// Submit interceptor lifetime for human/slow
    #[serde(default = "default_timed_guard")]
    pub timed_guard_ms: u64,

    /// Submit interceptor lifetime for instant/silent/paste
    #[serde(default = "default_instant_guard")]
    pub instant_guard_ms: u64,

    #[serde(default = "default_notification")]
    pub notification_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            keystroke_min_ms: 30,
            keystroke_max_ms: 80,
            field_gap_min_ms: 100,
            field_gap_max_ms: 300,
            select_pause_ms: 150,
            slow_gap_ms: 300,
            paste_gap_ms: 100,
            highlight_ms: 1000,
            timed_guard_ms: 5000,
            instant_guard_ms: 500,
            notification_ms: 3000,
        }
    }
}

fn default_keystroke_min() -> u64 { 30 }
fn default_keystroke_max() -> u64 { 80 }
fn default_field_gap_min() -> u64 { 100 }
fn default_field_gap_max() -> u64 { 300 }
fn default_select_pause() -> u64 { 150 }
fn default_slow_gap() -> u64 { 300 }
fn default_paste_gap() -> u64 { 100 }
fn default_highlight() -> u64 { 1000 }
fn default_timed_guard() -> u64 { 5000 }
fn default_instant_guard() -> u64 { 500 }
fn default_notification() -> u64 { 3000 }

impl Pacing {
    /// All delays zero: strategies keep their ordering but never wait.
    pub fn immediate() -> Self {
        Self {
            keystroke_min_ms: 0,
            keystroke_max_ms: 0,
            field_gap_min_ms: 0,
            field_gap_max_ms: 0,
            select_pause_ms: 0,
            slow_gap_ms: 0,
            paste_gap_ms: 0,
            ..Self::default()
        }
    }

    pub fn keystroke_delay(&self) -> Duration {
        jitter(self.keystroke_min_ms, self.keystroke_max_ms)
    }

    pub fn field_gap(&self) -> Duration {
        jitter(self.field_gap_min_ms, self.field_gap_max_ms)
    }

    pub fn select_pause(&self) -> Duration {
        Duration::from_millis(self.select_pause_ms)
    }

    pub fn slow_gap(&self) -> Duration {
        Duration::from_millis(self.slow_gap_ms)
    }

    pub fn paste_gap(&self) -> Duration {
        Duration::from_millis(self.paste_gap_ms)
    }

    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    pub fn notification(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

/// Uniform delay in [min, max); a degenerate range yields `min`.
fn jitter(min: u64, max: u64) -> Duration {
    if max <= min {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::rng().random_range(min..max))
}
