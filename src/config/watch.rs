// ABOUTME: Timing knobs for the status polling loop.
// ABOUTME: Durations are written in humantime form (10s, 5m, 1h).

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Pause between two status queries.
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Give up after this long. Unset means wait forever.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Upper bound for a single status query.
    #[serde(default = "default_call_timeout", with = "humantime_serde")]
    pub call_timeout: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_call_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: None,
            call_timeout: default_call_timeout(),
        }
    }
}
