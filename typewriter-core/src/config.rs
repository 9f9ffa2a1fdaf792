//! Run configuration.
//!
//! Every run receives its configuration by value; nothing here is global.
//! Durations are (de)serialized as whole milliseconds.

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::spans::SpanDelimiter;

pub const DEFAULT_RANDOM_MIN: Duration = Duration::from_millis(10);
pub const DEFAULT_RANDOM_MAX: Duration = Duration::from_millis(210);
pub const DEFAULT_FIXED_INCREMENT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("span delimiter markers must not be empty")]
    EmptyDelimiter,
    #[error("invalid delay range: min {min:?} must be below max {max:?}")]
    InvalidRange { min: Duration, max: Duration },
    #[error("invalid typing speed {0:?} (expected \"random\", \"<ms>\", or \"<min>-<max>\")")]
    InvalidSpeed(String),
    #[error("timer playback needs a non-zero delay between keystrokes")]
    ZeroTimerDelay,
}

/// How long to wait after each keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayPolicy {
    /// Uniform in `[min, max)`.
    Random {
        #[serde(with = "millis")]
        min: Duration,
        #[serde(with = "millis")]
        max: Duration,
    },
    /// `base` once before the first keystroke, then `increment` after each.
    Fixed {
        #[serde(with = "millis")]
        base: Duration,
        #[serde(with = "millis")]
        increment: Duration,
    },
}

impl Default for DelayPolicy {
    fn default() -> Self {
        DelayPolicy::Random {
            min: DEFAULT_RANDOM_MIN,
            max: DEFAULT_RANDOM_MAX,
        }
    }
}

impl DelayPolicy {
    pub fn fixed(increment: Duration) -> Self {
        DelayPolicy::Fixed {
            base: Duration::ZERO,
            increment,
        }
    }

    /// Parse the free-text "typing speed" setting.
    ///
    /// - `""` / `"random"` → default random range
    /// - `"120"` / `"120ms"` → fixed 120ms per keystroke
    /// - `"20-80"` → random in `[20ms, 80ms)`
    pub fn parse_speed(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim().to_lowercase();
        if trimmed.is_empty() || trimmed == "random" {
            return Ok(Self::default());
        }

        let invalid = || ConfigError::InvalidSpeed(input.to_string());
        let parse_ms = |s: &str| -> Result<Duration, ConfigError> {
            s.trim()
                .trim_end_matches("ms")
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| invalid())
        };

        let policy = match trimmed.split_once('-') {
            Some((lo, hi)) => DelayPolicy::Random {
                min: parse_ms(lo)?,
                max: parse_ms(hi)?,
            },
            None => DelayPolicy::fixed(parse_ms(&trimmed)?),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            DelayPolicy::Random { min, max } if min >= max => {
                Err(ConfigError::InvalidRange { min, max })
            }
            _ => Ok(()),
        }
    }

    /// Waited once before the first keystroke of a run.
    pub fn initial(&self) -> Duration {
        match *self {
            DelayPolicy::Random { .. } => Duration::ZERO,
            DelayPolicy::Fixed { base, .. } => base,
        }
    }

    /// Delay following one keystroke.
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            DelayPolicy::Random { min, max } => rng.random_range(min..max),
            DelayPolicy::Fixed { increment, .. } => increment,
        }
    }

    /// Smallest delay the policy can produce between keystrokes.
    pub fn min_step(&self) -> Duration {
        match *self {
            DelayPolicy::Random { min, .. } => min,
            DelayPolicy::Fixed { increment, .. } => increment,
        }
    }
}

/// Which scheduler drives a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Await each keystroke's delay before the next. Cancellable anywhere.
    #[default]
    Sequential,
    /// One timer task per keystroke at an absolute offset from run start.
    Timers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub delimiter: SpanDelimiter,
    /// Insert only the text between the markers.
    pub strip_delimiters: bool,
    pub delay: DelayPolicy,
    /// Wait one delay after an atomic span.
    pub delay_after_span: bool,
    pub strategy: Strategy,
    /// Fixed seed for random delays (reproducible runs).
    pub seed: Option<u64>,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            delimiter: SpanDelimiter::default(),
            strip_delimiters: false,
            delay: DelayPolicy::default(),
            delay_after_span: true,
            strategy: Strategy::default(),
            seed: None,
        }
    }
}

impl TypewriterConfig {
    /// Build from the two host-level settings ("Delimiter", "Typing Speed").
    /// An empty delimiter keeps the default marker.
    pub fn from_settings(block_delimiter: &str, typing_speed: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if !block_delimiter.trim().is_empty() {
            config.delimiter = SpanDelimiter::symmetric(block_delimiter.trim())?;
        }
        config.delay = DelayPolicy::parse_speed(typing_speed)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.open().is_empty() || self.delimiter.close().is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        self.delay.validate()?;
        if self.strategy == Strategy::Timers && self.delay.min_step() < Duration::from_millis(1) {
            return Err(ConfigError::ZeroTimerDelay);
        }
        Ok(())
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
