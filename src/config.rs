//! Configuration Module
//!
//! Settings for an expiring map. Every field is optional; unset fields fall
//! back to the defaults below when the settings are resolved.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ExpiringMapError, Result};

// == Defaults ==
/// Default maximum lifetime of an entry.
pub const AGE_DEFAULT: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of entries.
pub const MAX_LENGTH_DEFAULT: usize = 1000;

/// Default period of the background sweeper.
pub const CLEANUP_INTERVAL_DEFAULT: Duration = Duration::from_secs(60 * 60);

/// Settings supplied when constructing an expiring map.
///
/// Durations serialize as integer milliseconds (`age_ms`,
/// `cleanup_interval_ms`) so the settings can be embedded in an
/// application's own config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum lifetime of an entry
    #[serde(rename = "age_ms", with = "duration_ms")]
    pub age: Option<Duration>,
    /// Maximum number of entries held at once
    pub max_length: Option<usize>,
    /// Panic instead of evicting when a new key arrives at a full map
    pub panic_full: bool,
    /// Period of the background sweeper; zero disables it
    #[serde(rename = "cleanup_interval_ms", with = "duration_ms")]
    pub cleanup_interval: Option<Duration>,
}

impl Settings {
    // == Constructor ==
    /// Creates settings with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    // == Builders ==
    pub fn with_age(mut self, age: Duration) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_panic_full(mut self, panic_full: bool) -> Self {
        self.panic_full = panic_full;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Disables the background sweeper. Lazy expiry on read still applies.
    pub fn without_sweeper(self) -> Self {
        self.with_cleanup_interval(Duration::ZERO)
    }

    // == Resolve ==
    /// Fills unset fields with defaults and validates the result.
    ///
    /// # Errors
    /// - `InvalidSettings` if `age` or `max_length` is zero
    pub fn resolve(&self) -> Result<ResolvedSettings> {
        let age = self.age.unwrap_or(AGE_DEFAULT);
        if age.is_zero() {
            return Err(ExpiringMapError::InvalidSettings(
                "age must be greater than zero".to_string(),
            ));
        }

        let max_length = self.max_length.unwrap_or(MAX_LENGTH_DEFAULT);
        if max_length == 0 {
            return Err(ExpiringMapError::InvalidSettings(
                "max_length must be greater than zero".to_string(),
            ));
        }

        let cleanup_interval = match self.cleanup_interval {
            Some(interval) if interval.is_zero() => None,
            Some(interval) => Some(interval),
            None => Some(CLEANUP_INTERVAL_DEFAULT),
        };

        Ok(ResolvedSettings {
            age,
            max_length,
            panic_full: self.panic_full,
            cleanup_interval,
        })
    }
}

/// Settings after defaults have been applied. Immutable once a map is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Maximum lifetime of an entry
    pub age: Duration,
    /// Maximum number of entries held at once
    pub max_length: usize,
    /// Panic instead of evicting when full
    pub panic_full: bool,
    /// Sweeper period, `None` when sweeping is disabled
    pub cleanup_interval: Option<Duration>,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Self {
            age: AGE_DEFAULT,
            max_length: MAX_LENGTH_DEFAULT,
            panic_full: false,
            cleanup_interval: Some(CLEANUP_INTERVAL_DEFAULT),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => {
                let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                serializer.serialize_some(&millis)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
