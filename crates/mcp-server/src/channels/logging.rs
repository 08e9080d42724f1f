//! Logging side-channel: the minimum severity a client has asked to
//! receive via `logging/setLevel`, gating `notifications/message` emission.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// RFC 5424 syslog severities, most-severe first, as used by
/// `logging/setLevel` and `notifications/message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    /// Severity ordinal, lower is more severe — matches RFC 5424 where
    /// 0 is Emergency and 7 is Debug.
    fn rank(self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Alert => 1,
            Self::Critical => 2,
            Self::Error => 3,
            Self::Warning => 4,
            Self::Notice => 5,
            Self::Info => 6,
            Self::Debug => 7,
        }
    }
}

/// Tracks the minimum severity the client currently wants to receive.
/// Defaults to `Info`, but logging isn't advertised as enabled until the
/// client actually calls `logging/setLevel` at least once.
pub struct LoggingManager {
    threshold: RwLock<LogLevel>,
    enabled: AtomicBool,
}

impl Default for LoggingManager {
    fn default() -> Self {
        Self {
            threshold: RwLock::new(LogLevel::Info),
            enabled: AtomicBool::new(false),
        }
    }
}

impl LoggingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.threshold.write() = level;
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn level(&self) -> LogLevel {
        *self.threshold.read()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Whether a message at `level` should be delivered given the
    /// current threshold: more severe (lower rank) or equal passes.
    pub fn should_emit(&self, level: LogLevel) -> bool {
        level.rank() <= self.threshold.read().rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_passes_info_and_above() {
        let manager = LoggingManager::new();
        assert!(manager.should_emit(LogLevel::Error));
        assert!(manager.should_emit(LogLevel::Info));
        assert!(!manager.should_emit(LogLevel::Debug));
    }

    #[test]
    fn not_enabled_until_set_level_is_called() {
        let manager = LoggingManager::new();
        assert!(!manager.is_enabled());
        manager.set_level(LogLevel::Warning);
        assert!(manager.is_enabled());
    }

    #[test]
    fn narrowing_threshold_filters_less_severe() {
        let manager = LoggingManager::new();
        manager.set_level(LogLevel::Warning);
        assert!(manager.should_emit(LogLevel::Error));
        assert!(!manager.should_emit(LogLevel::Info));
    }
}
