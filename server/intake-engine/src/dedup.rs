//! Time-windowed duplicate detection keyed by submission fingerprint.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::types::Fingerprint;

/// Short-horizon, self-expiring duplicate detector.
///
/// Sliding-reset semantics: every sighting (including a suppressed duplicate)
/// refreshes the stored timestamp, so a steady stream of repeats stays
/// suppressed for as long as they keep arriving inside the window.
///
/// Takes `now` as a parameter so tests control the clock.
pub struct DuplicateDetector {
  seen: HashMap<Fingerprint, DateTime<Utc>>,
  window: Duration,
  cleanup_interval: Duration,
  last_cleanup: DateTime<Utc>,
}

impl DuplicateDetector {
  pub fn new(config: &Config, now: DateTime<Utc>) -> Self {
    Self {
      seen: HashMap::new(),
      window: Duration::seconds(config.dedup_window_secs),
      cleanup_interval: Duration::seconds(config.dedup_cleanup_secs),
      last_cleanup: now,
    }
  }

  /// Record a sighting of a fingerprint and report whether it is a duplicate.
  /// The caller computes the fingerprint once and keeps it for logging.
  ///
  /// Returns true when the fingerprint was last seen within the window.
  /// Always attempts a cleanup sweep first (a no-op if one ran recently).
  pub fn observe(&mut self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> bool {
    self.cleanup(now);

    let duplicate = match self.seen.get(fingerprint) {
      Some(&last_seen) => now - last_seen < self.window,
      None => false,
    };
    // Sliding reset: overwrite on every sighting, duplicate or not.
    self.seen.insert(fingerprint.clone(), now);
    duplicate
  }

  /// Drop expired entries, at most once per cleanup interval.
  fn cleanup(&mut self, now: DateTime<Utc>) {
    if now - self.last_cleanup < self.cleanup_interval {
      return;
    }
    let window = self.window;
    self.seen.retain(|_, &mut last_seen| now - last_seen < window);
    self.last_cleanup = now;
  }

  /// Number of fingerprints currently tracked (expired entries linger until
  /// the next sweep).
  pub fn tracked(&self) -> usize {
    self.seen.len()
  }
}
