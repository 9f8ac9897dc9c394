//! Per-client sliding-window rate limiting.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;

/// Sliding-window request counter keyed by client identifier (typically the
/// peer network address).
///
/// A rejected request is never recorded, so it cannot count toward future
/// windows. Clients whose every entry has aged out are swept from the map at
/// most once per prune interval, so one-off callers do not accumulate forever.
/// Takes `now` as a parameter so tests control the clock.
pub struct RateLimiter {
  buckets: HashMap<String, Vec<DateTime<Utc>>>,
  window: Duration,
  ceiling: usize,
  prune_interval: Duration,
  last_prune: DateTime<Utc>,
}

impl RateLimiter {
  pub fn new(config: &Config, now: DateTime<Utc>) -> Self {
    Self {
      buckets: HashMap::new(),
      window: Duration::seconds(config.rate_window_secs),
      ceiling: config.rate_max_requests,
      prune_interval: Duration::seconds(config.rate_prune_secs),
      last_prune: now,
    }
  }

  /// Check and record one request. Returns false when the client has already
  /// hit the ceiling inside the trailing window.
  ///
  /// Always attempts a prune sweep first (a no-op if one ran recently).
  pub fn allow(&mut self, client_key: &str, now: DateTime<Utc>) -> bool {
    if now - self.last_prune >= self.prune_interval {
      self.prune(now);
    }

    let bucket = self.buckets.entry(client_key.to_string()).or_default();
    let window = self.window;
    bucket.retain(|&ts| now - ts < window);

    if bucket.len() >= self.ceiling {
      return false;
    }
    bucket.push(now);
    true
  }

  /// Drop clients whose entire bucket has aged out of the window.
  pub fn prune(&mut self, now: DateTime<Utc>) {
    let window = self.window;
    self.buckets.retain(|_, bucket| {
      bucket.retain(|&ts| now - ts < window);
      !bucket.is_empty()
    });
    self.last_prune = now;
  }

  pub fn tracked_clients(&self) -> usize {
    self.buckets.len()
  }
}
