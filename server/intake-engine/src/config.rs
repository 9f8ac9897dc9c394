//! Engine configuration with sane defaults.

/// Tunable windows and ceilings for duplicate suppression and rate limiting.
#[derive(Debug, Clone)]
pub struct Config {
  /// Seconds a fingerprint suppresses repeats after its last sighting.
  pub dedup_window_secs: i64,
  /// Minimum seconds between cleanup sweeps of expired fingerprints.
  pub dedup_cleanup_secs: i64,
  /// Trailing rate-limit window per client, in seconds.
  pub rate_window_secs: i64,
  /// Max requests per client within the rate window.
  pub rate_max_requests: usize,
  /// Minimum seconds between sweeps of idle rate-limit clients.
  pub rate_prune_secs: i64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      dedup_window_secs: 600,
      dedup_cleanup_secs: 300,
      rate_window_secs: 3600,
      rate_max_requests: 100,
      rate_prune_secs: 300,
    }
  }
}
