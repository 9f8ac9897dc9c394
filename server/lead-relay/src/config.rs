//! Relay configuration, read from the environment at startup. Missing
//! required endpoints are a startup error, not a runtime surprise.

use std::time::Duration;

use intake_engine::Config as EngineConfig;

use crate::error::RelayError;

/// Channel calls are one-shot inside a submission's lifecycle. The absence
/// of retry is a named policy here so a future bounded-backoff variant has
/// somewhere to live without changing the pipeline's contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
  #[default]
  None,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
  pub port: u16,
  /// Spam classification oracle endpoint.
  pub classifier_url: String,
  pub crm_webhook_url: String,
  pub email_endpoint: String,
  pub sms_endpoint: String,
  pub audit_endpoint: String,
  /// Optional ops endpoint; alerts fall back to logs when unset.
  pub alert_endpoint: Option<String>,
  /// Where accepted-lead notifications are delivered.
  pub notify_email: String,
  pub notify_sms: String,
  pub channel_timeout: Duration,
  pub classifier_timeout: Duration,
  pub retry: RetryPolicy,
  pub engine: EngineConfig,
}

impl RelayConfig {
  pub fn from_env() -> Result<Self, RelayError> {
    let engine = EngineConfig {
      dedup_window_secs: parse_or("DEDUP_WINDOW_SECS", 600)?,
      dedup_cleanup_secs: parse_or("DEDUP_CLEANUP_SECS", 300)?,
      rate_window_secs: parse_or("RATE_WINDOW_SECS", 3600)?,
      rate_max_requests: parse_or("RATE_MAX_REQUESTS", 100)?,
      rate_prune_secs: parse_or("RATE_PRUNE_SECS", 300)?,
    };

    Ok(Self {
      port: parse_or("PORT", 5005)?,
      classifier_url: required("CLASSIFIER_URL")?,
      crm_webhook_url: required("CRM_WEBHOOK_URL")?,
      email_endpoint: required("EMAIL_ENDPOINT")?,
      sms_endpoint: required("SMS_ENDPOINT")?,
      audit_endpoint: required("AUDIT_ENDPOINT")?,
      alert_endpoint: std::env::var("ALERT_ENDPOINT").ok().filter(|s| !s.is_empty()),
      notify_email: required("NOTIFY_EMAIL")?,
      notify_sms: required("NOTIFY_SMS")?,
      channel_timeout: Duration::from_secs(parse_or("CHANNEL_TIMEOUT_SECS", 15)?),
      classifier_timeout: Duration::from_secs(parse_or("CLASSIFIER_TIMEOUT_SECS", 20)?),
      retry: RetryPolicy::None,
      engine,
    })
  }
}

fn required(name: &str) -> Result<String, RelayError> {
  std::env::var(name)
    .ok()
    .filter(|s| !s.is_empty())
    .ok_or_else(|| RelayError::Config(format!("{} must be set", name)))
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, RelayError> {
  match std::env::var(name) {
    Ok(raw) => raw
      .parse()
      .map_err(|_| RelayError::Config(format!("{} is not a valid value: {}", name, raw))),
    Err(_) => Ok(default),
  }
}
