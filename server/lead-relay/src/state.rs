//! Shared application state: the rate limiter and the fan-out pipeline.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use intake_engine::RateLimiter;

use crate::channels::{
  HttpAuditLog, HttpCrmWebhook, HttpEmailChannel, HttpOperatorAlert, HttpSmsChannel,
  HttpSpamClassifier,
};
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::pipeline::{ChannelSet, NotifyTargets, Pipeline};

pub struct AppState {
  limiter: Mutex<RateLimiter>,
  pub pipeline: Pipeline,
}

impl AppState {
  /// Wire the production HTTP adapters from config.
  pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
    let client = http_client(config.channel_timeout)?;
    let classifier_client = http_client(config.classifier_timeout)?;

    let channels = ChannelSet {
      classifier: Arc::new(HttpSpamClassifier::new(
        classifier_client,
        config.classifier_url.clone(),
      )),
      webhook: Arc::new(HttpCrmWebhook::new(client.clone(), config.crm_webhook_url.clone())),
      email: Arc::new(HttpEmailChannel::new(client.clone(), config.email_endpoint.clone())),
      sms: Arc::new(HttpSmsChannel::new(client.clone(), config.sms_endpoint.clone())),
      audit: Arc::new(HttpAuditLog::new(client.clone(), config.audit_endpoint.clone())),
      alerts: Arc::new(HttpOperatorAlert::new(client, config.alert_endpoint.clone())),
    };
    let notify = NotifyTargets {
      email: config.notify_email.clone(),
      sms: config.notify_sms.clone(),
    };

    Ok(Self {
      limiter: Mutex::new(RateLimiter::new(&config.engine, Utc::now())),
      pipeline: Pipeline::new(&config.engine, notify, channels),
    })
  }

  /// Rate-check one request. Rejections are never recorded.
  pub fn allow(&self, client_key: &str, now: DateTime<Utc>) -> bool {
    let mut limiter = self.limiter.lock().unwrap_or_else(|e| e.into_inner());
    limiter.allow(client_key, now)
  }
}

fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, RelayError> {
  reqwest::Client::builder()
    .timeout(timeout)
    .connect_timeout(std::time::Duration::from_secs(10))
    .build()
    .map_err(|e| RelayError::Config(format!("http client: {}", e)))
}
