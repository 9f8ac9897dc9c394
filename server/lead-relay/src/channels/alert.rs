//! Operator alerting. Fire-and-forget: an alert that cannot be delivered is
//! logged and dropped, never propagated into a caller-visible error.

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use super::OperatorAlert;

/// Posts alerts to an ops endpoint when one is configured; logs either way.
pub struct HttpOperatorAlert {
  client: reqwest::Client,
  url: Option<String>,
}

impl HttpOperatorAlert {
  pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
    Self { client, url }
  }
}

#[async_trait]
impl OperatorAlert for HttpOperatorAlert {
  async fn notify(&self, message: &str, origin: &str) {
    warn!(origin, message, "operator alert");
    let Some(url) = &self.url else {
      return;
    };
    let payload = json!({ "message": message, "origin": origin });
    if let Err(err) = self.client.post(url).json(&payload).send().await {
      warn!(%err, "failed to deliver operator alert");
    }
  }
}
