//! HTTP adapter for the SMS relay endpoint.

use async_trait::async_trait;
use serde_json::json;

use super::{ChannelError, SmsChannel};

pub struct HttpSmsChannel {
  client: reqwest::Client,
  url: String,
}

impl HttpSmsChannel {
  pub fn new(client: reqwest::Client, url: String) -> Self {
    Self { client, url }
  }
}

#[async_trait]
impl SmsChannel for HttpSmsChannel {
  async fn send(&self, to: &str, body: &str) -> Result<(), ChannelError> {
    let payload = json!({
      "to": to,
      "body": body,
    });
    let resp = self.client.post(&self.url).json(&payload).send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(ChannelError::Http {
        status: status.as_u16(),
        detail: resp.text().await.unwrap_or_default(),
      });
    }
    Ok(())
  }
}
