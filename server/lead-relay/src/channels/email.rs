//! HTTP adapter for the email relay endpoint.
//!
//! Provider SDKs are deliberately out of scope; the relay posts a plain JSON
//! message to whatever mailer endpoint EMAIL_ENDPOINT points at.

use async_trait::async_trait;
use serde_json::json;

use super::{ChannelError, EmailChannel};

pub struct HttpEmailChannel {
  client: reqwest::Client,
  url: String,
}

impl HttpEmailChannel {
  pub fn new(client: reqwest::Client, url: String) -> Self {
    Self { client, url }
  }
}

#[async_trait]
impl EmailChannel for HttpEmailChannel {
  async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ChannelError> {
    let payload = json!({
      "to": to,
      "subject": subject,
      "html": html_body,
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
