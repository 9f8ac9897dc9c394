//! HTTP adapter for the spreadsheet audit log.

use async_trait::async_trait;

use super::{AuditEntry, AuditLog, ChannelError};

pub struct HttpAuditLog {
  client: reqwest::Client,
  url: String,
}

impl HttpAuditLog {
  pub fn new(client: reqwest::Client, url: String) -> Self {
    Self { client, url }
  }
}

#[async_trait]
impl AuditLog for HttpAuditLog {
  async fn append(&self, entry: &AuditEntry) -> Result<(), ChannelError> {
    let resp = self.client.post(&self.url).json(entry).send().await?;
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
