//! HTTP adapter for the CRM webhook.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ChannelError, CrmRecord, CrmWebhook, WebhookReply};

pub struct HttpCrmWebhook {
  client: reqwest::Client,
  url: String,
}

impl HttpCrmWebhook {
  pub fn new(client: reqwest::Client, url: String) -> Self {
    Self { client, url }
  }
}

#[async_trait]
impl CrmWebhook for HttpCrmWebhook {
  async fn submit(&self, record: &CrmRecord) -> Result<WebhookReply, ChannelError> {
    let resp = self.client.post(&self.url).json(record).send().await?;
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    Ok(WebhookReply { status, body })
  }
}

static EMBEDDED_CODE_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\[(\d{3})\]").expect("embedded code regex"));

/// First bracketed three-digit token in a webhook reply body, e.g. `[404]`.
/// When present it is the authoritative status, overriding the transport
/// code the CRM's gateway happened to wrap it in.
pub fn embedded_status_code(body: &str) -> Option<u16> {
  let caps = EMBEDDED_CODE_RE.captures(body)?;
  let code: u16 = caps[1].parse().ok()?;
  (100..=599).contains(&code).then_some(code)
}

/// Effective status for a reply: embedded code when present, transport
/// status otherwise.
pub fn effective_status(reply: &WebhookReply) -> u16 {
  embedded_status_code(&reply.body).unwrap_or(reply.status)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_bracketed_code() {
    assert_eq!(embedded_status_code("[404] contact not found"), Some(404));
    assert_eq!(embedded_status_code("error [503] upstream"), Some(503));
  }

  #[test]
  fn ignores_non_status_tokens() {
    assert_eq!(embedded_status_code("no code here"), None);
    assert_eq!(embedded_status_code("[42] too short"), None);
    assert_eq!(embedded_status_code("[9999] too long"), None);
    assert_eq!(embedded_status_code("[999] out of range"), None);
  }

  #[test]
  fn first_token_wins() {
    assert_eq!(embedded_status_code("[400] then [500]"), Some(400));
  }

  #[test]
  fn embedded_code_overrides_transport_status() {
    let reply = WebhookReply {
      status: 200,
      body: "[422] missing custom field".into(),
    };
    assert_eq!(effective_status(&reply), 422);

    let reply = WebhookReply {
      status: 502,
      body: "bad gateway".into(),
    };
    assert_eq!(effective_status(&reply), 502);
  }
}
