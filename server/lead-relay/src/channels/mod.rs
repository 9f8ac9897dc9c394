//! Channel boundary: abstract contracts for every external collaborator the
//! relay talks to. The pipeline depends on these traits only; the HTTP
//! adapters live in the submodules and carry no logic beyond transport.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub mod alert;
pub mod audit;
pub mod classifier;
pub mod email;
pub mod sms;
pub mod webhook;

pub use alert::HttpOperatorAlert;
pub use audit::HttpAuditLog;
pub use classifier::HttpSpamClassifier;
pub use email::HttpEmailChannel;
pub use sms::HttpSmsChannel;
pub use webhook::HttpCrmWebhook;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ChannelError {
  #[error("transport: {0}")]
  Transport(String),

  #[error("timed out")]
  Timeout,

  #[error("http {status}: {detail}")]
  Http { status: u16, detail: String },

  #[error("bad reply: {0}")]
  BadReply(String),
}

impl From<reqwest::Error> for ChannelError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      Self::Timeout
    } else {
      Self::Transport(err.to_string())
    }
  }
}

// ---------------------------------------------------------------------------
// Spam classification oracle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Spam,
  Legitimate,
}

/// External classification oracle. May fail; the pipeline fails open
/// (treats a failure as Legitimate) and alerts the operator.
#[async_trait]
pub trait SpamClassifier: Send + Sync {
  async fn classify(
    &self,
    name: &str,
    phone: Option<&str>,
    email: &str,
    case_text: &str,
  ) -> Result<Verdict, ChannelError>;
}

// ---------------------------------------------------------------------------
// CRM webhook
// ---------------------------------------------------------------------------

/// What the CRM webhook receives for every accepted lead (duplicates
/// included; downstream CRM dedup is authoritative).
#[derive(Debug, Clone, Serialize)]
pub struct CrmRecord {
  pub source: String,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  pub email: String,
  pub case_description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub case_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub case_state: Option<String>,
  pub referral: bool,
  pub received_at: DateTime<Utc>,
  pub duplicate: bool,
}

/// Raw webhook reply. The body may embed an authoritative status code as a
/// bracketed three-digit token; see `webhook::embedded_status_code`.
#[derive(Debug, Clone)]
pub struct WebhookReply {
  pub status: u16,
  pub body: String,
}

#[async_trait]
pub trait CrmWebhook: Send + Sync {
  async fn submit(&self, record: &CrmRecord) -> Result<WebhookReply, ChannelError>;
}

// ---------------------------------------------------------------------------
// Notification + audit channels
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EmailChannel: Send + Sync {
  async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ChannelError>;
}

#[async_trait]
pub trait SmsChannel: Send + Sync {
  async fn send(&self, to: &str, body: &str) -> Result<(), ChannelError>;
}

/// One audit-log row. `case_text` carries inline annotations (e.g. a spam
/// flag) for human review.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
  pub name: String,
  pub email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  pub case_text: String,
  pub source: String,
  pub received_at: DateTime<Utc>,
}

/// Best-effort audit trail; a failure here never fails the main response.
#[async_trait]
pub trait AuditLog: Send + Sync {
  async fn append(&self, entry: &AuditEntry) -> Result<(), ChannelError>;
}

/// Fire-and-forget operator notification (classifier failures, 5xx webhook
/// failures, unexpected errors).
#[async_trait]
pub trait OperatorAlert: Send + Sync {
  async fn notify(&self, message: &str, origin: &str);
}
