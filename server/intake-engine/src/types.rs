//! Core types for the intake engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One inbound lead submission. Unknown fields are silently ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundSubmission {
  pub source: String,
  pub name: String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub case_description: Option<String>,
  #[serde(default)]
  pub case_type: Option<String>,
  #[serde(default)]
  pub case_state: Option<String>,
  #[serde(default)]
  pub referral: bool,
}

// ---------------------------------------------------------------------------
// Source enum (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
  Form,
  Chatbot,
}

impl Source {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "form" | "web" | "website" => Some(Self::Form),
      "chatbot" | "chat" | "bot" => Some(Self::Chatbot),
      _ => None,
    }
  }

  /// Stable tag folded into the fingerprint.
  pub fn tag(self) -> &'static str {
    match self {
      Self::Form => "form",
      Self::Chatbot => "chatbot",
    }
  }
}

// ---------------------------------------------------------------------------
// Internal canonical submission
// ---------------------------------------------------------------------------

/// Canonical internal submission after normalization + validation.
/// Immutable once created; the core never persists it.
#[derive(Debug, Clone)]
pub struct Submission {
  pub source: Source,
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub case_description: String,
  pub case_type: Option<String>,
  pub case_state: Option<String>,
  pub referral: bool,
  pub received_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// A stable hex string identifying a submission's normalized content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

// ---------------------------------------------------------------------------
// Per-channel delivery outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
  Delivered,
  Failed,
  Skipped,
}

/// One channel's result for one submission. Every channel attempted (or
/// deliberately skipped) reports exactly one of these.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelOutcome {
  pub channel: String,
  pub status: ChannelStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl ChannelOutcome {
  pub fn delivered(channel: &str) -> Self {
    Self {
      channel: channel.to_string(),
      status: ChannelStatus::Delivered,
      error: None,
    }
  }

  pub fn failed(channel: &str, error: impl Into<String>) -> Self {
    Self {
      channel: channel.to_string(),
      status: ChannelStatus::Failed,
      error: Some(error.into()),
    }
  }

  pub fn skipped(channel: &str, reason: impl Into<String>) -> Self {
    Self {
      channel: channel.to_string(),
      status: ChannelStatus::Skipped,
      error: Some(reason.into()),
    }
  }
}
