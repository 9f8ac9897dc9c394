//! Fan-out pipeline: spam check → validation → duplicate check → channel
//! dispatch, with one outcome per channel per submission.
//!
//! Strict per-submission ordering, no ordering across submissions. Channel
//! calls are one-shot: `RetryPolicy::None` is the named policy, not an
//! accident of missing code.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use intake_engine::{normalize, screen, Config, DuplicateDetector, EngineError};
use intake_engine::fingerprint;
use intake_engine::types::{ChannelOutcome, InboundSubmission, Submission};

use crate::channels::{
  AuditEntry, AuditLog, CrmRecord, CrmWebhook, EmailChannel, OperatorAlert, SmsChannel,
  SpamClassifier, Verdict,
};
use crate::channels::webhook::effective_status;

pub const CHANNEL_EMAIL: &str = "email";
pub const CHANNEL_SMS: &str = "sms";
pub const CHANNEL_WEBHOOK: &str = "crm_webhook";
pub const CHANNEL_AUDIT: &str = "audit_log";

/// Every collaborator the pipeline dispatches to, behind trait objects so
/// tests swap in recording mocks.
pub struct ChannelSet {
  pub classifier: Arc<dyn SpamClassifier>,
  pub webhook: Arc<dyn CrmWebhook>,
  pub email: Arc<dyn EmailChannel>,
  pub sms: Arc<dyn SmsChannel>,
  pub audit: Arc<dyn AuditLog>,
  pub alerts: Arc<dyn OperatorAlert>,
}

/// Where accepted-lead notifications go.
#[derive(Debug, Clone)]
pub struct NotifyTargets {
  pub email: String,
  pub sms: String,
}

/// Internal processing result. `spam` is telemetry only; the HTTP layer
/// must render a spam result indistinguishable from a success.
#[derive(Debug)]
pub struct Processed {
  pub duplicate: bool,
  pub spam: bool,
  pub outcomes: Vec<ChannelOutcome>,
}

pub struct Pipeline {
  channels: ChannelSet,
  notify: NotifyTargets,
  detector: Mutex<DuplicateDetector>,
}

impl Pipeline {
  pub fn new(config: &Config, notify: NotifyTargets, channels: ChannelSet) -> Self {
    Self {
      channels,
      notify,
      detector: Mutex::new(DuplicateDetector::new(config, Utc::now())),
    }
  }

  /// Run one submission through the state machine:
  /// spam check → validation → duplicate check → fan-out.
  ///
  /// Spam is checked *before* validation so a probe with missing fields gets
  /// the same uniform response as a fully-formed one; validation errors
  /// would otherwise leak a fingerprinting signal to adversarial submitters.
  pub async fn process(&self, raw: &InboundSubmission, now: DateTime<Utc>) -> Result<Processed, EngineError> {
    if let Some(reason) = self.spam_check(raw).await {
      return Ok(self.suppress(raw, &reason, now).await);
    }

    let submission = normalize::normalize(raw, now)?;
    // Hash once; the detector and the log lines share the result.
    let fp = fingerprint::compute(&submission);
    let duplicate = {
      let mut detector = self.detector.lock().unwrap_or_else(|e| e.into_inner());
      detector.observe(&fp, now)
    };

    let outcomes = if duplicate {
      info!(fingerprint = %fp.0, "duplicate submission; webhook only");
      self.dispatch_duplicate(&submission).await
    } else {
      info!(
        fingerprint = %fp.0,
        source = submission.source.tag(),
        "new submission; full fan-out"
      );
      self.dispatch_all(&submission).await
    };

    Ok(Processed {
      duplicate,
      spam: false,
      outcomes,
    })
  }

  /// Heuristic screen first (free), then the oracle. Returns the spam reason
  /// or `None` for legitimate traffic. Oracle failure fails open.
  async fn spam_check(&self, raw: &InboundSubmission) -> Option<String> {
    let case_text = raw.case_description.as_deref().unwrap_or_default();

    if let Some(flag) = screen::screen(case_text) {
      return Some(format!("screen:{}", flag.tag()));
    }

    let verdict = self
      .channels
      .classifier
      .classify(
        &raw.name,
        raw.phone.as_deref(),
        raw.email.as_deref().unwrap_or_default(),
        case_text,
      )
      .await;

    match verdict {
      Ok(Verdict::Spam) => Some("oracle".to_string()),
      Ok(Verdict::Legitimate) => None,
      Err(err) => {
        // Fail open: never block a real client on classifier infrastructure.
        warn!(%err, "classifier failed; treating submission as legitimate");
        self
          .channels
          .alerts
          .notify(&format!("spam classifier failed: {}", err), "classifier")
          .await;
        None
      }
    }
  }

  /// Spam path: nothing is dispatched, the rejected content goes to the
  /// audit log for human review, and the reported outcomes are shaped like
  /// a full success so the submitter learns nothing.
  async fn suppress(&self, raw: &InboundSubmission, reason: &str, now: DateTime<Utc>) -> Processed {
    info!(reason, name = %raw.name, "spam suppressed");

    let entry = AuditEntry {
      name: raw.name.clone(),
      email: raw.email.clone().unwrap_or_default(),
      phone: raw.phone.clone(),
      case_text: format!(
        "[spam:{}] {}",
        reason,
        raw.case_description.as_deref().unwrap_or_default()
      ),
      source: raw.source.clone(),
      received_at: now,
    };
    if let Err(err) = self.channels.audit.append(&entry).await {
      warn!(%err, "audit append failed for suppressed submission");
    }

    Processed {
      duplicate: false,
      spam: true,
      outcomes: vec![
        ChannelOutcome::delivered(CHANNEL_EMAIL),
        ChannelOutcome::delivered(CHANNEL_SMS),
        ChannelOutcome::delivered(CHANNEL_WEBHOOK),
        ChannelOutcome::delivered(CHANNEL_AUDIT),
      ],
    }
  }

  /// Duplicate path: CRM webhook only, flagged so downstream dedup can make
  /// the final call; notifications are suppressed.
  async fn dispatch_duplicate(&self, submission: &Submission) -> Vec<ChannelOutcome> {
    let webhook = self.submit_webhook(submission, true).await;
    vec![
      ChannelOutcome::skipped(CHANNEL_EMAIL, "duplicate"),
      ChannelOutcome::skipped(CHANNEL_SMS, "duplicate"),
      webhook,
      ChannelOutcome::skipped(CHANNEL_AUDIT, "duplicate"),
    ]
  }

  /// New-lead path: all four channels, concurrently and independently. One
  /// channel failing never stops the others.
  async fn dispatch_all(&self, submission: &Submission) -> Vec<ChannelOutcome> {
    let (email, sms, webhook, audit) = tokio::join!(
      self.send_email(submission),
      self.send_sms(submission),
      self.submit_webhook(submission, false),
      self.append_audit(submission),
    );
    vec![email, sms, webhook, audit]
  }

  async fn send_email(&self, submission: &Submission) -> ChannelOutcome {
    let subject = format!("New lead: {}", submission.name);
    let body = email_body(submission);
    match self.channels.email.send(&self.notify.email, &subject, &body).await {
      Ok(()) => ChannelOutcome::delivered(CHANNEL_EMAIL),
      Err(err) => {
        warn!(%err, "email channel failed");
        ChannelOutcome::failed(CHANNEL_EMAIL, err.to_string())
      }
    }
  }

  async fn send_sms(&self, submission: &Submission) -> ChannelOutcome {
    let body = format!(
      "New lead: {} ({}): {}",
      submission.name,
      submission.source.tag(),
      submission.case_description
    );
    match self.channels.sms.send(&self.notify.sms, &body).await {
      Ok(()) => ChannelOutcome::delivered(CHANNEL_SMS),
      Err(err) => {
        warn!(%err, "sms channel failed");
        ChannelOutcome::failed(CHANNEL_SMS, err.to_string())
      }
    }
  }

  async fn submit_webhook(&self, submission: &Submission, duplicate: bool) -> ChannelOutcome {
    let record = CrmRecord {
      source: submission.source.tag().to_string(),
      name: submission.name.clone(),
      phone: submission.phone.clone(),
      email: submission.email.clone(),
      case_description: submission.case_description.clone(),
      case_type: submission.case_type.clone(),
      case_state: submission.case_state.clone(),
      referral: submission.referral,
      received_at: submission.received_at,
      duplicate,
    };

    match self.channels.webhook.submit(&record).await {
      Ok(reply) => {
        // The body's bracketed code, when present, beats the transport status.
        let status = effective_status(&reply);
        if (200..300).contains(&status) {
          ChannelOutcome::delivered(CHANNEL_WEBHOOK)
        } else {
          warn!(status, "crm webhook rejected submission");
          if status >= 500 {
            self
              .channels
              .alerts
              .notify(&format!("crm webhook failed with status {}", status), "crm_webhook")
              .await;
          }
          ChannelOutcome::failed(CHANNEL_WEBHOOK, format!("status {}", status))
        }
      }
      Err(err) => {
        warn!(%err, "crm webhook transport failure");
        self
          .channels
          .alerts
          .notify(&format!("crm webhook unreachable: {}", err), "crm_webhook")
          .await;
        ChannelOutcome::failed(CHANNEL_WEBHOOK, err.to_string())
      }
    }
  }

  async fn append_audit(&self, submission: &Submission) -> ChannelOutcome {
    let mut case_text = submission.case_description.clone();
    if submission.referral {
      case_text = format!("[referral] {}", case_text);
    }
    let entry = AuditEntry {
      name: submission.name.clone(),
      email: submission.email.clone(),
      phone: submission.phone.clone(),
      case_text,
      source: submission.source.tag().to_string(),
      received_at: submission.received_at,
    };
    match self.channels.audit.append(&entry).await {
      Ok(()) => ChannelOutcome::delivered(CHANNEL_AUDIT),
      Err(err) => {
        // Best-effort: recorded as a failed outcome, never escalated.
        warn!(%err, "audit log append failed");
        ChannelOutcome::failed(CHANNEL_AUDIT, err.to_string())
      }
    }
  }
}

fn email_body(submission: &Submission) -> String {
  let mut rows = vec![
    format!("<p><b>Name:</b> {}</p>", submission.name),
    format!("<p><b>Email:</b> {}</p>", submission.email),
  ];
  if let Some(phone) = &submission.phone {
    rows.push(format!("<p><b>Phone:</b> {}</p>", phone));
  }
  if let (Some(case_type), Some(case_state)) = (&submission.case_type, &submission.case_state) {
    rows.push(format!("<p><b>Case:</b> {} ({})</p>", case_type, case_state));
  }
  if submission.referral {
    rows.push("<p><b>Referral:</b> yes</p>".to_string());
  }
  rows.push(format!("<p>{}</p>", submission.case_description));
  rows.join("\n")
}
