//! Integration tests for the fan-out pipeline, driven through mock channel
//! implementations of the boundary traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use intake_engine::types::{ChannelStatus, InboundSubmission};
use intake_engine::Config;
use lead_relay::channels::{
  AuditEntry, AuditLog, ChannelError, CrmRecord, CrmWebhook, EmailChannel, OperatorAlert,
  SmsChannel, SpamClassifier, Verdict, WebhookReply,
};
use lead_relay::{ChannelSet, NotifyTargets, Pipeline, SubmitResponse};

// ---------------------------------------------------------------------------
// Mock channels
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum ClassifierScript {
  Legitimate,
  Spam,
  Fail,
}

struct MockClassifier {
  script: ClassifierScript,
  calls: AtomicUsize,
}

#[async_trait]
impl SpamClassifier for MockClassifier {
  async fn classify(
    &self,
    _name: &str,
    _phone: Option<&str>,
    _email: &str,
    _case_text: &str,
  ) -> Result<Verdict, ChannelError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    match self.script {
      ClassifierScript::Legitimate => Ok(Verdict::Legitimate),
      ClassifierScript::Spam => Ok(Verdict::Spam),
      ClassifierScript::Fail => Err(ChannelError::Timeout),
    }
  }
}

struct MockWebhook {
  status: u16,
  body: String,
  records: Mutex<Vec<CrmRecord>>,
}

#[async_trait]
impl CrmWebhook for MockWebhook {
  async fn submit(&self, record: &CrmRecord) -> Result<WebhookReply, ChannelError> {
    self.records.lock().unwrap().push(record.clone());
    Ok(WebhookReply {
      status: self.status,
      body: self.body.clone(),
    })
  }
}

struct MockEmail {
  fail: bool,
  sent: Mutex<Vec<String>>,
}

#[async_trait]
impl EmailChannel for MockEmail {
  async fn send(&self, to: &str, _subject: &str, _html_body: &str) -> Result<(), ChannelError> {
    if self.fail {
      return Err(ChannelError::Transport("smtp relay down".into()));
    }
    self.sent.lock().unwrap().push(to.to_string());
    Ok(())
  }
}

struct MockSms {
  sent: Mutex<Vec<String>>,
}

#[async_trait]
impl SmsChannel for MockSms {
  async fn send(&self, _to: &str, body: &str) -> Result<(), ChannelError> {
    self.sent.lock().unwrap().push(body.to_string());
    Ok(())
  }
}

struct MockAudit {
  entries: Mutex<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditLog for MockAudit {
  async fn append(&self, entry: &AuditEntry) -> Result<(), ChannelError> {
    self.entries.lock().unwrap().push(entry.clone());
    Ok(())
  }
}

struct MockAlert {
  messages: Mutex<Vec<String>>,
}

#[async_trait]
impl OperatorAlert for MockAlert {
  async fn notify(&self, message: &str, _origin: &str) {
    self.messages.lock().unwrap().push(message.to_string());
  }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
  pipeline: Pipeline,
  classifier: Arc<MockClassifier>,
  webhook: Arc<MockWebhook>,
  email: Arc<MockEmail>,
  sms: Arc<MockSms>,
  audit: Arc<MockAudit>,
  alerts: Arc<MockAlert>,
}

fn harness(script: ClassifierScript, webhook_status: u16, webhook_body: &str, email_fail: bool) -> Harness {
  let classifier = Arc::new(MockClassifier {
    script,
    calls: AtomicUsize::new(0),
  });
  let webhook = Arc::new(MockWebhook {
    status: webhook_status,
    body: webhook_body.to_string(),
    records: Mutex::new(Vec::new()),
  });
  let email = Arc::new(MockEmail {
    fail: email_fail,
    sent: Mutex::new(Vec::new()),
  });
  let sms = Arc::new(MockSms {
    sent: Mutex::new(Vec::new()),
  });
  let audit = Arc::new(MockAudit {
    entries: Mutex::new(Vec::new()),
  });
  let alerts = Arc::new(MockAlert {
    messages: Mutex::new(Vec::new()),
  });

  let channels = ChannelSet {
    classifier: classifier.clone(),
    webhook: webhook.clone(),
    email: email.clone(),
    sms: sms.clone(),
    audit: audit.clone(),
    alerts: alerts.clone(),
  };
  let notify = NotifyTargets {
    email: "intake@firm.example".into(),
    sms: "+19135550199".into(),
  };
  let pipeline = Pipeline::new(&Config::default(), notify, channels);

  Harness {
    pipeline,
    classifier,
    webhook,
    email,
    sms,
    audit,
    alerts,
  }
}

fn form_submission(case: &str) -> InboundSubmission {
  InboundSubmission {
    source: "form".into(),
    name: "Jane Doe".into(),
    email: Some("jane@x.com".into()),
    phone: Some("(913) 555-0100".into()),
    case_description: Some(case.into()),
    case_type: None,
    case_state: None,
    referral: false,
  }
}

fn status_of<'a>(outcomes: &'a [intake_engine::types::ChannelOutcome], channel: &str) -> &'a intake_engine::types::ChannelOutcome {
  outcomes
    .iter()
    .find(|o| o.channel == channel)
    .unwrap_or_else(|| panic!("missing outcome for {}", channel))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_submission_fans_out_to_all_channels() {
  let h = harness(ClassifierScript::Legitimate, 200, "ok", false);
  let processed = h
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();

  assert!(!processed.duplicate);
  assert!(!processed.spam);
  assert_eq!(processed.outcomes.len(), 4);
  for outcome in &processed.outcomes {
    assert_eq!(outcome.status, ChannelStatus::Delivered, "{}", outcome.channel);
  }
  assert_eq!(h.email.sent.lock().unwrap().len(), 1);
  assert_eq!(h.sms.sent.lock().unwrap().len(), 1);
  assert_eq!(h.audit.entries.lock().unwrap().len(), 1);

  let records = h.webhook.records.lock().unwrap();
  assert_eq!(records.len(), 1);
  assert!(!records[0].duplicate);
  assert_eq!(records[0].name, "Jane Doe");
}

#[tokio::test]
async fn duplicate_submission_goes_webhook_only() {
  let h = harness(ClassifierScript::Legitimate, 200, "ok", false);
  let raw = form_submission("I was in a car accident.");

  let first = h.pipeline.process(&raw, Utc::now()).await.unwrap();
  assert!(!first.duplicate);

  let second = h.pipeline.process(&raw, Utc::now()).await.unwrap();
  assert!(second.duplicate);
  assert_eq!(status_of(&second.outcomes, "crm_webhook").status, ChannelStatus::Delivered);
  assert_eq!(status_of(&second.outcomes, "email").status, ChannelStatus::Skipped);
  assert_eq!(status_of(&second.outcomes, "sms").status, ChannelStatus::Skipped);
  assert_eq!(status_of(&second.outcomes, "audit_log").status, ChannelStatus::Skipped);

  // Notifications went out exactly once; the webhook saw both, the second
  // flagged for downstream dedup.
  assert_eq!(h.email.sent.lock().unwrap().len(), 1);
  assert_eq!(h.sms.sent.lock().unwrap().len(), 1);
  let records = h.webhook.records.lock().unwrap();
  assert_eq!(records.len(), 2);
  assert!(records[1].duplicate);
}

#[tokio::test]
async fn oracle_spam_verdict_suppresses_everything_quietly() {
  let h = harness(ClassifierScript::Spam, 200, "ok", false);
  let processed = h
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();

  assert!(processed.spam);
  assert!(!processed.duplicate);
  // Nothing dispatched...
  assert!(h.email.sent.lock().unwrap().is_empty());
  assert!(h.sms.sent.lock().unwrap().is_empty());
  assert!(h.webhook.records.lock().unwrap().is_empty());
  // ...except the flagged audit row for human review.
  let entries = h.audit.entries.lock().unwrap();
  assert_eq!(entries.len(), 1);
  assert!(entries[0].case_text.starts_with("[spam:oracle]"));
  // Reported outcomes are success-shaped.
  for outcome in &processed.outcomes {
    assert_eq!(outcome.status, ChannelStatus::Delivered);
  }
}

#[tokio::test]
async fn heuristic_screen_skips_the_oracle() {
  let h = harness(ClassifierScript::Legitimate, 200, "ok", false);
  let processed = h
    .pipeline
    .process(
      &form_submission("Buy cheap meds at https://spam.example.com"),
      Utc::now(),
    )
    .await
    .unwrap();

  assert!(processed.spam);
  assert_eq!(h.classifier.calls.load(Ordering::SeqCst), 0, "screen hit must not burn an oracle call");
  assert!(h.webhook.records.lock().unwrap().is_empty());
  let entries = h.audit.entries.lock().unwrap();
  assert!(entries[0].case_text.starts_with("[spam:screen:url]"));
}

#[tokio::test]
async fn classifier_failure_fails_open_and_alerts() {
  let h = harness(ClassifierScript::Fail, 200, "ok", false);
  let processed = h
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();

  // Fail-open: full fan-out proceeds as if legitimate.
  assert!(!processed.spam);
  assert_eq!(h.email.sent.lock().unwrap().len(), 1);
  assert_eq!(h.webhook.records.lock().unwrap().len(), 1);

  let alerts = h.alerts.messages.lock().unwrap();
  assert_eq!(alerts.len(), 1);
  assert!(alerts[0].contains("classifier"));
}

#[tokio::test]
async fn email_failure_does_not_stop_sibling_channels() {
  let h = harness(ClassifierScript::Legitimate, 200, "ok", true);
  let processed = h
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();

  assert_eq!(status_of(&processed.outcomes, "email").status, ChannelStatus::Failed);
  assert_eq!(status_of(&processed.outcomes, "sms").status, ChannelStatus::Delivered);
  assert_eq!(status_of(&processed.outcomes, "crm_webhook").status, ChannelStatus::Delivered);
  assert_eq!(status_of(&processed.outcomes, "audit_log").status, ChannelStatus::Delivered);
  assert_eq!(h.sms.sent.lock().unwrap().len(), 1);
  assert_eq!(h.webhook.records.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_server_error_escalates_to_operator() {
  let h = harness(ClassifierScript::Legitimate, 503, "upstream broke", false);
  let processed = h
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();

  let webhook = status_of(&processed.outcomes, "crm_webhook");
  assert_eq!(webhook.status, ChannelStatus::Failed);
  assert_eq!(webhook.error.as_deref(), Some("status 503"));

  let alerts = h.alerts.messages.lock().unwrap();
  assert_eq!(alerts.len(), 1);
  assert!(alerts[0].contains("503"));
}

#[tokio::test]
async fn embedded_body_code_beats_transport_status() {
  // Transport says 200, body says [404]: the embedded code is authoritative,
  // and a 4xx is reported without operator escalation.
  let h = harness(ClassifierScript::Legitimate, 200, "[404] contact route missing", false);
  let processed = h
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();

  let webhook = status_of(&processed.outcomes, "crm_webhook");
  assert_eq!(webhook.status, ChannelStatus::Failed);
  assert_eq!(webhook.error.as_deref(), Some("status 404"));
  assert!(h.alerts.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn validation_runs_after_classification() {
  let h = harness(ClassifierScript::Legitimate, 200, "ok", false);
  let mut raw = form_submission("I was in a car accident.");
  raw.email = None;

  let err = h.pipeline.process(&raw, Utc::now()).await.unwrap_err();
  assert!(err.to_string().contains("email"));
  // The oracle was consulted before the field check, so an adversarial probe
  // cannot use validation errors to map the spam filter.
  assert_eq!(h.classifier.calls.load(Ordering::SeqCst), 1);
  assert!(h.webhook.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn spam_response_is_indistinguishable_from_success() {
  let clean = harness(ClassifierScript::Legitimate, 200, "ok", false);
  let spammy = harness(ClassifierScript::Spam, 200, "ok", false);

  let ok = clean
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();
  let suppressed = spammy
    .pipeline
    .process(&form_submission("I was in a car accident."), Utc::now())
    .await
    .unwrap();

  let ok_json = serde_json::to_value(SubmitResponse::from_processed(ok)).unwrap();
  let spam_json = serde_json::to_value(SubmitResponse::from_processed(suppressed)).unwrap();
  assert_eq!(ok_json, spam_json, "spam and success responses must be byte-identical in shape");
}
