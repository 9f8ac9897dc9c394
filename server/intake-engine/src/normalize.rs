//! Normalize inbound submissions into canonical internal models.

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::types::*;

/// Parse and validate an InboundSubmission into a canonical Submission.
///
/// Required fields per source (everything else passes through):
/// - all sources: name, case_description
/// - form: email
/// - chatbot: case_type, case_state
pub fn normalize(raw: &InboundSubmission, now: DateTime<Utc>) -> Result<Submission, EngineError> {
  let source = Source::from_str_loose(&raw.source)
    .ok_or_else(|| EngineError::validation("source", "expected form|chatbot"))?;

  if raw.name.trim().is_empty() {
    return Err(EngineError::validation("name", "must not be empty"));
  }

  let case_description = match raw.case_description.as_deref().map(str::trim) {
    Some(d) if !d.is_empty() => d.to_string(),
    _ => return Err(EngineError::validation("case_description", "must not be empty")),
  };

  let email = raw.email.as_deref().map(str::trim).unwrap_or_default();
  if source == Source::Form && email.is_empty() {
    return Err(EngineError::validation("email", "required for form submissions"));
  }

  if source == Source::Chatbot {
    if raw.case_type.as_deref().map(str::trim).unwrap_or_default().is_empty() {
      return Err(EngineError::validation("case_type", "required for chatbot submissions"));
    }
    if raw.case_state.as_deref().map(str::trim).unwrap_or_default().is_empty() {
      return Err(EngineError::validation("case_state", "required for chatbot submissions"));
    }
  }

  Ok(Submission {
    source,
    name: raw.name.trim().to_string(),
    email: email.to_string(),
    phone: raw.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()).map(String::from),
    case_description,
    case_type: raw.case_type.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
    case_state: raw.case_state.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
    referral: raw.referral,
    received_at: now,
  })
}

/// Strip a phone number to bare digits; drop a leading US country code
/// when the result is 11 digits starting with '1'.
pub fn normalize_phone(raw: &str) -> String {
  let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
  if digits.len() == 11 && digits.starts_with('1') {
    digits[1..].to_string()
  } else {
    digits
  }
}

/// Lowercase + trim an email for stable comparison.
pub fn normalize_email(raw: &str) -> String {
  raw.trim().to_lowercase()
}

/// Normalize free text for stable comparison:
/// - trim + lowercase
/// - collapse whitespace runs to a single space
/// - strip the punctuation set `.,!?;:"'-`
pub fn normalize_text(raw: &str) -> String {
  const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '-'];

  let mut out = String::with_capacity(raw.len());
  let mut prev_space = false;
  for ch in raw.trim().chars() {
    if ch.is_whitespace() {
      if !prev_space {
        out.push(' ');
      }
      prev_space = true;
    } else if PUNCTUATION.contains(&ch) {
      // Stripped entirely; does not break a whitespace run.
    } else {
      prev_space = false;
      for lower in ch.to_lowercase() {
        out.push(lower);
      }
    }
  }
  // A trailing run can survive when the input ends in punctuation-then-space.
  out.trim_end().to_string()
}
