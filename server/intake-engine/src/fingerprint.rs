//! Stable fingerprint computation for duplicate suppression.

use crate::normalize::{normalize_email, normalize_phone, normalize_text};
use crate::types::{Fingerprint, Submission};

/// Compute a stable fingerprint from a submission.
///
/// Key components: normalized name + phone + email + case text + source tag.
/// Formatting-only differences (case, whitespace, punctuation, phone
/// formatting) collapse to the same value. Uses blake3 for a fast,
/// deterministic hash.
pub fn compute(submission: &Submission) -> Fingerprint {
  let mut hasher = blake3::Hasher::new();
  hasher.update(normalize_text(&submission.name).as_bytes());
  hasher.update(b"|");
  hasher.update(normalize_phone(submission.phone.as_deref().unwrap_or_default()).as_bytes());
  hasher.update(b"|");
  hasher.update(normalize_email(&submission.email).as_bytes());
  hasher.update(b"|");
  hasher.update(normalize_text(&submission.case_description).as_bytes());
  hasher.update(b"|");
  hasher.update(submission.source.tag().as_bytes());

  let hash = hasher.finalize();
  // First 16 bytes (32 hex chars) for a compact but collision-resistant ID.
  let hex = hash.to_hex();
  Fingerprint(hex[..32].to_string())
}
