//! Heuristic spam screen: cheap local checks run before the classification
//! oracle, so obvious junk never costs an oracle call. The oracle stays
//! authoritative for everything the screen passes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static URL_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("url regex"));
static EMAIL_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex"));

/// Keywords lifted from years of junk in the intake inbox: pharmacy spam,
/// commercial blasts, advance-fee bait.
const SPAM_KEYWORDS: &[&str] = &[
  "viagra", "cialis", "levitra", "pharmacy", "drugs", "medication",
  "buy", "sell", "discount", "offer", "deal", "cheap", "price",
  "lottery", "winner", "inheritance", "bank transfer",
];

/// Alphabetic chars must be at least this many before the caps check applies;
/// short shouty strings ("HELP") are fine.
const CAPS_MIN_ALPHA: usize = 10;
const CAPS_RATIO: f64 = 0.7;

/// Repetition check applies to messages over this many words.
const REPETITION_MIN_WORDS: usize = 10;
const REPETITION_RATIO: f64 = 0.3;

/// Why the screen flagged a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenFlag {
  Url,
  EmailAddress,
  Keyword,
  ExcessiveCaps,
  Repetition,
}

impl ScreenFlag {
  pub fn tag(self) -> &'static str {
    match self {
      Self::Url => "url",
      Self::EmailAddress => "email_address",
      Self::Keyword => "keyword",
      Self::ExcessiveCaps => "excessive_caps",
      Self::Repetition => "repetition",
    }
  }
}

/// Screen a case description. `None` means the message passes and goes on to
/// the oracle; `Some(flag)` is treated exactly like an oracle SPAM verdict.
pub fn screen(case_text: &str) -> Option<ScreenFlag> {
  if URL_RE.is_match(case_text) {
    return Some(ScreenFlag::Url);
  }
  if EMAIL_RE.is_match(case_text) {
    return Some(ScreenFlag::EmailAddress);
  }

  let lower = case_text.to_lowercase();
  if SPAM_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
    return Some(ScreenFlag::Keyword);
  }

  let alpha: Vec<char> = case_text.chars().filter(|c| c.is_alphabetic()).collect();
  if alpha.len() >= CAPS_MIN_ALPHA {
    let upper = alpha.iter().filter(|c| c.is_uppercase()).count();
    if upper as f64 / alpha.len() as f64 > CAPS_RATIO {
      return Some(ScreenFlag::ExcessiveCaps);
    }
  }

  let words: Vec<&str> = lower.split_whitespace().collect();
  if words.len() > REPETITION_MIN_WORDS {
    let mut freq = std::collections::HashMap::new();
    for word in &words {
      *freq.entry(*word).or_insert(0usize) += 1;
    }
    let max = freq.values().copied().max().unwrap_or(0);
    if max as f64 > words.len() as f64 * REPETITION_RATIO {
      return Some(ScreenFlag::Repetition);
    }
  }

  None
}
