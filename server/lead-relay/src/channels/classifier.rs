//! HTTP adapter for the spam classification oracle.
//!
//! The oracle contract is one word: `SPAM` or `LEGITIMATE`. Real oracles
//! wrap that word in JSON or trailing punctuation, so the parse is loose;
//! anything that does not resolve to exactly one label is a `BadReply`, and
//! the pipeline's fail-open policy takes over.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ChannelError, SpamClassifier, Verdict};

pub struct HttpSpamClassifier {
  client: reqwest::Client,
  url: String,
}

impl HttpSpamClassifier {
  pub fn new(client: reqwest::Client, url: String) -> Self {
    Self { client, url }
  }
}

#[async_trait]
impl SpamClassifier for HttpSpamClassifier {
  async fn classify(
    &self,
    name: &str,
    phone: Option<&str>,
    email: &str,
    case_text: &str,
  ) -> Result<Verdict, ChannelError> {
    let payload = json!({
      "name": name,
      "phone": phone,
      "email": email,
      "case_description": case_text,
    });

    let resp = self.client.post(&self.url).json(&payload).send().await?;
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if !(200..300).contains(&status) {
      return Err(ChannelError::Http {
        status,
        detail: truncate(&body, 200),
      });
    }
    parse_verdict(&body)
  }
}

/// Extract the verdict label from an oracle reply body.
///
/// Accepts a bare word, a JSON string, or a JSON object carrying the word
/// under `label` or `verdict`.
pub fn parse_verdict(body: &str) -> Result<Verdict, ChannelError> {
  let token = match serde_json::from_str::<Value>(body) {
    Ok(Value::String(s)) => s,
    Ok(Value::Object(map)) => match map.get("label").or_else(|| map.get("verdict")) {
      Some(Value::String(s)) => s.clone(),
      _ => return Err(ChannelError::BadReply(truncate(body, 200))),
    },
    _ => body.to_string(),
  };

  let word: String = token
    .trim()
    .chars()
    .filter(|c| c.is_ascii_alphabetic())
    .collect::<String>()
    .to_ascii_uppercase();

  match word.as_str() {
    "SPAM" => Ok(Verdict::Spam),
    "LEGITIMATE" => Ok(Verdict::Legitimate),
    _ => Err(ChannelError::BadReply(truncate(body, 200))),
  }
}

fn truncate(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s
      .char_indices()
      .take_while(|(i, _)| *i <= max)
      .last()
      .map(|(i, _)| i)
      .unwrap_or(0);
    format!("{}…", &s[..cut])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_labels_parse() {
    assert_eq!(parse_verdict("SPAM").unwrap(), Verdict::Spam);
    assert_eq!(parse_verdict("legitimate").unwrap(), Verdict::Legitimate);
    assert_eq!(parse_verdict(" Spam.\n").unwrap(), Verdict::Spam);
  }

  #[test]
  fn json_wrapped_labels_parse() {
    assert_eq!(parse_verdict(r#""LEGITIMATE""#).unwrap(), Verdict::Legitimate);
    assert_eq!(parse_verdict(r#"{"label":"SPAM"}"#).unwrap(), Verdict::Spam);
    assert_eq!(
      parse_verdict(r#"{"verdict":"legitimate","confidence":0.93}"#).unwrap(),
      Verdict::Legitimate
    );
  }

  #[test]
  fn anything_else_is_a_bad_reply() {
    assert!(parse_verdict("maybe?").is_err());
    assert!(parse_verdict(r#"{"label":42}"#).is_err());
    assert!(parse_verdict("").is_err());
  }
}
