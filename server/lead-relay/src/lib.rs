//! Lead Relay
//!
//! HTTP service that ingests law-firm lead submissions, screens them for
//! spam (fail-open against the external oracle), suppresses short-horizon
//! duplicates, and fans accepted leads out to the CRM webhook, email, SMS,
//! and audit-log channels. Bind to 127.0.0.1 by default (fronted by the
//! site's reverse proxy).

pub mod channels;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod state;

pub use config::{RelayConfig, RetryPolicy};
pub use error::RelayError;
pub use handlers::{health, submit, SubmitResponse};
pub use pipeline::{ChannelSet, NotifyTargets, Pipeline, Processed};
pub use state::AppState;
