//! Lead Intake Engine — deterministic, rule-based core.
//!
//! Normalizes inbound form/chatbot submissions, fingerprints them for
//! duplicate suppression, rate-limits per client, and runs a cheap heuristic
//! spam screen before anything reaches the classification oracle.
//!
//! No AI, no DB, no network; pure computation + in-memory state.

pub mod config;
pub mod dedup;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod rate_limit;
pub mod screen;
pub mod types;

pub use config::Config;
pub use dedup::DuplicateDetector;
pub use error::EngineError;
pub use rate_limit::RateLimiter;
pub use screen::ScreenFlag;
pub use types::{ChannelOutcome, ChannelStatus, InboundSubmission, Source, Submission};
