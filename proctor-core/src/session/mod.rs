//! Assessment sessions
//!
//! An [`AssessmentSession`] owns one timed attempt:
//!
//! ```text
//! Idle ──start──▶ Provisioning ──ok──▶ Active ──last answer / end / timeout──▶ Completed
//!                      │                  │
//!                      └──── failure ─────┴──── abort ──▶ Error
//! ```
//!
//! `reset` returns any state to `Idle`. Quiz sessions advance linearly and
//! grade on the last answer; coding sessions allow free navigation and
//! complete when ended by the user or by the clock.

mod assessment;
mod config;
mod state;

pub use assessment::{AssessmentSession, AttemptReport, SessionBuilder, SessionRequest};
pub use config::SessionConfig;
pub use state::{CurrentItem, ProblemProgress, SessionSnapshot, SessionStatus};
