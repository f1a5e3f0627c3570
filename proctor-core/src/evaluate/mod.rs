//! Evaluation protocols over a [`Judge`](crate::judge::Judge)
//!
//! - [`RunEvaluator`] - every visible example at once, no short-circuit,
//!   informational only
//! - [`SubmitEvaluator`] - hidden tests one at a time, stops at the first
//!   non-Accepted verdict, decides scoring

mod run;
mod submit;

pub use run::RunEvaluator;
pub use submit::SubmitEvaluator;
