//! Documentation build pipeline for specdev.
//!
//! [`BuildRunner`] drives the external build tool as a child process;
//! [`inject_live_reload`] rewrites the generated HTML with the reload
//! client before browsers are told about it.

mod inject;
mod runner;

pub use inject::{InjectError, inject_live_reload};
pub use runner::{BuildError, BuildOutcome, BuildRunner};
