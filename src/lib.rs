//! BugRescue - an autonomous run-diagnose-patch-verify loop
//!
//! BugRescue executes every supported file under a directory, asks an AI
//! backend to patch the ones that fail, stages the candidate next to a
//! backup of the original, and re-executes it to verify the fix.

pub mod artifact;
pub mod config;
pub mod error;
pub mod extract;
pub mod inspect;
pub mod llm;
pub mod repair;
pub mod report;
pub mod runner;

pub use error::{RescueError, Result};
