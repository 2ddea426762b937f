//! Submission checker library

pub mod checklist;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{CheckerError, Result};
pub use processing::{ChecklistEvaluator, ComplianceReport, FieldResult, Page, Pathway};
