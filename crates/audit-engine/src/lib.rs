//! Audit result processing
//!
//! Turns the untrusted text a multimodal model returns into a validated
//! [`shared_types::AuditResult`], and partitions its issues into the
//! fixed-order severity sections the results panel renders.

pub mod group;
pub mod parse;

pub use group::{group_by_severity, IndexedIssue, ScoreBand, SeverityCounts, SeverityGroup};
pub use parse::{parse_result, ParseError};
