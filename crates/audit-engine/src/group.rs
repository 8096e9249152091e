//! Severity grouping for the results panel
//!
//! Issues are partitioned into fixed-order sections [Critical, Major, Minor].
//! Each member carries its index in the original produced sequence; the UI
//! labels a member `original_index + 1`, and that number is the join key
//! between the marker on the screenshot and the card in the list. Grouping
//! never renumbers the original sequence.

use serde::{Deserialize, Serialize};
use shared_types::{Issue, Severity};

/// An issue paired with its stable position in the original result sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedIssue {
    pub original_index: usize,
    pub issue: Issue,
}

impl IndexedIssue {
    /// The number shown on the marker and on the detail card.
    pub fn marker_number(&self) -> usize {
        self.original_index + 1
    }
}

/// One severity section of the results panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityGroup {
    pub severity: Severity,
    pub issues: Vec<IndexedIssue>,
    /// Fixed presentation policy: Critical and Major start expanded,
    /// Minor starts collapsed.
    pub default_expanded: bool,
}

impl SeverityGroup {
    pub fn label(&self) -> &'static str {
        self.severity.label()
    }
}

/// Partition issues into severity sections.
///
/// Sections appear in fixed order [Critical, Major, Minor]; a severity with
/// zero members is omitted entirely. Same-severity members keep their
/// original relative order.
pub fn group_by_severity(issues: &[Issue]) -> Vec<SeverityGroup> {
    Severity::ALL
        .iter()
        .filter_map(|&severity| {
            let members: Vec<IndexedIssue> = issues
                .iter()
                .enumerate()
                .filter(|(_, issue)| issue.severity == severity)
                .map(|(i, issue)| IndexedIssue {
                    original_index: i,
                    issue: issue.clone(),
                })
                .collect();

            if members.is_empty() {
                return None;
            }
            Some(SeverityGroup {
                severity,
                issues: members,
                default_expanded: severity != Severity::Minor,
            })
        })
        .collect()
}

/// Per-severity totals for the badge row above the sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
}

impl SeverityCounts {
    pub fn tally(issues: &[Issue]) -> Self {
        let mut counts = SeverityCounts::default();
        for issue in issues {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Major => counts.major += 1,
                Severity::Minor => counts.minor += 1,
            }
        }
        counts
    }
}

/// Display band for the overall score chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: i64) -> Self {
        if score >= 80 {
            ScoreBand::Good
        } else if score >= 50 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}
