use serde::{Deserialize, Serialize};

/// Severity of a single accessibility finding.
///
/// Wire format is the lowercase string the model is instructed to emit.
/// An unrecognized value is a deserialization error, never a default:
/// a mis-tagged severity would corrupt grouping and marker colors downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl Severity {
    /// All severities in display order (worst first).
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Major, Severity::Minor];

    /// Paint-order priority: higher paints later, so overlapping markers
    /// surface the worst issue on top.
    pub fn priority(self) -> u8 {
        match self {
            Severity::Critical => 2,
            Severity::Major => 1,
            Severity::Minor => 0,
        }
    }

    /// Section heading used by the results panel.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Major => "Major",
            Severity::Minor => "Minor",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Major => write!(f, "major"),
            Severity::Minor => write!(f, "minor"),
        }
    }
}

/// One accessibility finding reported by the model.
///
/// Field names on the wire are camelCase to match the output schema the
/// model is prompted with. The position fields are percentages of the
/// image's intrinsic (unscaled) bounding box, clamped to [0, 100] at
/// normalization time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    /// Standards clause code, e.g. "1.4.3". Opaque, display-only.
    pub criterion: String,
    pub title: String,
    /// Human description of where in the UI, e.g. "top navigation bar".
    pub location: String,
    pub location_percent_x: f64,
    pub location_percent_y: f64,
    pub problem: String,
    pub recommendation: String,
}

/// A completed audit payload: overall score, summary, and ordered issues.
///
/// The ordering of `issues` defines the stable index space used to join a
/// screenshot marker with its detail card. Display-side grouping carries
/// the original index alongside and never renumbers this sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub score: i64,
    pub summary: String,
    pub issues: Vec<Issue>,
}
