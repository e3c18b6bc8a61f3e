use chrono::NaiveDateTime;
use serde::Serialize;

/// Outcome of a pass over the managed indices against the retention policy.
#[derive(Debug, Clone, Serialize)]
pub struct RetentionSweep {
    /// Indices dated before this instant were expired.
    pub cutoff: NaiveDateTime,
    /// Deleted indices, oldest first.
    pub deleted: Vec<String>,
    pub kept: Vec<String>,
    /// Managed names whose date could not be read, left untouched.
    pub skipped: Vec<SkippedIndex>,
}

impl RetentionSweep {
    pub fn new(cutoff: NaiveDateTime) -> Self {
        RetentionSweep {
            cutoff,
            deleted: Vec::new(),
            kept: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedIndex {
    pub name: String,
    pub reason: String,
}
