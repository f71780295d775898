use crate::model::{ActivityRecord, DateRange, Member};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    pub github_username: String,
    pub display_name: String,
    #[serde(flatten)]
    pub records: IndexMap<String, ActivityRecord>,
}

/// Output of one run. Serialized once, never mutated after `finalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub generated_at: DateTime<FixedOffset>,
    pub team: String,
    pub test_mode: bool,
    pub periods: IndexMap<String, DateRange>,
    pub reviews: Vec<UserReport>,
}

impl UserReport {
    pub fn new(member: &Member, records: IndexMap<String, ActivityRecord>) -> Self {
        Self {
            github_username: member.username.clone(),
            display_name: member.display_name.clone(),
            records,
        }
    }

    pub fn count(&self, period: &str) -> usize {
        self.records.get(period).map_or(0, ActivityRecord::count)
    }
}

impl CollectionDocument {
    /// Structural checks beyond what the types enforce: unique users and a
    /// record for every declared period.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(duplicate) = self
            .reviews
            .iter()
            .map(|r| &r.github_username)
            .duplicates()
            .next()
        {
            return Err(format!("user `{}` appears more than once", duplicate));
        }
        for report in &self.reviews {
            for period in self.periods.keys() {
                if !report.records.contains_key(period) {
                    return Err(format!(
                        "user `{}` has no record for period `{}`",
                        report.github_username, period
                    ));
                }
            }
            if report.records.len() != self.periods.len() {
                return Err(format!(
                    "user `{}` has records for undeclared periods",
                    report.github_username
                ));
            }
        }
        Ok(())
    }
}
