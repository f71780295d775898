use serde::{Deserialize, Serialize};

/// One reviewed pull request.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub pr: u64,
    pub repo: String,
    pub url: String,
}

/// Activity of one user over one period. The count is always the number of
/// items; it is never stored separately in memory.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "RecordRepr", try_from = "RecordRepr")]
pub struct ActivityRecord {
    items: Vec<ActivityItem>,
}

#[derive(Serialize, Deserialize)]
struct RecordRepr {
    count: usize,
    prs: Vec<ActivityItem>,
}

impl ActivityRecord {
    pub fn new(items: Vec<ActivityItem>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[ActivityItem] {
        &self.items
    }
}

impl From<ActivityRecord> for RecordRepr {
    fn from(record: ActivityRecord) -> Self {
        Self {
            count: record.items.len(),
            prs: record.items,
        }
    }
}

impl TryFrom<RecordRepr> for ActivityRecord {
    type Error = String;

    fn try_from(repr: RecordRepr) -> Result<Self, Self::Error> {
        if repr.count != repr.prs.len() {
            return Err(format!(
                "count {} does not match {} listed pull requests",
                repr.count,
                repr.prs.len()
            ));
        }
        Ok(Self::new(repr.prs))
    }
}
