use crate::model::{ActivityItem, ActivityRecord};

const FIXED_COUNTS: [usize; 7] = [5, 10, 15, 3, 2, 12, 14];

/// Count used for the member at `roster_index`; `None` means not in the roster.
pub fn mock_count(roster_index: Option<usize>) -> usize {
    match roster_index {
        Some(index) => FIXED_COUNTS.get(index).copied().unwrap_or(index + 1),
        None => 0,
    }
}

/// Deterministic stand-in for a remote query.
pub fn mock_record(user: &str, roster_index: Option<usize>) -> ActivityRecord {
    let count = mock_count(roster_index);
    let seed = roster_index.map_or(0, |index| index as u64 + 1);
    let repo = format!("mock-org/{}-service", user);
    let items = (1..=count as u64)
        .map(|n| {
            let pr = seed * 1000 + n;
            ActivityItem {
                pr,
                url: format!("https://github.com/{}/pull/{}", repo, pr),
                repo: repo.clone(),
            }
        })
        .collect();
    ActivityRecord::new(items)
}
