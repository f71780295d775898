use crate::model::{CollectionDocument, DateRange, UserReport};
use chrono::{DateTime, FixedOffset, Local};
use indexmap::IndexMap;

/// Accumulates user reports in roster order until the run completes.
pub struct DocumentAssembler {
    team: String,
    test_mode: bool,
    periods: IndexMap<String, DateRange>,
    reviews: Vec<UserReport>,
}

impl DocumentAssembler {
    pub fn new(team: impl ToString, test_mode: bool, periods: IndexMap<String, DateRange>) -> Self {
        Self {
            team: team.to_string(),
            test_mode,
            periods,
            reviews: vec![],
        }
    }

    pub fn append(&mut self, report: UserReport) {
        debug_assert!(
            self.reviews
                .iter()
                .all(|r| r.github_username != report.github_username),
            "user appended twice"
        );
        self.reviews.push(report);
    }

    pub fn finalize(self) -> CollectionDocument {
        self.finalize_at(Local::now().fixed_offset())
    }

    pub fn finalize_at(self, generated_at: DateTime<FixedOffset>) -> CollectionDocument {
        CollectionDocument {
            generated_at,
            team: self.team,
            test_mode: self.test_mode,
            periods: self.periods,
            reviews: self.reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityRecord, Member};

    #[test]
    fn keeps_append_order() {
        let mut assembler = DocumentAssembler::new("Team", true, IndexMap::new());
        for name in ["u2", "u0", "u1"] {
            assembler.append(UserReport::new(&Member::new(name, name), IndexMap::new()));
        }

        let generated_at = DateTime::parse_from_rfc3339("2026-01-27T12:00:00+02:00").unwrap();
        let document = assembler.finalize_at(generated_at);
        let order = document
            .reviews
            .iter()
            .map(|r| r.github_username.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["u2", "u0", "u1"]);
        assert_eq!(document.generated_at, generated_at);
        assert!(document.test_mode);
    }

    #[test]
    fn finalize_stamps_current_time() {
        let before = Local::now().fixed_offset();
        let mut assembler = DocumentAssembler::new("Team", false, IndexMap::new());
        let records = IndexMap::from([("last_month".to_string(), ActivityRecord::empty())]);
        assembler.append(UserReport::new(&Member::new("u0", "A"), records));
        let document = assembler.finalize();
        assert!(document.generated_at >= before);
        assert_eq!(document.team, "Team");
        assert_eq!(document.reviews[0].count("last_month"), 0);
    }
}
