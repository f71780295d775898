use chrono::{Months, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct Period {
    pub name: String,
    pub range: DateRange,
}

/// The four windows collected on every run, in collection order.
#[derive(Debug, Clone)]
pub struct PeriodSet(Vec<Period>);

// Create
impl Period {
    fn new(name: impl ToString, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            range: DateRange { start, end },
        }
    }

    pub fn start_str(&self) -> String {
        self.range.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.range.end.format(DATE_FORMAT).to_string()
    }
}

impl PeriodSet {
    /// Trailing one and three month windows ending `today`, then the second
    /// half and the whole of `year`.
    pub fn new(today: NaiveDate, year: i32) -> Self {
        let months_back = |months| {
            today
                .checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDate::MIN)
        };
        let ymd = |month, day| NaiveDate::from_ymd_opt(year, month, day).unwrap_or(today);
        Self(vec![
            Period::new("last_month", months_back(1), today),
            Period::new("last_3_months", months_back(3), today),
            Period::new(format!("h2_{}", year), ymd(6, 1), ymd(12, 31)),
            Period::new(format!("full_{}", year), ymd(1, 1), ymd(12, 31)),
        ])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Period> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn ranges(&self) -> IndexMap<String, DateRange> {
        self.0
            .iter()
            .map(|p| (p.name.clone(), p.range))
            .collect()
    }
}
