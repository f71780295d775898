use crate::config::Pacing;
use crate::github::ReviewSource;
use crate::model::{ActivityRecord, DATE_FORMAT};
use crate::storage::details;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FetchStatus {
    Fetched { attempts: u32 },
    /// Rejected before any query; not a failure.
    InvalidQuery,
    /// Attempts exhausted, record degraded to zero.
    Degraded { attempts: u32, last_error: String },
    DryRun,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub record: ActivityRecord,
    pub status: FetchStatus,
}

impl FetchOutcome {
    fn empty(status: FetchStatus) -> Self {
        Self {
            record: ActivityRecord::empty(),
            status,
        }
    }
}

/// Bounded, paced retries of one (user, period) query.
pub struct RetryFetcher<S> {
    source: S,
    pacing: Pacing,
    limit: usize,
    details_dir: Option<PathBuf>,
    dry_run: bool,
}

impl<S: ReviewSource> RetryFetcher<S> {
    pub fn new(source: S, pacing: Pacing, limit: usize) -> Self {
        Self {
            source,
            pacing,
            limit,
            details_dir: None,
            dry_run: false,
        }
    }

    pub fn with_details(mut self, details_dir: Option<PathBuf>) -> Self {
        self.details_dir = details_dir;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn fetch(&self, user: &str, start: &str, end: &str) -> FetchOutcome {
        if !is_valid_query(user, start, end) {
            tracing::debug!(user, start, end, "skipping invalid query");
            return FetchOutcome::empty(FetchStatus::InvalidQuery);
        }
        if self.dry_run {
            return FetchOutcome::empty(FetchStatus::DryRun);
        }

        let attempts = self.pacing.attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            pause(self.pacing.request_delay).await;
            match self
                .source
                .search_reviewed(user, start, end, self.limit)
                .await
            {
                Ok(items) => {
                    if items.len() >= self.limit {
                        tracing::warn!(
                            user,
                            start,
                            end,
                            limit = self.limit,
                            "result hit the query cap, count may be truncated"
                        );
                    }
                    if let Some(dir) = &self.details_dir {
                        if let Err(err) = details::write(dir, user, start, end, &items) {
                            tracing::warn!(user, start, end, error = %err, "could not write detail file");
                        }
                    }
                    return FetchOutcome {
                        record: ActivityRecord::new(items),
                        status: FetchStatus::Fetched { attempts: attempt },
                    };
                }
                Err(err) => {
                    tracing::info!(
                        user,
                        start,
                        end,
                        attempt,
                        rate_limited = err.is_rate_limited(),
                        error = %err,
                        "query failed"
                    );
                    last_error = err.to_string();
                    if attempt < attempts {
                        pause(self.pacing.retry_delay).await;
                    }
                }
            }
        }

        tracing::warn!(user, start, end, attempts, error = %last_error, "degraded to zero after retries");
        FetchOutcome::empty(FetchStatus::Degraded {
            attempts,
            last_error,
        })
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Non-empty user and two strict `YYYY-MM-DD` dates in order.
pub fn is_valid_query(user: &str, start: &str, end: &str) -> bool {
    let is_date = |s: &str| {
        DATE_PATTERN.is_match(s) && NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
    };
    !user.trim().is_empty() && is_date(start) && is_date(end) && start <= end
}
