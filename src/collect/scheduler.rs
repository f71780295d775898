use crate::collect::fetcher::{pause, FetchOutcome, FetchStatus, RetryFetcher};
use crate::collect::{mock, DocumentAssembler};
use crate::config::RunConfig;
use crate::github::ReviewSource;
use crate::model::{CollectionDocument, PeriodSet, Team, UserReport};
use indexmap::IndexMap;
use indicatif::ProgressBar;
use std::time::Duration;

enum Provider<S> {
    Mock,
    Remote(RetryFetcher<S>),
}

/// A (user, period) pair that fell back to an empty record.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Degraded {
    pub user: String,
    pub period: String,
    pub reason: String,
}

pub struct Collected {
    pub document: CollectionDocument,
    pub degraded: Vec<Degraded>,
}

/// Walks users then periods strictly in order, one query in flight at a time.
pub struct Scheduler<'a, S> {
    provider: Provider<S>,
    config: &'a RunConfig,
}

impl<'a, S: ReviewSource> Scheduler<'a, S> {
    pub fn mock(config: &'a RunConfig) -> Self {
        Self {
            provider: Provider::Mock,
            config,
        }
    }

    pub fn remote(fetcher: RetryFetcher<S>, config: &'a RunConfig) -> Self {
        Self {
            provider: Provider::Remote(fetcher),
            config,
        }
    }

    pub async fn run(&self, team: &Team, periods: &PeriodSet, pb: &ProgressBar) -> Collected {
        let total = team.members.len();
        pb.set_length(total as u64);
        let mut assembler = DocumentAssembler::new(&team.name, self.config.mode.test, periods.ranges());
        let mut degraded = vec![];

        for (position, member) in team.members.iter().enumerate() {
            let mut records = IndexMap::with_capacity(periods.len());
            for period in periods.iter() {
                pb.set_message(format!("{} ({})", member.display_name, period.name));
                let outcome = match &self.provider {
                    Provider::Mock => FetchOutcome {
                        record: mock::mock_record(&member.username, team.position(&member.username)),
                        status: FetchStatus::Fetched { attempts: 1 },
                    },
                    Provider::Remote(fetcher) => {
                        fetcher
                            .fetch(&member.username, &period.start_str(), &period.end_str())
                            .await
                    }
                };
                match &outcome.status {
                    FetchStatus::Degraded {
                        attempts,
                        last_error,
                    } => degraded.push(Degraded {
                        user: member.username.clone(),
                        period: period.name.clone(),
                        reason: format!("{} (after {} attempts)", last_error, attempts),
                    }),
                    FetchStatus::Fetched { attempts } if *attempts > 1 => {
                        tracing::info!(user = %member.username, period = %period.name, attempts, "recovered after retry");
                    }
                    _ => {}
                }
                records.insert(period.name.clone(), outcome.record);
                pause(self.period_delay()).await;
            }

            let report = UserReport::new(member, records);
            tracing::info!(
                user = %member.username,
                position = position + 1,
                total,
                counts = ?report.records.values().map(|r| r.count()).collect::<Vec<_>>(),
                "collected user"
            );
            assembler.append(report);
            pb.inc(1);

            pause(self.throttle_after(position, total)).await;
        }

        Collected {
            document: assembler.finalize(),
            degraded,
        }
    }

    fn period_delay(&self) -> Duration {
        if self.config.mode.test {
            Duration::ZERO
        } else {
            self.config.pacing.period_delay
        }
    }

    /// Pause before the next user; none after the last one.
    pub fn throttle_after(&self, position: usize, total: usize) -> Duration {
        if self.config.mode.test || position + 1 >= total {
            Duration::ZERO
        } else {
            self.config.pacing.throttle_delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, Pacing};
    use crate::model::{ActivityItem, FetchError, Member};
    use crate::storage::persist;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingSource {
        calls: RefCell<Vec<(String, String, String)>>,
    }

    impl ReviewSource for &RecordingSource {
        async fn search_reviewed(
            &self,
            user: &str,
            start: &str,
            end: &str,
            _limit: usize,
        ) -> Result<Vec<ActivityItem>, FetchError> {
            self.calls
                .borrow_mut()
                .push((user.to_string(), start.to_string(), end.to_string()));
            if user == "broken" {
                return Err(FetchError::Timeout(Duration::from_secs(60)));
            }
            Ok(vec![ActivityItem {
                pr: 1,
                repo: format!("acme/{}", user),
                url: format!("https://github.com/acme/{}/pull/1", user),
            }])
        }
    }

    fn team(names: &[&str]) -> Team {
        let members = names
            .iter()
            .enumerate()
            .map(|(i, n)| Member::new(*n, format!("Member {}", i)))
            .collect();
        Team::new("Test Team", members).unwrap()
    }

    fn config(mode: Mode) -> RunConfig {
        RunConfig::new(mode, "data".into(), NaiveDate::from_ymd_opt(2026, 1, 27).unwrap(), 2025)
    }

    fn test_mode() -> Mode {
        Mode { test: true, dry_run: false }
    }

    #[tokio::test]
    async fn mock_run_matches_fixed_counts() {
        let config = config(test_mode());
        let periods = PeriodSet::new(config.today, config.year);
        let scheduler = Scheduler::<&RecordingSource>::mock(&config);

        let collected = scheduler
            .run(&team(&["u0", "u1"]), &periods, &ProgressBar::hidden())
            .await;

        let document = collected.document;
        assert!(document.test_mode);
        assert_eq!(document.team, "Test Team");
        assert_eq!(document.reviews.len(), 2);
        assert_eq!(document.reviews[0].count("full_2025"), 5);
        assert_eq!(document.reviews[1].count("full_2025"), 10);
        assert_eq!(document.reviews[1].count("last_month"), 10);
        assert!(collected.degraded.is_empty());
        assert!(document.validate().is_ok());
    }

    #[tokio::test]
    async fn mock_runs_are_reproducible() {
        let config = config(test_mode());
        let periods = PeriodSet::new(config.today, config.year);
        let team = team(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let scheduler = Scheduler::<&RecordingSource>::mock(&config);

        let first = scheduler.run(&team, &periods, &ProgressBar::hidden()).await.document;
        let second = scheduler.run(&team, &periods, &ProgressBar::hidden()).await.document;

        assert_eq!(first.reviews, second.reviews);
        let counts = first
            .reviews
            .iter()
            .map(|r| r.count("h2_2025"))
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![5, 10, 15, 3, 2, 12, 14, 8]);
        for report in &first.reviews {
            for record in report.records.values() {
                assert_eq!(record.items().len(), record.count());
            }
        }
    }

    #[tokio::test]
    async fn queries_users_then_periods_in_order() {
        let mut config = config(Mode::default());
        config.pacing = Pacing::immediate();
        let periods = PeriodSet::new(config.today, config.year);
        let source = RecordingSource::default();
        let scheduler = Scheduler::remote(RetryFetcher::new(&source, config.pacing, config.limit), &config);

        let collected = scheduler
            .run(&team(&["u0", "u1"]), &periods, &ProgressBar::hidden())
            .await;

        let calls = source.calls.borrow();
        let order = calls
            .iter()
            .map(|(user, start, end)| format!("{} {}..{}", user, start, end))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                "u0 2025-12-27..2026-01-27",
                "u0 2025-10-27..2026-01-27",
                "u0 2025-06-01..2025-12-31",
                "u0 2025-01-01..2025-12-31",
                "u1 2025-12-27..2026-01-27",
                "u1 2025-10-27..2026-01-27",
                "u1 2025-06-01..2025-12-31",
                "u1 2025-01-01..2025-12-31",
            ]
        );
        assert!(!collected.document.test_mode);
        assert_eq!(collected.document.reviews[1].records["last_month"].items()[0].repo, "acme/u1");
    }

    #[tokio::test]
    async fn failing_user_degrades_without_aborting() {
        let mut config = config(Mode::default());
        config.pacing = Pacing::immediate();
        let periods = PeriodSet::new(config.today, config.year);
        let source = RecordingSource::default();
        let scheduler = Scheduler::remote(RetryFetcher::new(&source, config.pacing, config.limit), &config);

        let collected = scheduler
            .run(&team(&["u0", "broken", "u2"]), &periods, &ProgressBar::hidden())
            .await;

        let document = collected.document;
        assert_eq!(document.reviews.len(), 3);
        assert_eq!(document.reviews[0].count("full_2025"), 1);
        assert_eq!(document.reviews[1].count("full_2025"), 0);
        assert_eq!(document.reviews[2].count("full_2025"), 1);
        assert_eq!(collected.degraded.len(), 4);
        assert!(collected.degraded.iter().all(|d| d.user == "broken"));
        // three attempts for each of the broken user's periods
        assert_eq!(source.calls.borrow().len(), 4 + 12 + 4);
    }

    #[test]
    fn throttle_skips_last_user_and_test_mode() {
        let production = config(Mode::default());
        let scheduler = Scheduler::<&RecordingSource>::mock(&production);
        assert_eq!(scheduler.throttle_after(0, 3), Duration::from_secs(5));
        assert_eq!(scheduler.throttle_after(1, 3), Duration::from_secs(5));
        assert_eq!(scheduler.throttle_after(2, 3), Duration::ZERO);
        assert_eq!(scheduler.throttle_after(0, 1), Duration::ZERO);

        let disabled = config(Mode::default()).with_throttle(Some(0), false);
        let scheduler = Scheduler::<&RecordingSource>::mock(&disabled);
        assert_eq!(scheduler.throttle_after(0, 3), Duration::ZERO);

        let test = config(test_mode());
        let scheduler = Scheduler::<&RecordingSource>::mock(&test);
        assert_eq!(scheduler.throttle_after(0, 3), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_periods_and_users() {
        let mut config = config(Mode::default());
        config.pacing = Pacing {
            request_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            period_delay: Duration::from_secs(2),
            throttle_delay: Duration::from_secs(10),
            ..Pacing::default()
        };
        let periods = PeriodSet::new(config.today, config.year);
        let source = RecordingSource::default();
        let scheduler = Scheduler::remote(RetryFetcher::new(&source, config.pacing, config.limit), &config);
        let started = Instant::now();

        scheduler
            .run(&team(&["u0", "u1"]), &periods, &ProgressBar::hidden())
            .await;

        // a period delay after each of the eight queries, one throttle between users
        assert_eq!(started.elapsed(), Duration::from_secs(2 * 4 * 2 + 10));
    }

    #[tokio::test(start_paused = true)]
    async fn period_delay_kept_when_throttle_disabled() {
        let mut config = config(Mode::default()).with_throttle(Some(0), false);
        config.pacing.request_delay = Duration::ZERO;
        let periods = PeriodSet::new(config.today, config.year);
        let source = RecordingSource::default();
        let scheduler = Scheduler::remote(RetryFetcher::new(&source, config.pacing, config.limit), &config);
        let started = Instant::now();

        scheduler
            .run(&team(&["u0", "u1"]), &periods, &ProgressBar::hidden())
            .await;

        assert_eq!(config.pacing.period_delay, Duration::from_secs(2));
        assert_eq!(started.elapsed(), Duration::from_secs(8 * 2));
    }

    #[tokio::test(start_paused = true)]
    async fn dry_run_yields_empty_records_without_querying() {
        let config = config(Mode { test: false, dry_run: true });
        let periods = PeriodSet::new(config.today, config.year);
        let source = RecordingSource::default();
        let fetcher = RetryFetcher::new(&source, config.pacing, config.limit).with_dry_run(true);
        let scheduler = Scheduler::remote(fetcher, &config);
        let started = Instant::now();

        let collected = scheduler
            .run(&team(&["u0", "u1"]), &periods, &ProgressBar::hidden())
            .await;

        assert!(source.calls.borrow().is_empty());
        assert_eq!(started.elapsed(), Duration::ZERO);
        let document = collected.document;
        assert!(!document.test_mode);
        assert_eq!(document.reviews.len(), 2);
        for report in &document.reviews {
            assert_eq!(report.records.len(), 4);
            assert!(report.records.values().all(|r| r.count() == 0 && r.items().is_empty()));
        }
        assert!(collected.degraded.is_empty());
        assert!(document.validate().is_ok());

        let dir = tempfile::tempdir().unwrap();
        let planned = persist::planned_path(&document, dir.path());
        assert_eq!(
            planned,
            dir.path().join(format!("code_reviews_{}.json", document.generated_at.format("%Y%m%d_%H%M%S")))
        );
        assert!(!planned.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
