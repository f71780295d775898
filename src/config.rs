use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

pub const QUERY_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Mode {
    /// Mock data, no delays, fixed output path, latest pointer untouched.
    pub test: bool,
    /// Full schedule without contacting the remote source or writing files.
    pub dry_run: bool,
}

/// Waits applied around remote queries. Every field is independent.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Pacing {
    pub request_delay: Duration,
    pub retry_delay: Duration,
    pub period_delay: Duration,
    pub throttle_delay: Duration,
    pub attempts: u32,
    pub query_timeout: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_secs(1),
            retry_delay: Duration::from_secs(5),
            period_delay: Duration::from_secs(2),
            throttle_delay: Duration::from_secs(5),
            attempts: 3,
            query_timeout: Duration::from_secs(60),
        }
    }
}

impl Pacing {
    pub fn immediate() -> Self {
        Self {
            request_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            period_delay: Duration::ZERO,
            throttle_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Everything one run needs, fixed before the first query.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    pub pacing: Pacing,
    pub data_dir: PathBuf,
    pub details: bool,
    pub year: i32,
    pub today: NaiveDate,
    pub limit: usize,
}

impl RunConfig {
    pub fn new(mode: Mode, data_dir: PathBuf, today: NaiveDate, year: i32) -> Self {
        Self {
            mode,
            pacing: if mode.test || mode.dry_run {
                Pacing::immediate()
            } else {
                Pacing::default()
            },
            data_dir,
            details: true,
            year,
            today,
            limit: QUERY_LIMIT,
        }
    }

    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    /// Test and dry runs keep every delay at zero regardless of overrides.
    pub fn with_throttle(mut self, throttle: Option<u64>, no_throttle: bool) -> Self {
        if self.mode.test || self.mode.dry_run {
            return self;
        }
        if let Some(seconds) = throttle {
            self.pacing.throttle_delay = Duration::from_secs(seconds);
        }
        if no_throttle {
            self.pacing.throttle_delay = Duration::ZERO;
            self.pacing.period_delay = Duration::ZERO;
        }
        self
    }

    pub fn details_dir(&self) -> Option<PathBuf> {
        (self.details && !self.mode.test && !self.mode.dry_run).then(|| self.data_dir.join("details"))
    }
}
