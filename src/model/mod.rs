mod activity;
mod document;
mod error;
mod member;
mod period;

pub use activity::{ActivityItem, ActivityRecord};
pub use document::{CollectionDocument, UserReport};
pub use error::{ConfigError, Error, FetchError, IntegrityWarning, Result};
pub use member::{Member, Team};
pub use period::{DateRange, PeriodSet, DATE_FORMAT};
