mod assembler;
pub mod fetcher;
pub mod mock;
pub mod scheduler;

pub use assembler::DocumentAssembler;
pub use fetcher::RetryFetcher;
pub use scheduler::{Collected, Scheduler};
