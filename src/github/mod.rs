pub mod search;

pub use search::{GhCli, ReviewSource};
