pub mod details;
pub mod persist;
