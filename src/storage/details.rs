use crate::model::ActivityItem;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn path(dir: &Path, user: &str, start: &str, end: &str) -> PathBuf {
    dir.join(format!("{}_{}_{}.json", user, start, end))
}

/// Raw items behind one (user, period) count, kept for audit.
pub fn write(dir: &Path, user: &str, start: &str, end: &str, items: &[ActivityItem]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = path(dir, user, start, end);
    let json = serde_json::to_vec_pretty(items)?;
    fs::write(&path, json)?;
    Ok(path)
}
