use crate::model::{CollectionDocument, IntegrityWarning, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LATEST_FILE: &str = "code_reviews_latest.json";
pub const TEST_FILE: &str = "code_reviews_test.json";
const FILE_PREFIX: &str = "code_reviews_";

#[derive(Debug)]
pub struct Persisted {
    pub path: PathBuf,
    pub latest_updated: bool,
    pub warning: Option<IntegrityWarning>,
}

/// Writes the document in one piece, checks it reads back, then repoints
/// the latest pointer for production runs. A failed check leaves the file in
/// place and the pointer untouched.
pub fn write(document: &CollectionDocument, data_dir: &Path) -> Result<Persisted> {
    let bytes = serde_json::to_vec_pretty(document)?;
    let stamp = document.generated_at.format("%Y%m%d_%H%M%S").to_string();
    store(data_dir, document.test_mode, &stamp, &bytes, document.reviews.len())
}

/// Where `write` would put a document; used by dry runs.
pub fn planned_path(document: &CollectionDocument, data_dir: &Path) -> PathBuf {
    if document.test_mode {
        data_dir.join(TEST_FILE)
    } else {
        let stamp = document.generated_at.format("%Y%m%d_%H%M%S").to_string();
        unique_path(data_dir, &stamp)
    }
}

fn store(
    data_dir: &Path,
    test_mode: bool,
    stamp: &str,
    bytes: &[u8],
    expected_reports: usize,
) -> Result<Persisted> {
    fs::create_dir_all(data_dir)?;
    let path = if test_mode {
        data_dir.join(TEST_FILE)
    } else {
        unique_path(data_dir, stamp)
    };
    write_atomic(&path, bytes)?;

    let warning = verify(&path, expected_reports).err();
    if let Some(warning) = &warning {
        tracing::warn!(%warning, "latest pointer left unchanged");
    }

    let mut latest_updated = false;
    if !test_mode && warning.is_none() {
        match point_latest(data_dir, &path) {
            Ok(()) => latest_updated = true,
            Err(err) => tracing::warn!(error = %err, "could not update latest pointer"),
        }
    }

    Ok(Persisted {
        path,
        latest_updated,
        warning,
    })
}

fn unique_path(data_dir: &Path, stamp: &str) -> PathBuf {
    let mut path = data_dir.join(format!("{}{}.json", FILE_PREFIX, stamp));
    let mut suffix = 1;
    while path.exists() {
        path = data_dir.join(format!("{}{}_{}.json", FILE_PREFIX, stamp, suffix));
        suffix += 1;
    }
    path
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp = temp_sibling(path);
    let mut file = File::create(&temp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&temp, path)
}

pub fn verify(path: &Path, expected_reports: usize) -> std::result::Result<(), IntegrityWarning> {
    let warning = |reason: String| IntegrityWarning {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = fs::read(path).map_err(|err| warning(err.to_string()))?;
    let document: CollectionDocument =
        serde_json::from_slice(&bytes).map_err(|err| warning(err.to_string()))?;
    if document.reviews.len() != expected_reports {
        return Err(warning(format!(
            "expected {} user reports, found {}",
            expected_reports,
            document.reviews.len()
        )));
    }
    document.validate().map_err(warning)
}

#[cfg(unix)]
fn point_latest(data_dir: &Path, target: &Path) -> io::Result<()> {
    let latest = data_dir.join(LATEST_FILE);
    let temp = temp_sibling(&latest);
    if fs::symlink_metadata(&temp).is_ok() {
        fs::remove_file(&temp)?;
    }
    let relative = target.file_name().map(PathBuf::from).unwrap_or_else(|| target.to_path_buf());
    std::os::unix::fs::symlink(relative, &temp)?;
    fs::rename(&temp, &latest)
}

#[cfg(not(unix))]
fn point_latest(data_dir: &Path, target: &Path) -> io::Result<()> {
    let latest = data_dir.join(LATEST_FILE);
    let temp = temp_sibling(&latest);
    fs::copy(target, &temp)?;
    fs::rename(&temp, &latest)
}
