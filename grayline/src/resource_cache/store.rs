//! On-disk side of the cache: file ages, atomic writes, timestamp refresh.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Modification time of a cached file, or `None` if it does not exist.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Age of a file modified at `modified`. Timestamps in the future count as
/// age zero.
pub fn age(modified: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO)
}

/// Returns true if `modified` is no older than `ttl`.
pub fn is_within_ttl(modified: SystemTime, ttl: Duration) -> bool {
    age(modified) <= ttl
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Replace `path` with `body`.
///
/// The body goes to a sibling temp file first and is renamed into place, so
/// readers never see a half-written file. The parent directory must exist.
pub fn write_atomic(path: &Path, body: &[u8]) -> io::Result<()> {
    let temp = temp_path(path);
    let result = File::create(&temp)
        .and_then(|mut file| {
            file.write_all(body)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp, path));

    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

/// Set the modification time of `path` to now.
pub fn touch(path: &Path) -> io::Result<()> {
    File::options()
        .write(true)
        .open(path)?
        .set_modified(SystemTime::now())
}
