use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, warn};
use crate::utils::{PipelineError, PipelineResult};

const RETRY_BACKOFF_MS: u64 = 50;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Get file size in bytes
pub async fn get_file_size(path: impl AsRef<Path>) -> PipelineResult<u64> {
    fs::metadata(path.as_ref())
        .await
        .map(|m| m.len())
        .map_err(|e| PipelineError::io(format!("Failed to get file size of {}: {}", path.as_ref().display(), e)))
}

/// Check if file exists
pub async fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::try_exists(path.as_ref()).await.unwrap_or(false)
}

/// Creates `dir` and its parents; failure is batch-fatal.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> PipelineResult<()> {
    fs::create_dir_all(dir.as_ref())
        .await
        .map_err(|e| PipelineError::directory(dir.as_ref(), e))
}

/// Reads a whole file, retrying transient failures at most `retries` extra times.
///
/// Missing files and permission errors are returned immediately.
pub async fn read_with_retry(path: impl AsRef<Path>, retries: u32) -> PipelineResult<Vec<u8>> {
    let path = path.as_ref();
    let mut attempt = 0;
    loop {
        match fs::read(path).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if is_permanent(&e) || attempt >= retries => {
                return Err(PipelineError::io(format!("Cannot read {}: {}", path.display(), e)));
            }
            Err(e) => {
                attempt += 1;
                debug!("Read of {} failed ({}), retry {}/{}", path.display(), e, attempt, retries);
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
            }
        }
    }
}

fn is_permanent(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::InvalidInput)
}

/// Writes `bytes` to a hidden sibling of `dest` and renames it into place.
///
/// Readers never observe a partially written `dest`; concurrent writers of the
/// same file resolve as last-write-wins.
pub async fn write_atomic(dest: impl AsRef<Path>, bytes: &[u8]) -> PipelineResult<()> {
    let dest = dest.as_ref();
    let tmp = temp_sibling(dest);

    if let Err(e) = fs::write(&tmp, bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(PipelineError::io(format!("Cannot write {}: {}", tmp.display(), e)));
    }
    if let Err(e) = fs::rename(&tmp, dest).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(PipelineError::io(format!("Cannot move output into {}: {}", dest.display(), e)));
    }
    Ok(())
}

fn temp_sibling(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    dest.with_file_name(format!(".{}.{}-{}.tmp", name, std::process::id(), seq))
}

/// Lists the files of `dir` in natural order.
///
/// Symlinks are followed. In-flight temporaries written by [`write_atomic`]
/// are left out; every other name is kept, dot-prefixed ones included.
pub async fn list_file_names(dir: impl AsRef<Path>) -> PipelineResult<Vec<String>> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| PipelineError::directory(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PipelineError::directory(dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_temp_sibling(&name) {
            continue;
        }
        match fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_file() => names.push(name),
            Ok(_) => {}
            Err(e) => warn!("Ignoring '{}' in {}: {}", name, dir.display(), e),
        }
    }

    names.sort_by(|a, b| natural_cmp(a, b));
    Ok(names)
}

/// Removes temporaries of [`write_atomic`] in `dir` older than `max_age`.
///
/// A write cut short by a timeout or shutdown can leave one behind. Returns
/// how many were removed.
pub async fn sweep_stale_temps(dir: impl AsRef<Path>, max_age: Duration) -> PipelineResult<usize> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| PipelineError::directory(dir, e))?;

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PipelineError::directory(dir, e))?
    {
        if !is_temp_sibling(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let age = match entry.metadata().await.and_then(|m| m.modified()) {
            Ok(modified) => SystemTime::now().duration_since(modified).unwrap_or_default(),
            Err(_) => continue,
        };
        if age >= max_age && fs::remove_file(entry.path()).await.is_ok() {
            debug!("Removed stale temporary {}", entry.path().display());
            removed += 1;
        }
    }
    Ok(removed)
}

// Matches the `.{name}.{pid}-{seq}.tmp` names from `temp_sibling`.
fn is_temp_sibling(name: &str) -> bool {
    let Some(inner) = name.strip_prefix('.').and_then(|n| n.strip_suffix(".tmp")) else {
        return false;
    };
    let Some((stem, tag)) = inner.rsplit_once('.') else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match tag.split_once('-') {
        Some((pid, seq)) => !stem.is_empty() && all_digits(pid) && all_digits(seq),
        None => false,
    }
}

/// Numeric-aware, case-insensitive ordering: `img2.png` sorts before `img10.png`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_digits(&mut left);
                let rn = take_digits(&mut right);
                let ord = ln.len().cmp(&rn.len()).then_with(|| ln.cmp(&rn));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

// Digit run with leading zeros stripped, so length orders magnitude.
fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    let trimmed = digits.trim_start_matches('0');
    trimmed.to_string()
}
