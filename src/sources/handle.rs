use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Shape every temp-file prefix must have before the janitor will touch it
static EXPECTED_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^temp_[A-Za-z0-9_-]{11}_[0-9]+_[a-z0-9]{6}$").unwrap());

/// Scopes one extraction attempt's temporary files.
///
/// The prefix combines the video id, a millisecond timestamp and a random
/// suffix, so concurrent invocations never share output files. Every file
/// the external tool writes under this prefix is owned exclusively by this
/// handle and removed when it is dropped, on success and failure alike.
#[derive(Debug)]
pub struct InvocationHandle {
    app_root: PathBuf,
    prefix: String,
}

impl InvocationHandle {
    /// Create a fresh handle rooted at the application working directory.
    ///
    /// `app_root` must already be canonicalized by the pipeline.
    pub fn new(app_root: &Path, video_id: &str) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let suffix: String = uuid::Uuid::new_v4().simple().to_string()[..6].to_string();
        Self {
            app_root: app_root.to_path_buf(),
            prefix: format!("temp_{}_{}_{}", video_id, timestamp, suffix),
        }
    }

    /// Unique file-name prefix for this invocation
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory the external tool writes into
    pub fn dir(&self) -> &Path {
        &self.app_root
    }

    /// Output template base path handed to the external tool
    pub fn base_path(&self) -> PathBuf {
        self.app_root.join(&self.prefix)
    }

    /// Remove every file belonging to this invocation. Safe to call more
    /// than once; also runs on drop.
    pub fn cleanup(&self) {
        cleanup_invocation(&self.app_root, &self.base_path());
    }
}

impl Drop for InvocationHandle {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Delete all files whose name starts with the invocation prefix.
///
/// Refuses to operate when the resolved (symlink-free) directory escapes the
/// application root, or when the prefix does not match the expected shape.
/// Individual deletion failures are logged and never propagate.
pub fn cleanup_invocation(app_root: &Path, base_path: &Path) {
    let prefix = match base_path.file_name().and_then(|name| name.to_str()) {
        Some(prefix) => prefix.to_string(),
        None => {
            tracing::warn!("Skipping cleanup for unexpected path: {:?}", base_path);
            return;
        }
    };
    let base_dir = match base_path.parent() {
        Some(dir) => dir,
        None => {
            tracing::warn!("Skipping cleanup for unexpected path: {:?}", base_path);
            return;
        }
    };

    let real_root = match fs_err::canonicalize(app_root) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Skipping cleanup, cannot resolve root {:?}: {}", app_root, e);
            return;
        }
    };
    let real_dir = match fs_err::canonicalize(base_dir) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Skipping cleanup, cannot resolve dir {:?}: {}", base_dir, e);
            return;
        }
    };
    if !real_dir.starts_with(&real_root) {
        tracing::warn!(
            "Skipping cleanup for path outside application root: {:?}",
            base_path
        );
        return;
    }
    if !EXPECTED_PREFIX_RE.is_match(&prefix) {
        tracing::warn!("Skipping cleanup for unexpected temp file prefix: {:?}", prefix);
        return;
    }

    let entries = match fs_err::read_dir(&real_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to list {:?} during cleanup: {}", real_dir, e);
            return;
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let matches = name
            .to_str()
            .map(|name| name.starts_with(&prefix))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        if let Err(e) = fs_err::remove_file(entry.path()) {
            tracing::warn!("Failed to remove temp file {:?}: {}", entry.path(), e);
        }
    }
}
