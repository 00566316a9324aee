//! Diagnostic screenshots and discovered social handles.
//!
//! Audit output is best effort: the decision loop logs failures and carries
//! on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Folder a screenshot is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditCategory {
    /// Liked profiles.
    Yes,
    /// Rejected profiles.
    Nopes,
    /// Profiles rejected for a blacklisted term.
    Blacklist,
}

impl AuditCategory {
    /// Directory name for the category.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::Nopes => "Nopes",
            Self::Blacklist => "Blacklist",
        }
    }
}

/// Errors raised while writing audit output.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Writing a screenshot failed.
    #[error("failed to write audit screenshot {path}")]
    Screenshot {
        /// Target file.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Appending to the handle log failed.
    #[error("failed to append to handle log {path}")]
    Handles {
        /// Handle log path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}

/// Destination for audit artefacts.
///
/// One sink may serve several loops at once through an [`Arc`].
pub trait AuditSink: Send {
    /// Persist a PNG screenshot for `site` under `category`.
    fn save_screenshot(
        &self,
        category: AuditCategory,
        site: &str,
        png: &[u8],
    ) -> Result<(), AuditError>;

    /// Record social handles discovered in a bio.
    fn record_handles(&self, site: &str, handles: &[String]) -> Result<(), AuditError>;
}

impl<T: AuditSink + Sync> AuditSink for Arc<T> {
    fn save_screenshot(
        &self,
        category: AuditCategory,
        site: &str,
        png: &[u8],
    ) -> Result<(), AuditError> {
        (**self).save_screenshot(category, site, png)
    }

    fn record_handles(&self, site: &str, handles: &[String]) -> Result<(), AuditError> {
        (**self).record_handles(site, handles)
    }
}

/// File name of the handle log inside the audit root.
pub const HANDLE_LOG: &str = "handles.txt";

/// [`AuditSink`] writing under a root directory.
///
/// Screenshots land in `<root>/<category>/<site>/<site>_<millis>_<seq>.png`;
/// handles are appended to `<root>/handles.txt` as
/// `<site> https://www.instagram.com/<name>` lines.
#[derive(Debug)]
pub struct ScreenshotAudit {
    root: Utf8PathBuf,
    sequence: AtomicU64,
    handle_log: Mutex<()>,
}

impl ScreenshotAudit {
    /// Write audit output under `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            sequence: AtomicU64::new(0),
            handle_log: Mutex::new(()),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn screenshot_path(&self, category: AuditCategory, site: &str) -> Utf8PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis());
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(category.dir_name())
            .join(site)
            .join(format!("{site}_{millis}_{seq}.png"))
    }
}

impl AuditSink for ScreenshotAudit {
    fn save_screenshot(
        &self,
        category: AuditCategory,
        site: &str,
        png: &[u8],
    ) -> Result<(), AuditError> {
        let path = self.screenshot_path(category, site);
        swipe_fs::write_file(&path, png).map_err(|source| AuditError::Screenshot {
            path: path.clone(),
            source,
        })?;
        log::debug!("saved {} screenshot {path}", category.dir_name());
        Ok(())
    }

    fn record_handles(&self, site: &str, handles: &[String]) -> Result<(), AuditError> {
        if handles.is_empty() {
            return Ok(());
        }
        let lines: Vec<String> = handles
            .iter()
            .map(|handle| {
                let name = handle.trim_start_matches('@');
                format!("{site} https://www.instagram.com/{name}")
            })
            .collect();
        let path = self.root.join(HANDLE_LOG);
        let _guard = self
            .handle_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        swipe_fs::append_line(&path, &lines.join("\n"))
            .map_err(|source| AuditError::Handles { path, source })
    }
}
