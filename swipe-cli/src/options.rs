//! Option handling shared by the subcommands.

use camino::{Utf8Path, Utf8PathBuf};
use swipe_scorer::DecisionPolicy;

use crate::CliError;

/// Split a comma-separated option into trimmed, non-empty items.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Overlay configured thresholds and probabilities on the default policy.
pub(crate) fn decision_policy(
    high_threshold: Option<i64>,
    mid_threshold: Option<i64>,
    p_high: Option<f64>,
    p_mid: Option<f64>,
) -> Result<DecisionPolicy, CliError> {
    let defaults = DecisionPolicy::default();
    let policy = DecisionPolicy {
        high_threshold: high_threshold.unwrap_or(defaults.high_threshold),
        mid_threshold: mid_threshold.unwrap_or(defaults.mid_threshold),
        p_high: p_high.unwrap_or(defaults.p_high),
        p_mid: p_mid.unwrap_or(defaults.p_mid),
    };
    Ok(policy.validate()?)
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match swipe_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Browser launch options resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BrowserOptions {
    pub(crate) headless: bool,
    pub(crate) user_data_dir: Option<Utf8PathBuf>,
    pub(crate) chrome: Option<Utf8PathBuf>,
    pub(crate) remote_url: Option<String>,
    pub(crate) window: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            user_data_dir: None,
            chrome: None,
            remote_url: None,
            window: (1920, 1080),
        }
    }
}

impl BrowserOptions {
    pub(crate) fn resolve(
        headless: Option<bool>,
        user_data_dir: Option<Utf8PathBuf>,
        chrome: Option<Utf8PathBuf>,
        remote_url: Option<String>,
        window_width: Option<u32>,
        window_height: Option<u32>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            headless: headless.unwrap_or(defaults.headless),
            user_data_dir,
            chrome,
            remote_url,
            window: (
                window_width.unwrap_or(defaults.window.0),
                window_height.unwrap_or(defaults.window.1),
            ),
        }
    }

    #[cfg(feature = "browser")]
    pub(crate) fn settings(&self) -> swipe_browser::BrowserSettings {
        swipe_browser::BrowserSettings {
            remote_url: self.remote_url.clone(),
            headless: self.headless,
            user_data_dir: self.user_data_dir.clone(),
            executable: self.chrome.clone(),
            window_width: self.window.0,
            window_height: self.window.1,
            ..swipe_browser::BrowserSettings::default()
        }
    }
}
