//! Launch options.

use std::time::Duration;

use camino::Utf8PathBuf;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use serde::Deserialize;

use crate::BrowserError;

/// Window size used when none is configured, matching a full-HD desktop.
pub const DEFAULT_WINDOW: (u32, u32) = (1920, 1080);

/// How to start or reach Chromium.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Attach to an already running browser at this DevTools WebSocket URL
    /// instead of launching one.
    pub remote_url: Option<String>,
    /// Run without a visible window.
    pub headless: bool,
    /// Profile directory, so logins survive between runs.
    pub user_data_dir: Option<Utf8PathBuf>,
    /// Chromium executable; auto-detected when absent.
    pub executable: Option<Utf8PathBuf>,
    /// Window width in CSS pixels.
    pub window_width: u32,
    /// Window height in CSS pixels.
    pub window_height: u32,
    /// Disable the Chromium sandbox, as container setups require.
    pub no_sandbox: bool,
    /// Deadline for each DevTools request, in seconds.
    pub request_timeout_secs: u64,
    /// Additional command-line switches.
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            remote_url: None,
            headless: false,
            user_data_dir: None,
            executable: None,
            window_width: DEFAULT_WINDOW.0,
            window_height: DEFAULT_WINDOW.1,
            no_sandbox: true,
            request_timeout_secs: 30,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserSettings {
    /// Deadline for each DevTools request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Translate the settings into a launch configuration.
    ///
    /// # Errors
    /// Returns [`BrowserError::MissingExecutable`] for a configured executable
    /// that does not exist and [`BrowserError::Config`] when the builder
    /// rejects the options.
    pub fn to_config(&self) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.window_width, self.window_height)
            .viewport(None::<Viewport>)
            .request_timeout(self.request_timeout());

        if !self.headless {
            builder = builder.with_head();
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &self.executable {
            if !executable.exists() {
                return Err(BrowserError::MissingExecutable {
                    path: executable.clone(),
                });
            }
            builder = builder.chrome_executable(executable.as_std_path());
        }
        if let Some(dir) = &self.user_data_dir {
            builder = builder.user_data_dir(dir.as_std_path());
        }

        let mut args = vec![
            "--disable-infobars".to_owned(),
            "--no-first-run".to_owned(),
            "--no-default-browser-check".to_owned(),
        ];
        args.extend(self.extra_args.iter().cloned());
        builder = builder.args(args);

        builder
            .build()
            .map_err(|message| BrowserError::Config { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_a_headed_desktop_session() {
        let settings = BrowserSettings::default();
        assert!(!settings.headless);
        assert_eq!(
            (settings.window_width, settings.window_height),
            DEFAULT_WINDOW
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[rstest]
    fn partial_settings_deserialise_over_defaults() {
        let settings: BrowserSettings =
            serde_json::from_str(r#"{"headless": true, "window_width": 1600, "window_height": 900}"#)
                .expect("settings");
        assert!(settings.headless);
        assert_eq!(settings.window_width, 1600);
        assert!(settings.no_sandbox);
        assert!(settings.remote_url.is_none());
    }

    #[rstest]
    fn missing_executables_are_reported() {
        let settings = BrowserSettings {
            executable: Some(Utf8PathBuf::from("/nonexistent/chromium-swipe-test")),
            ..BrowserSettings::default()
        };
        let err = settings.to_config().expect_err("missing executable");
        assert!(matches!(err, BrowserError::MissingExecutable { .. }));
    }
}
