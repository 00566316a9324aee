//! Per-site locators and gestures.
//!
//! A [`SiteScript`] is plain configuration: the decision loop reads every
//! selector, key and screen region it needs from here, so supporting another
//! site means writing another script rather than another code path.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use swipe_core::{Locator, PageAction, Region};
use thiserror::Error;

/// Locators and actions for one dating site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteScript {
    /// Short name used in logs and audit folders, e.g. `Tinder`.
    pub name: String,
    /// Page the session starts on.
    pub start_url: String,
    /// Element whose presence means a profile card is loaded.
    pub profile_marker: Locator,
    /// Gesture that expands the current profile, if the site needs one.
    #[serde(default)]
    pub open_profile: Option<PageAction>,
    /// Elements holding the bio text.
    #[serde(default)]
    pub bio: Option<Locator>,
    /// Screen region sent to the classifier.
    pub classification_region: Region,
    /// Element whose presence means the card accepts a swipe.
    pub readiness_marker: Locator,
    /// Gesture that likes the profile.
    pub like: PageAction,
    /// Gesture that rejects the profile.
    pub reject: PageAction,
    /// Upsell dialog dismissed after each swipe.
    #[serde(default)]
    pub interstitial: Option<Locator>,
    /// Keys pressed while humanising, alternated in order.
    #[serde(default = "default_humanise_keys")]
    pub humanise_keys: Vec<String>,
    /// Opener campaign locators; absent when the site does not support it.
    #[serde(default)]
    pub messaging: Option<MessagingScript>,
}

/// Locators used to send a first message to matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingScript {
    /// Page listing the matches.
    pub matches_url: String,
    /// Anchors linking to individual conversations.
    pub match_links: Locator,
    /// Text input for the message.
    pub message_input: Locator,
    /// Button that sends the message.
    pub send_button: Locator,
}

fn default_humanise_keys() -> Vec<String> {
    vec!["ArrowDown".to_owned(), "ArrowUp".to_owned()]
}

/// Errors raised while loading a site script from disk.
#[derive(Debug, Error)]
pub enum SiteScriptError {
    /// Reading the file failed.
    #[error("failed to read site script at {path}")]
    Read {
        /// Requested path.
        path: camino::Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The file was not a valid site script.
    #[error("failed to parse site script at {path}")]
    Parse {
        /// Requested path.
        path: camino::Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The script has no name.
    #[error("site script at {path} has a blank name")]
    BlankName {
        /// Requested path.
        path: camino::Utf8PathBuf,
    },
    /// The name cannot be used as an audit folder name.
    #[error("site script at {path} names the site `{name}`, which is not a plain folder name")]
    UnsafeName {
        /// Requested path.
        path: camino::Utf8PathBuf,
        /// Offending name.
        name: String,
    },
}

impl SiteScript {
    /// Load a script from a JSON file.
    ///
    /// # Errors
    /// Returns [`SiteScriptError`] when the file cannot be read or parsed, or
    /// when the name is blank or would escape the audit folder.
    pub fn load(path: &Utf8Path) -> Result<Self, SiteScriptError> {
        let raw = swipe_fs::read_to_string(path).map_err(|source| SiteScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let script: Self = serde_json::from_str(&raw).map_err(|source| SiteScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if script.name.trim().is_empty() {
            return Err(SiteScriptError::BlankName {
                path: path.to_path_buf(),
            });
        }
        if !is_plain_name(&script.name) {
            return Err(SiteScriptError::UnsafeName {
                path: path.to_path_buf(),
                name: script.name,
            });
        }
        Ok(script)
    }
}

// Site names become audit folder and file names.
fn is_plain_name(name: &str) -> bool {
    !name.contains(['/', '\\', ':']) && !matches!(name.trim(), "." | "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"{
        "name": "Example",
        "start_url": "https://example.test/app",
        "profile_marker": {"css": "div.card"},
        "classification_region": {"x": 0.0, "y": 0.0, "width": 400.0, "height": 600.0},
        "readiness_marker": {"css_with_text": {"css": "button", "text": "Report"}},
        "like": {"key": "ArrowRight"},
        "reject": {"key": "ArrowLeft"}
    }"#;

    #[rstest]
    fn loads_minimal_script_with_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        let path = root.join("site.json");
        std::fs::write(path.as_std_path(), MINIMAL).expect("write script");

        let script = SiteScript::load(&path).expect("load script");

        assert_eq!(script.name, "Example");
        assert_eq!(script.like, PageAction::key("ArrowRight"));
        assert_eq!(script.humanise_keys, ["ArrowDown", "ArrowUp"]);
        assert!(script.open_profile.is_none());
        assert!(script.messaging.is_none());
    }

    #[rstest]
    fn blank_name_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        let path = root.join("site.json");
        let blank = MINIMAL.replace("\"Example\"", "\"  \"");
        std::fs::write(path.as_std_path(), blank).expect("write script");

        let err = SiteScript::load(&path).expect_err("blank name");
        assert!(matches!(err, SiteScriptError::BlankName { .. }));
    }

    #[rstest]
    #[case("../../outside")]
    #[case("..")]
    #[case("nested/site")]
    #[case("C:\\temp")]
    fn names_that_leave_the_audit_folder_are_rejected(#[case] name: &str) {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        let path = root.join("site.json");
        let quoted = serde_json::to_string(name).expect("quote name");
        let script = MINIMAL.replace("\"Example\"", &quoted);
        std::fs::write(path.as_std_path(), script).expect("write script");

        let err = SiteScript::load(&path).expect_err("unsafe name");
        match err {
            SiteScriptError::UnsafeName { name: found, .. } => assert_eq!(found, name),
            other => panic!("expected UnsafeName, found {other:?}"),
        }
    }
}
