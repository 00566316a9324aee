//! The browser page seen by the decision loop.
//!
//! [`BrowserPage`] is the narrow surface the loop needs from browser
//! automation: navigation, text and link queries, region screenshots, key
//! presses, clicks and bounded waits. Selector strings only ever appear in
//! [`Locator`] values supplied by configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How to find elements on a page.
///
/// # Examples
///
/// ```
/// use swipe_core::Locator;
///
/// let open = Locator::css_with_text("button", "Abrir perfil");
/// assert_eq!(open.to_string(), "button containing `Abrir perfil`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// Every element matching a CSS selector.
    Css(String),
    /// Elements matching a CSS selector whose text contains `text`.
    CssWithText {
        /// CSS selector.
        css: String,
        /// Case-sensitive text the element must contain.
        text: String,
    },
    /// The element immediately following the element whose text equals the
    /// label, as used for bio sections introduced by a heading.
    FollowingLabel(String),
}

impl Locator {
    /// Plain CSS selector.
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// CSS selector filtered by contained text.
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Sibling following a label element.
    pub fn following_label(label: impl Into<String>) -> Self {
        Self::FollowingLabel(label.into())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(css) => write!(f, "`{css}`"),
            Self::CssWithText { css, text } => write!(f, "{css} containing `{text}`"),
            Self::FollowingLabel(label) => write!(f, "element after label `{label}`"),
        }
    }
}

/// Rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Region {
    /// Create a region.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Errors surfaced by [`BrowserPage`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// An operation did not finish in time.
    #[error("page operation `{operation}` timed out")]
    Timeout {
        /// Operation that timed out.
        operation: String,
    },
    /// A required element was missing.
    #[error("no element matched {locator}")]
    ElementNotFound {
        /// Locator, rendered for logs.
        locator: String,
    },
    /// A script evaluated in the page failed or returned an unexpected shape.
    #[error("page script failed: {message}")]
    Script {
        /// Underlying message.
        message: String,
    },
    /// The automation protocol reported an error for a single command.
    #[error("browser protocol error: {message}")]
    Protocol {
        /// Underlying message.
        message: String,
    },
    /// The browser or page is gone; nothing further can succeed.
    #[error("browser session closed: {message}")]
    SessionClosed {
        /// Underlying message.
        message: String,
    },
}

impl PageError {
    /// Whether the error ends the session rather than one iteration.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionClosed { .. })
    }
}

/// Browser page driven by the decision loop.
///
/// Implementations block the calling thread until each operation completes.
/// They must be `Send` so each site can run its loop on its own thread.
pub trait BrowserPage: Send {
    /// Load `url` and wait for navigation to finish.
    fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Reload the current document.
    fn reload(&self) -> Result<(), PageError>;

    /// Capture `region` of the viewport as PNG bytes.
    fn capture_region(&self, region: Region) -> Result<Vec<u8>, PageError>;

    /// All text visible in the document body.
    fn visible_text(&self) -> Result<String, PageError>;

    /// Text content of every element matching `locator`, in document order.
    fn query_text(&self, locator: &Locator) -> Result<Vec<String>, PageError>;

    /// Absolute `href` of every anchor matching `locator`.
    fn query_links(&self, locator: &Locator) -> Result<Vec<String>, PageError>;

    /// Press and release a named key, e.g. `ArrowRight`.
    fn press_key(&self, key: &str) -> Result<(), PageError>;

    /// Click the first element matching `locator`; `false` when none matched.
    fn click(&self, locator: &Locator) -> Result<bool, PageError>;

    /// Focus the first element matching `locator` and type `text` into it.
    fn type_text(&self, locator: &Locator, text: &str) -> Result<(), PageError>;

    /// Poll until `locator` matches or `timeout` elapses; `false` on timeout.
    fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<bool, PageError>;
}

/// A single UI gesture named by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    /// Press a key.
    Key(String),
    /// Click an element.
    Click(Locator),
}

impl PageAction {
    /// Key press action.
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }

    /// Click action.
    #[must_use]
    pub const fn click(locator: Locator) -> Self {
        Self::Click(locator)
    }

    /// Apply the action; returns `false` when a click target was missing.
    pub fn perform<P>(&self, page: &P) -> Result<bool, PageError>
    where
        P: BrowserPage + ?Sized,
    {
        match self {
            Self::Key(key) => page.press_key(key).map(|()| true),
            Self::Click(locator) => page.click(locator),
        }
    }
}

impl std::fmt::Display for PageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "press {key}"),
            Self::Click(locator) => write!(f, "click {locator}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PageCall, StubPage};
    use rstest::rstest;

    #[rstest]
    #[case(PageError::SessionClosed { message: "gone".into() }, true)]
    #[case(PageError::Timeout { operation: "click".into() }, false)]
    #[case(PageError::Script { message: "boom".into() }, false)]
    fn only_closed_sessions_are_fatal(#[case] err: PageError, #[case] fatal: bool) {
        assert_eq!(err.is_fatal(), fatal);
    }

    #[rstest]
    fn key_action_presses_the_key() {
        let page = StubPage::default();
        let applied = PageAction::key("ArrowRight").perform(&page).expect("press");
        assert!(applied);
        assert_eq!(page.pressed_keys(), vec!["ArrowRight".to_owned()]);
    }

    #[rstest]
    fn click_action_reports_missing_target() {
        let target = Locator::css("button.like");
        let page = StubPage::default();
        page.set_present(&target, false);
        let applied = PageAction::click(target.clone()).perform(&page).expect("click");
        assert!(!applied);
        assert!(page.calls().contains(&PageCall::Click(target)));
    }

    #[rstest]
    fn locators_deserialise_from_config() {
        let locator: Locator =
            serde_json::from_str(r#"{"css_with_text":{"css":"button","text":"Denunciar"}}"#)
                .expect("locator json");
        assert_eq!(locator, Locator::css_with_text("button", "Denunciar"));
    }
}
