//! Chromium-backed [`swipe_core::BrowserPage`].
//!
//! [`ChromeSession`] launches (or attaches to) a Chromium instance over the
//! DevTools protocol and owns the multi-threaded Tokio runtime that drives
//! it. [`ChromePage`] is a cheap, cloneable handle to one tab that implements
//! the blocking page surface used by the decision loop, so each site can run
//! on its own thread against the shared browser.
//!
//! Locators are resolved in the page by a small script, which keeps selector
//! semantics identical across every operation.
//!
//! # Example
//!
//! ```no_run
//! use swipe_browser::{BrowserSettings, ChromeSession};
//! use swipe_core::{BrowserPage, Locator};
//!
//! let session = ChromeSession::launch(&BrowserSettings::default())?;
//! let page = session.open_page("https://example.com")?;
//! let headings = page.query_text(&Locator::css("h1"))?;
//! println!("{headings:?}");
//! session.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod error;
mod keys;
mod page;
mod script;
mod session;
mod settings;

pub use error::BrowserError;
pub use page::ChromePage;
pub use session::ChromeSession;
pub use settings::{BrowserSettings, DEFAULT_WINDOW};
