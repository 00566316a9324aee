//! Browser errors and their mapping onto [`PageError`].

use camino::Utf8PathBuf;
use chromiumoxide::error::CdpError;
use swipe_core::PageError;
use thiserror::Error;

/// Errors raised while starting or attaching to the browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Building the Tokio runtime failed.
    #[error("failed to build Tokio runtime for the browser")]
    Runtime(#[source] std::io::Error),
    /// The launch options were rejected.
    #[error("invalid browser configuration: {message}")]
    Config {
        /// Builder message.
        message: String,
    },
    /// The configured executable does not exist.
    #[error("browser executable not found at {path}")]
    MissingExecutable {
        /// Configured path.
        path: Utf8PathBuf,
    },
    /// Chromium could not be launched or reached.
    #[error("failed to start or attach to the browser")]
    Launch(#[source] Box<CdpError>),
    /// A new tab could not be opened.
    #[error("failed to open a page at {url}")]
    OpenPage {
        /// Requested URL.
        url: String,
        /// Source error from the DevTools connection.
        #[source]
        source: Box<CdpError>,
    },
}

/// Classify a DevTools failure for the decision loop.
///
/// Once the connection handler has stopped every error is fatal, whatever
/// the underlying variant says.
pub(crate) fn page_error(err: &CdpError, operation: &str, closed: bool) -> PageError {
    if closed {
        return PageError::SessionClosed {
            message: format!("{operation}: browser connection closed ({err})"),
        };
    }
    match err {
        CdpError::Timeout => PageError::Timeout {
            operation: operation.to_owned(),
        },
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            PageError::SessionClosed {
                message: format!("{operation}: {err}"),
            }
        }
        CdpError::JavascriptException(_) => PageError::Script {
            message: format!("{operation}: {err}"),
        },
        other => PageError::Protocol {
            message: format!("{operation}: {other}"),
        },
    }
}
