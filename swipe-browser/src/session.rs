//! Browser process and DevTools connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chromiumoxide::{Browser, Handler};
use futures::StreamExt;
use log::{info, warn};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::{BrowserError, BrowserSettings, ChromePage};

/// A running Chromium and the runtime driving its connection.
///
/// Pages opened from one session share the connection and may be used from
/// different threads. Calls on those pages block the calling thread, so they
/// must not be made from inside this session's runtime.
pub struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    closed: Arc<AtomicBool>,
    settings: BrowserSettings,
    runtime: Runtime,
}

impl std::fmt::Debug for ChromeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeSession")
            .field("settings", &self.settings)
            .field("closed", &self.is_closed())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl ChromeSession {
    /// Launch Chromium, or attach to `remote_url` when one is configured.
    ///
    /// # Errors
    /// Returns [`BrowserError`] when the runtime cannot be built, the options
    /// are invalid, or the browser cannot be started or reached.
    pub fn launch(settings: &BrowserSettings) -> Result<Self, BrowserError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("swipe-browser")
            .enable_all()
            .build()
            .map_err(BrowserError::Runtime)?;

        let (browser, handler) = if let Some(url) = &settings.remote_url {
            info!("attaching to browser at {url}");
            runtime
                .block_on(Browser::connect(url.clone()))
                .map_err(|err| BrowserError::Launch(Box::new(err)))?
        } else {
            let config = settings.to_config()?;
            info!(
                "launching browser ({}x{}, {})",
                settings.window_width,
                settings.window_height,
                if settings.headless { "headless" } else { "headed" }
            );
            runtime
                .block_on(Browser::launch(config))
                .map_err(|err| BrowserError::Launch(Box::new(err)))?
        };

        let closed = Arc::new(AtomicBool::new(false));
        let handler_task = runtime.spawn(drive_handler(handler, Arc::clone(&closed)));

        Ok(Self {
            browser,
            handler_task,
            closed,
            settings: settings.clone(),
            runtime,
        })
    }

    /// Open a new tab at `url`.
    ///
    /// # Errors
    /// Returns [`BrowserError::OpenPage`] when the tab cannot be created.
    pub fn open_page(&self, url: &str) -> Result<ChromePage, BrowserError> {
        let page = self
            .runtime
            .block_on(self.browser.new_page(url))
            .map_err(|source| BrowserError::OpenPage {
                url: url.to_owned(),
                source: Box::new(source),
            })?;
        info!("opened {url}");
        Ok(ChromePage::new(
            page,
            self.runtime.handle().clone(),
            Arc::clone(&self.closed),
        ))
    }

    /// Report whether the DevTools connection has ended.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Close the browser and stop the connection handler.
    pub fn close(mut self) {
        if let Err(err) = self.runtime.block_on(self.browser.close()) {
            warn!("failed to close the browser cleanly: {err}");
        }
        self.handler_task.abort();
    }
}

async fn drive_handler(mut handler: Handler, closed: Arc<AtomicBool>) {
    while let Some(event) = handler.next().await {
        if let Err(err) = event {
            warn!("browser handler event error: {err}");
        }
    }
    closed.store(true, Ordering::SeqCst);
    warn!("browser connection closed");
}
