//! Blocking [`BrowserPage`] over a chromiumoxide tab.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use log::debug;
use serde::de::DeserializeOwned;
use swipe_core::{BrowserPage, Locator, PageError, Region};
use tokio::runtime::Handle;

use crate::error::page_error;
use crate::keys::key_definition;
use crate::script::{CLICK, EXISTS, FOCUS, LINKS, TEXTS, VISIBLE_TEXT, locator_script};

/// Interval between presence checks in [`ChromePage::wait_for`].
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One browser tab.
#[derive(Debug, Clone)]
pub struct ChromePage {
    page: Page,
    runtime: Handle,
    closed: Arc<AtomicBool>,
}

impl ChromePage {
    pub(crate) const fn new(page: Page, runtime: Handle, closed: Arc<AtomicBool>) -> Self {
        Self {
            page,
            runtime,
            closed,
        }
    }

    fn block_on<F, T>(&self, operation: &str, future: F) -> Result<T, PageError>
    where
        F: Future<Output = Result<T, CdpError>>,
    {
        self.runtime
            .block_on(future)
            .map_err(|err| self.error(&err, operation))
    }

    fn error(&self, err: &CdpError, operation: &str) -> PageError {
        page_error(err, operation, self.closed.load(Ordering::SeqCst))
    }

    fn evaluate<T>(&self, operation: &str, expression: String) -> Result<T, PageError>
    where
        T: DeserializeOwned,
    {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|message| PageError::Script { message })?;
        let result = self.block_on(operation, self.page.evaluate_expression(params))?;
        result.into_value().map_err(|err| PageError::Script {
            message: format!("{operation}: unexpected script result: {err}"),
        })
    }

    fn evaluate_locator<T>(&self, operation: &str, locator: &Locator, body: &str) -> Result<T, PageError>
    where
        T: DeserializeOwned,
    {
        self.evaluate(operation, locator_script(locator, body)?)
    }

    fn dispatch_key(&self, event: DispatchKeyEventParams, operation: &str) -> Result<(), PageError> {
        self.block_on(operation, self.page.execute(event))
            .map(|_| ())
    }
}

impl BrowserPage for ChromePage {
    fn navigate(&self, url: &str) -> Result<(), PageError> {
        let operation = format!("navigate to {url}");
        self.block_on(&operation, self.page.goto(url)).map(|_| ())
    }

    fn reload(&self) -> Result<(), PageError> {
        self.block_on("reload", self.page.reload()).map(|_| ())
    }

    fn capture_region(&self, region: Region) -> Result<Vec<u8>, PageError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(Viewport {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                scale: 1.0,
            })
            .build();
        self.block_on("capture screenshot", self.page.screenshot(params))
    }

    fn visible_text(&self) -> Result<String, PageError> {
        self.evaluate("read visible text", VISIBLE_TEXT.to_owned())
    }

    fn query_text(&self, locator: &Locator) -> Result<Vec<String>, PageError> {
        self.evaluate_locator(&format!("read text of {locator}"), locator, TEXTS)
    }

    fn query_links(&self, locator: &Locator) -> Result<Vec<String>, PageError> {
        self.evaluate_locator(&format!("read links of {locator}"), locator, LINKS)
    }

    fn press_key(&self, key: &str) -> Result<(), PageError> {
        let operation = format!("press {key}");
        let definition = key_definition(key).ok_or_else(|| PageError::Script {
            message: format!("{operation}: unsupported key"),
        })?;
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let with_text = matches!(kind, DispatchKeyEventType::KeyDown);
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key(definition.key.clone())
                .code(definition.code.clone())
                .windows_virtual_key_code(definition.key_code)
                .native_virtual_key_code(definition.key_code);
            if with_text && let Some(text) = &definition.text {
                builder = builder.text(text.clone());
            }
            let event = builder
                .build()
                .map_err(|message| PageError::Script { message })?;
            self.dispatch_key(event, &operation)?;
        }
        debug!("pressed {key}");
        Ok(())
    }

    fn click(&self, locator: &Locator) -> Result<bool, PageError> {
        self.evaluate_locator(&format!("click {locator}"), locator, CLICK)
    }

    fn type_text(&self, locator: &Locator, text: &str) -> Result<(), PageError> {
        let operation = format!("type into {locator}");
        let focused: bool = self.evaluate_locator(&operation, locator, FOCUS)?;
        if !focused {
            return Err(PageError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        self.block_on(&operation, self.page.execute(InsertTextParams::new(text)))
            .map(|_| ())
    }

    fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<bool, PageError> {
        let operation = format!("wait for {locator}");
        let script = locator_script(locator, EXISTS)?;
        let deadline = Instant::now() + timeout;
        loop {
            match self.evaluate::<bool>(&operation, script.clone()) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => debug!("{operation}: {err}"),
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}
