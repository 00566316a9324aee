//! First messages sent to new matches.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use serde::Deserialize;
use swipe_core::{BrowserPage, PageError, Pause, RandomSource};
use thiserror::Error;

use crate::SiteScript;

/// Errors that stop an opener campaign.
#[derive(Debug, Error)]
pub enum OpenerError {
    /// Reading the template file failed.
    #[error("failed to read message templates at {path}")]
    Read {
        /// Requested path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The template file was not a JSON array of `{message}` objects.
    #[error("failed to parse message templates at {path}")]
    Parse {
        /// Requested path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// No usable message was configured.
    #[error("no non-blank message templates configured")]
    NoTemplates,
    /// The site script has no messaging locators.
    #[error("site {site} does not define messaging locators")]
    Unsupported {
        /// Site name.
        site: String,
    },
    /// The page failed in a way that ends the campaign.
    #[error("page error during opener campaign")]
    Page(#[from] PageError),
}

#[derive(Debug, Deserialize)]
struct TemplateRow {
    message: String,
}

/// Candidate first messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    messages: Vec<String>,
}

impl MessageTemplates {
    /// Keep the non-blank messages.
    ///
    /// # Errors
    /// Returns [`OpenerError::NoTemplates`] when nothing usable remains.
    pub fn new<I, S>(messages: I) -> Result<Self, OpenerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<String> = messages
            .into_iter()
            .map(Into::into)
            .filter(|message: &String| !message.trim().is_empty())
            .collect();
        if messages.is_empty() {
            return Err(OpenerError::NoTemplates);
        }
        Ok(Self { messages })
    }

    /// Load templates from a JSON file shaped like `[{"message": "Hi!"}]`.
    ///
    /// # Errors
    /// Returns [`OpenerError`] when the file cannot be read or parsed, or
    /// holds no usable message.
    pub fn load(path: &Utf8Path) -> Result<Self, OpenerError> {
        let raw = swipe_fs::read_to_string(path).map_err(|source| OpenerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let rows: Vec<TemplateRow> =
            serde_json::from_str(&raw).map_err(|source| OpenerError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(rows.into_iter().map(|row| row.message))
    }

    /// Choose a message uniformly at random.
    pub fn pick<R>(&self, random: &mut R) -> &str
    where
        R: RandomSource + ?Sized,
    {
        random
            .pick_index(self.messages.len())
            .and_then(|index| self.messages.get(index))
            .map_or("", String::as_str)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always `false`; construction rejects empty template sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Outcome of a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenerReport {
    /// Conversations opened.
    pub visited: usize,
    /// Messages sent.
    pub sent: usize,
    /// Conversations skipped after a transient failure.
    pub failed: usize,
}

/// Sends one templated message to each of the first `limit` matches.
#[derive(Debug, Clone)]
pub struct OpenerCampaign {
    templates: MessageTemplates,
    /// Maximum conversations visited.
    pub limit: usize,
    /// How long to wait for the message input on each conversation.
    pub input_timeout: Duration,
    /// Shortest pause between conversations.
    pub pause_min: Duration,
    /// Longest pause between conversations.
    pub pause_max: Duration,
}

impl OpenerCampaign {
    /// Campaign over `templates` with a limit of 15 and 1–3 s pauses.
    #[must_use]
    pub const fn new(templates: MessageTemplates) -> Self {
        Self {
            templates,
            limit: 15,
            input_timeout: Duration::from_secs(10),
            pause_min: Duration::from_secs(1),
            pause_max: Duration::from_secs(3),
        }
    }

    /// Visit matches listed on the site's matches page and greet each one.
    ///
    /// Transient failures on one conversation are logged and skipped.
    ///
    /// # Errors
    /// Returns [`OpenerError::Unsupported`] when the site has no messaging
    /// locators and [`OpenerError::Page`] for fatal page errors or when the
    /// match list cannot be read.
    pub fn run<P, R, S>(
        &self,
        page: &P,
        site: &SiteScript,
        random: &mut R,
        pause: &S,
    ) -> Result<OpenerReport, OpenerError>
    where
        P: BrowserPage + ?Sized,
        R: RandomSource + ?Sized,
        S: Pause + ?Sized,
    {
        let messaging = site
            .messaging
            .as_ref()
            .ok_or_else(|| OpenerError::Unsupported {
                site: site.name.clone(),
            })?;
        page.navigate(&messaging.matches_url)?;
        let links = page.query_links(&messaging.match_links)?;
        info!(
            "{}: {} matches listed, greeting up to {}",
            site.name,
            links.len(),
            self.limit
        );

        let mut report = OpenerReport::default();
        for link in links.iter().take(self.limit) {
            report.visited += 1;
            let message = self.templates.pick(random);
            match greet(page, messaging, link, message, self.input_timeout) {
                Ok(()) => {
                    report.sent += 1;
                    info!("{}: greeted {link}", site.name);
                }
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => {
                    report.failed += 1;
                    warn!("{}: skipping {link}: {err}", site.name);
                }
            }
            pause.pause(random.duration_between(self.pause_min, self.pause_max));
        }
        Ok(report)
    }
}

fn greet<P>(
    page: &P,
    messaging: &crate::MessagingScript,
    link: &str,
    message: &str,
    timeout: Duration,
) -> Result<(), PageError>
where
    P: BrowserPage + ?Sized,
{
    page.navigate(link)?;
    if !page.wait_for(&messaging.message_input, timeout)? {
        return Err(PageError::ElementNotFound {
            locator: messaging.message_input.to_string(),
        });
    }
    page.type_text(&messaging.message_input, message)?;
    if !page.click(&messaging.send_button)? {
        return Err(PageError::ElementNotFound {
            locator: messaging.send_button.to_string(),
        });
    }
    Ok(())
}
