//! Reads the blacklist and bio signals off the current profile.

use log::{debug, info, warn};
use swipe_core::{
    Blacklist, BrowserPage, PageError, ProfileEvidence, bio_is_social_only, social_handles,
};

use crate::{AuditCategory, AuditSink, SiteScript};

/// Turns page content into [`ProfileEvidence`].
#[derive(Debug, Clone, Default)]
pub struct SignalExtractor {
    blacklist: Blacklist,
}

impl SignalExtractor {
    /// Extractor matching against `blacklist`.
    #[must_use]
    pub const fn new(blacklist: Blacklist) -> Self {
        Self { blacklist }
    }

    /// Gather evidence for the profile currently shown on `page`.
    ///
    /// Transient page errors degrade to negative signals; only fatal errors
    /// are returned. A blacklist hit saves a screenshot of the site's
    /// classification region and any `@handle` found in the bio is recorded,
    /// when an audit sink is supplied.
    ///
    /// # Errors
    /// Returns the [`PageError`] when it is fatal to the session.
    pub fn extract<P>(
        &self,
        page: &P,
        site: &SiteScript,
        audit: Option<&dyn AuditSink>,
    ) -> Result<ProfileEvidence, PageError>
    where
        P: BrowserPage + ?Sized,
    {
        let mut evidence = ProfileEvidence::default();

        if !self.blacklist.is_empty() {
            let text = degrade(page.visible_text(), "read visible text")?.unwrap_or_default();
            if let Some(term) = self.blacklist.find(&text) {
                info!("{}: blacklisted term `{term}` found", site.name);
                evidence = evidence.with_blacklist_term(term);
                if let Some(sink) = audit {
                    save_blacklist_capture(page, site, sink)?;
                }
            }
        }

        if let Some(locator) = &site.bio {
            let parts = degrade(page.query_text(locator), "read bio")?.unwrap_or_default();
            let bio = parts.join(" ");
            evidence.bio_social_only = bio_is_social_only(&bio);
            let handles = social_handles(&bio);
            if !handles.is_empty() {
                debug!("{}: bio mentions {}", site.name, handles.join(", "));
                if let Some(sink) = audit
                    && let Err(err) = sink.record_handles(&site.name, &handles)
                {
                    warn!("{}: {err}", site.name);
                }
            }
            if !bio.trim().is_empty() {
                evidence.bio = Some(bio);
            }
        }

        Ok(evidence)
    }
}

fn save_blacklist_capture<P>(
    page: &P,
    site: &SiteScript,
    sink: &dyn AuditSink,
) -> Result<(), PageError>
where
    P: BrowserPage + ?Sized,
{
    let Some(png) = degrade(
        page.capture_region(site.classification_region),
        "capture blacklist screenshot",
    )?
    else {
        return Ok(());
    };
    if let Err(err) = sink.save_screenshot(AuditCategory::Blacklist, &site.name, &png) {
        warn!("{}: {err}", site.name);
    }
    Ok(())
}

/// Keep fatal errors, log and swallow the rest.
fn degrade<T>(
    result: Result<T, PageError>,
    operation: &str,
) -> Result<Option<T>, PageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            warn!("failed to {operation}: {err}");
            Ok(None)
        }
    }
}
