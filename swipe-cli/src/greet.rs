//! Greet command implementation for the swipe CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use swipe_session::{MessageTemplates, OpenerCampaign, OpenerError, OpenerReport, SiteScript};

use crate::options::{BrowserOptions, require_existing};
use crate::presets::resolve_sites;
use crate::{
    ARG_CHROME, ARG_HEADLESS, ARG_LIMIT, ARG_REMOTE_URL, ARG_SITE, ARG_TEMPLATES,
    ARG_USER_DATA_DIR, ARG_WINDOW_HEIGHT, ARG_WINDOW_WIDTH, CliError, ENV_GREET_TEMPLATES,
};

/// CLI arguments for the `greet` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Open the site's match list and send each of the first \
                 matches a message drawn at random from a JSON template \
                 file shaped like [{\"message\": \"Hi!\"}].",
    about = "Send first messages to matches"
)]
#[ortho_config(prefix = "SWIPE")]
pub(crate) struct GreetArgs {
    /// Preset name or site script path.
    #[arg(long = ARG_SITE, value_name = "site")]
    #[serde(default)]
    pub(crate) site: Option<String>,
    /// Path to the message templates JSON.
    #[arg(long = ARG_TEMPLATES, value_name = "path")]
    #[serde(default)]
    pub(crate) templates: Option<Utf8PathBuf>,
    /// Maximum number of conversations to open.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Run the browser without a window.
    #[arg(long = ARG_HEADLESS, value_name = "bool")]
    #[serde(default)]
    pub(crate) headless: Option<bool>,
    /// Browser profile directory, so logins persist between runs.
    #[arg(long = ARG_USER_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) user_data_dir: Option<Utf8PathBuf>,
    /// Chromium executable; auto-detected when unset.
    #[arg(long = ARG_CHROME, value_name = "path")]
    #[serde(default)]
    pub(crate) chrome: Option<Utf8PathBuf>,
    /// Attach to a running browser's DevTools WebSocket instead of launching.
    #[arg(long = ARG_REMOTE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) remote_url: Option<String>,
    /// Browser window width.
    #[arg(long = ARG_WINDOW_WIDTH, value_name = "px")]
    #[serde(default)]
    pub(crate) window_width: Option<u32>,
    /// Browser window height.
    #[arg(long = ARG_WINDOW_HEIGHT, value_name = "px")]
    #[serde(default)]
    pub(crate) window_height: Option<u32>,
}

impl GreetArgs {
    pub(crate) fn into_config(self) -> Result<GreetConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GreetConfig::try_from(merged)
    }
}

/// Resolved `greet` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GreetConfig {
    pub(crate) site: String,
    pub(crate) templates: Utf8PathBuf,
    pub(crate) limit: Option<usize>,
    pub(crate) browser: BrowserOptions,
}

impl GreetConfig {
    /// Load the templates and the site, refusing sites without messaging.
    pub(crate) fn prepare(&self) -> Result<(OpenerCampaign, SiteScript), CliError> {
        require_existing(&self.templates, ARG_TEMPLATES)?;
        let templates =
            MessageTemplates::load(&self.templates).map_err(|source| CliError::Opener {
                site: self.site.clone(),
                source,
            })?;
        let mut campaign = OpenerCampaign::new(templates);
        if let Some(limit) = self.limit {
            campaign.limit = limit;
        }

        let site = resolve_sites(std::slice::from_ref(&self.site), self.browser.window)?
            .into_iter()
            .next()
            .ok_or_else(|| CliError::UnknownSite {
                name: self.site.clone(),
            })?;
        if site.messaging.is_none() {
            return Err(CliError::Opener {
                site: site.name.clone(),
                source: OpenerError::Unsupported {
                    site: site.name.clone(),
                },
            });
        }
        Ok((campaign, site))
    }
}

impl TryFrom<GreetArgs> for GreetConfig {
    type Error = CliError;

    fn try_from(args: GreetArgs) -> Result<Self, Self::Error> {
        let templates = args.templates.ok_or(CliError::MissingArgument {
            field: ARG_TEMPLATES,
            env: ENV_GREET_TEMPLATES,
        })?;
        Ok(Self {
            site: args.site.unwrap_or_else(|| "tinder".to_owned()),
            templates,
            limit: args.limit,
            browser: BrowserOptions::resolve(
                args.headless,
                args.user_data_dir,
                args.chrome,
                args.remote_url,
                args.window_width,
                args.window_height,
            ),
        })
    }
}

pub(super) fn run_greet(args: GreetArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let (campaign, site) = config.prepare()?;
    let report = greet(&config, &campaign, &site)?;
    let mut stdout = std::io::stdout().lock();
    write_report(&mut stdout, &site.name, report)
}

pub(crate) fn write_report(
    writer: &mut dyn Write,
    site: &str,
    report: OpenerReport,
) -> Result<(), CliError> {
    writeln!(
        writer,
        "{site}: greeted {} of {} matches visited ({} skipped)",
        report.sent, report.visited, report.failed
    )
    .map_err(CliError::WriteOutput)
}

#[cfg(not(feature = "browser"))]
fn greet(
    _config: &GreetConfig,
    _campaign: &OpenerCampaign,
    _site: &SiteScript,
) -> Result<OpenerReport, CliError> {
    Err(CliError::MissingFeature {
        feature: "browser",
        action: "greet",
    })
}

#[cfg(feature = "browser")]
fn greet(
    config: &GreetConfig,
    campaign: &OpenerCampaign,
    site: &SiteScript,
) -> Result<OpenerReport, CliError> {
    use swipe_browser::ChromeSession;
    use swipe_core::{RngSource, ThreadPause};

    let browser = ChromeSession::launch(&config.browser.settings())?;
    let page = browser.open_page(&site.start_url)?;
    let outcome = campaign
        .run(&page, site, &mut RngSource::from_entropy(), &ThreadPause)
        .map_err(|source| CliError::Opener {
            site: site.name.clone(),
            source,
        });
    browser.close();
    outcome
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<GreetConfig, CliError> {
    let merged = GreetArgs::merge_from_layers(layers).map_err(CliError::from)?;
    GreetConfig::try_from(merged)
}
