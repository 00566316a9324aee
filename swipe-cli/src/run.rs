//! Run command implementation for the swipe CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use swipe_core::{Blacklist, Decision, QuotaLimits};
use swipe_gemini::{CredentialPool, GeminiConfig};
use swipe_scorer::{DecisionPolicy, ScoringEngine, load_weight_table};
use swipe_session::{SessionConfig, SessionReport, SiteScript, Timings};

use crate::options::{BrowserOptions, decision_policy, require_existing, split_list};
use crate::presets::resolve_sites;
use crate::{
    ARG_API_KEYS, ARG_AUDIT_DIR, ARG_BLACKLIST, ARG_CHROME, ARG_COOLDOWN_AFTER, ARG_HEADLESS,
    ARG_HIGH_THRESHOLD, ARG_HUMANISE, ARG_MAX_LIKES, ARG_MAX_SWIPES, ARG_MID_THRESHOLD, ARG_MODEL,
    ARG_P_HIGH, ARG_P_MID, ARG_PROFILE_POLL_SECS, ARG_PROMPT, ARG_PROMPT_FILE,
    ARG_READINESS_TIMEOUT_SECS, ARG_REMOTE_URL, ARG_SAFE_DEFAULT, ARG_SITES, ARG_USER_DATA_DIR,
    ARG_WEIGHTS, ARG_WINDOW_HEIGHT, ARG_WINDOW_WIDTH, CliError, ENV_RUN_API_KEYS, ENV_RUN_PROMPT,
    ENV_RUN_WEIGHTS,
};

/// Variables consulted for API keys when none are configured.
pub(crate) const LEGACY_KEY_VARS: [&str; 3] = ["GEMINI_KEY", "GEMINI_KEY2", "GEMINI_KEY3"];

/// Variable consulted for the prompt when none is configured.
pub(crate) const LEGACY_PROMPT_VAR: &str = "PROMPT";

/// CLI arguments for the `run` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Open each configured site in a shared browser and run one \
                 decision loop per site on its own thread. Every profile is \
                 screened against the blacklist, classified from a \
                 screenshot, scored against the weight table and liked or \
                 rejected under the like quota.",
    about = "Run swipe sessions"
)]
#[ortho_config(prefix = "SWIPE")]
pub(crate) struct RunArgs {
    /// Comma-separated presets (tinder, bumble) or site script paths.
    #[arg(long = ARG_SITES, value_name = "list")]
    #[serde(default)]
    pub(crate) sites: Option<String>,
    /// Path to the weight table JSON.
    #[arg(long = ARG_WEIGHTS, value_name = "path")]
    #[serde(default)]
    pub(crate) weights: Option<Utf8PathBuf>,
    /// Prompt sent to the classifier with every screenshot.
    #[arg(long = ARG_PROMPT, value_name = "text")]
    #[serde(default)]
    pub(crate) prompt: Option<String>,
    /// File holding the classifier prompt.
    #[arg(long = ARG_PROMPT_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) prompt_file: Option<Utf8PathBuf>,
    /// Comma-separated Gemini API keys; one is drawn per classifier.
    #[arg(long = ARG_API_KEYS, value_name = "keys")]
    #[serde(default)]
    pub(crate) api_keys: Option<String>,
    /// Gemini model name.
    #[arg(long = ARG_MODEL, value_name = "name")]
    #[serde(default)]
    pub(crate) model: Option<String>,
    /// Comma-separated terms that reject a profile on sight.
    #[arg(long = ARG_BLACKLIST, value_name = "terms")]
    #[serde(default)]
    pub(crate) blacklist: Option<String>,
    /// Lowest score in the high band.
    #[arg(long = ARG_HIGH_THRESHOLD, value_name = "points")]
    #[serde(default)]
    pub(crate) high_threshold: Option<i64>,
    /// Lowest score in the mid band.
    #[arg(long = ARG_MID_THRESHOLD, value_name = "points")]
    #[serde(default)]
    pub(crate) mid_threshold: Option<i64>,
    /// Like probability in the high band.
    #[arg(long = ARG_P_HIGH, value_name = "probability")]
    #[serde(default)]
    pub(crate) p_high: Option<f64>,
    /// Like probability in the mid band.
    #[arg(long = ARG_P_MID, value_name = "probability")]
    #[serde(default)]
    pub(crate) p_mid: Option<f64>,
    /// Swipes per site before the session ends.
    #[arg(long = ARG_MAX_SWIPES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_swipes: Option<u32>,
    /// Likes per site before every decision becomes a reject.
    #[arg(long = ARG_MAX_LIKES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_likes: Option<u32>,
    /// Decision applied when classification or readiness fails.
    #[arg(long = ARG_SAFE_DEFAULT, value_name = "like|reject")]
    #[serde(default)]
    pub(crate) safe_default: Option<String>,
    /// Press arrow keys with random pauses before each like.
    #[arg(long = ARG_HUMANISE, value_name = "bool")]
    #[serde(default)]
    pub(crate) humanise: Option<bool>,
    /// Directory receiving audit screenshots and the handle log.
    #[arg(long = ARG_AUDIT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) audit_dir: Option<Utf8PathBuf>,
    /// Seconds to wait for a profile card before counting a missed poll.
    #[arg(long = ARG_PROFILE_POLL_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) profile_poll_secs: Option<u64>,
    /// Seconds to wait for the readiness marker after classification.
    #[arg(long = ARG_READINESS_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) readiness_timeout_secs: Option<u64>,
    /// Consecutive readiness timeouts that trigger a cooldown and reload.
    #[arg(long = ARG_COOLDOWN_AFTER, value_name = "count")]
    #[serde(default)]
    pub(crate) cooldown_after: Option<u32>,
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

impl RunArgs {
    pub(crate) fn into_config(self) -> Result<RunConfig, CliError> {
        let mut merged = self.load_and_merge().map_err(CliError::Configuration)?;
        merged.apply_legacy_env(|name| std::env::var(name).ok());
        RunConfig::try_from(merged)
    }

    /// Fill the prompt and API keys from the older unprefixed variables.
    pub(crate) fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.prompt.is_none() && self.prompt_file.is_none() {
            self.prompt = lookup(LEGACY_PROMPT_VAR);
        }
        if self.api_keys.is_none() {
            let keys: Vec<String> = LEGACY_KEY_VARS.iter().filter_map(|name| lookup(name)).collect();
            if !keys.is_empty() {
                self.api_keys = Some(keys.join(","));
            }
        }
    }
}

/// Where the classifier prompt comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PromptSource {
    Inline(String),
    File(Utf8PathBuf),
}

/// Resolved `run` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunConfig {
    /// Presets or site script paths, in launch order.
    pub(crate) sites: Vec<String>,
    /// Path to the weight table JSON.
    pub(crate) weights: Utf8PathBuf,
    pub(crate) prompt: PromptSource,
    pub(crate) credentials: CredentialPool,
    pub(crate) gemini: GeminiConfig,
    pub(crate) policy: DecisionPolicy,
    pub(crate) blacklist: Blacklist,
    pub(crate) limits: QuotaLimits,
    pub(crate) safe_default: Decision,
    pub(crate) humanise: bool,
    pub(crate) timings: Timings,
    /// Root for audit screenshots; auditing is off when unset.
    pub(crate) audit_dir: Option<Utf8PathBuf>,
    pub(crate) browser: BrowserOptions,
}

impl RunConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.weights, ARG_WEIGHTS)?;
        if let PromptSource::File(path) = &self.prompt {
            require_existing(path, ARG_PROMPT_FILE)?;
        }
        Ok(())
    }

    /// Load everything the sessions share before the browser starts.
    pub(crate) fn prepare(&self) -> Result<SessionPlan, CliError> {
        let table = load_weight_table(&self.weights)?;
        let engine = ScoringEngine::new(table, self.policy)?;
        let prompt = match &self.prompt {
            PromptSource::Inline(text) => text.clone(),
            PromptSource::File(path) => {
                swipe_fs::read_to_string(path).map_err(|source| CliError::ReadPrompt {
                    path: path.clone(),
                    source,
                })?
            }
        };
        if prompt.trim().is_empty() {
            return Err(CliError::BlankPrompt);
        }
        let sites = resolve_sites(&self.sites, self.browser.window)?;
        let session = SessionConfig {
            prompt: prompt.trim().to_owned(),
            blacklist: self.blacklist.clone(),
            limits: self.limits,
            safe_default: self.safe_default,
            humanise: self.humanise,
            timings: self.timings,
        };
        Ok(SessionPlan {
            sites,
            engine,
            session,
        })
    }
}

impl TryFrom<RunArgs> for RunConfig {
    type Error = CliError;

    fn try_from(args: RunArgs) -> Result<Self, Self::Error> {
        let weights = args.weights.ok_or(CliError::MissingArgument {
            field: ARG_WEIGHTS,
            env: ENV_RUN_WEIGHTS,
        })?;
        let prompt = match (args.prompt, args.prompt_file) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_PROMPT,
                    second: ARG_PROMPT_FILE,
                });
            }
            (Some(text), None) => PromptSource::Inline(text),
            (None, Some(path)) => PromptSource::File(path),
            (None, None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_PROMPT,
                    env: ENV_RUN_PROMPT,
                });
            }
        };
        let missing_keys = CliError::MissingArgument {
            field: ARG_API_KEYS,
            env: ENV_RUN_API_KEYS,
        };
        let raw_keys = args.api_keys.ok_or(missing_keys)?;
        let credentials = CredentialPool::new(split_list(&raw_keys)).map_err(|_| {
            CliError::MissingArgument {
                field: ARG_API_KEYS,
                env: ENV_RUN_API_KEYS,
            }
        })?;

        let gemini = match args.model {
            Some(model) => GeminiConfig::default().with_model(model),
            None => GeminiConfig::default(),
        };
        let policy = decision_policy(
            args.high_threshold,
            args.mid_threshold,
            args.p_high,
            args.p_mid,
        )?;
        let defaults = SessionConfig::new("");
        let limits = QuotaLimits::new(
            args.max_swipes.unwrap_or(defaults.limits.max_swipes),
            args.max_likes.unwrap_or(defaults.limits.max_likes),
        );
        let safe_default = match args.safe_default {
            Some(raw) => raw
                .parse::<Decision>()
                .map_err(|source| CliError::InvalidDecision {
                    field: ARG_SAFE_DEFAULT,
                    source,
                })?,
            None => defaults.safe_default,
        };
        let timings = Timings {
            profile_poll: args
                .profile_poll_secs
                .map_or(defaults.timings.profile_poll, Duration::from_secs),
            readiness_timeout: args
                .readiness_timeout_secs
                .map_or(defaults.timings.readiness_timeout, Duration::from_secs),
            cooldown_after: args.cooldown_after.unwrap_or(defaults.timings.cooldown_after),
            ..defaults.timings
        };
        let sites = split_list(args.sites.as_deref().unwrap_or("tinder"));

        Ok(Self {
            sites,
            weights,
            prompt,
            credentials,
            gemini,
            policy,
            blacklist: args
                .blacklist
                .as_deref()
                .map_or_else(Blacklist::default, Blacklist::from_csv),
            limits,
            safe_default,
            humanise: args.humanise.unwrap_or(defaults.humanise),
            timings,
            audit_dir: args.audit_dir,
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

/// Inputs shared by every site's decision loop.
#[derive(Debug, Clone)]
pub(crate) struct SessionPlan {
    pub(crate) sites: Vec<SiteScript>,
    pub(crate) engine: ScoringEngine,
    pub(crate) session: SessionConfig,
}

pub(super) fn run_sessions(args: RunArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let plan = config.prepare()?;
    let outcomes = drive(&config, &plan)?;
    let mut stdout = std::io::stdout().lock();
    write_reports(&mut stdout, outcomes)
}

/// Print every finished session, then surface the first failure.
pub(crate) fn write_reports(
    writer: &mut dyn Write,
    outcomes: Vec<Result<SessionReport, CliError>>,
) -> Result<(), CliError> {
    let mut first_error = None;
    for outcome in outcomes {
        match outcome {
            Ok(report) => writeln!(writer, "{report}").map_err(CliError::WriteOutput)?,
            Err(err) => {
                log::error!("{err}");
                first_error.get_or_insert(err);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(not(feature = "browser"))]
fn drive(
    _config: &RunConfig,
    _plan: &SessionPlan,
) -> Result<Vec<Result<SessionReport, CliError>>, CliError> {
    Err(CliError::MissingFeature {
        feature: "browser",
        action: "run",
    })
}

#[cfg(feature = "browser")]
fn drive(
    config: &RunConfig,
    plan: &SessionPlan,
) -> Result<Vec<Result<SessionReport, CliError>>, CliError> {
    use std::sync::Arc;
    use swipe_browser::ChromeSession;
    use swipe_session::ScreenshotAudit;

    let browser = ChromeSession::launch(&config.browser.settings())?;
    let mut pages = Vec::with_capacity(plan.sites.len());
    for site in &plan.sites {
        pages.push((site, browser.open_page(&site.start_url)?));
    }

    let audit = config
        .audit_dir
        .clone()
        .map(|dir| Arc::new(ScreenshotAudit::new(dir)));
    let outcomes = std::thread::scope(|scope| {
        let handles: Vec<_> = pages
            .into_iter()
            .map(|(site, page)| {
                let audit = audit.clone();
                let handle = scope
                    .spawn(move || session::run_site(page, site.clone(), config, plan, audit));
                (site.name.clone(), handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(site, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(CliError::SessionPanicked { site }))
            })
            .collect()
    });
    browser.close();
    Ok(outcomes)
}

#[cfg(feature = "browser")]
mod session {
    use std::sync::Arc;

    use swipe_browser::ChromePage;
    use swipe_core::{RngSource, ThreadPause};
    use swipe_gemini::GeminiClassifierFactory;
    use swipe_session::{DecisionLoop, ScreenshotAudit, SessionReport, SiteScript};

    use super::{RunConfig, SessionPlan};
    use crate::CliError;

    /// Run one site's decision loop to completion on the calling thread.
    ///
    /// Every site shares one `audit` sink, so handle-log appends are
    /// serialised across threads.
    pub(super) fn run_site(
        page: ChromePage,
        site: SiteScript,
        config: &RunConfig,
        plan: &SessionPlan,
        audit: Option<Arc<ScreenshotAudit>>,
    ) -> Result<SessionReport, CliError> {
        let name = site.name.clone();
        let classifiers =
            GeminiClassifierFactory::new(config.gemini.clone(), config.credentials.clone())?;
        let mut session = DecisionLoop::new(
            page,
            site,
            plan.session.clone(),
            plan.engine.clone(),
            classifiers,
            RngSource::from_entropy(),
            ThreadPause,
        );
        if let Some(audit) = audit {
            session = session.with_audit(Box::new(audit));
        }
        session
            .run()
            .map_err(|source| CliError::Session { site: name, source })
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RunConfig, CliError> {
    let merged = RunArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RunConfig::try_from(merged)
}
