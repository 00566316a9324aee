//! Score command implementation for the swipe CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use swipe_core::{AttributeSet, strip_code_fences};
use swipe_scorer::{DecisionPolicy, ScoreCard, ScoringEngine, load_weight_table};

use crate::options::{decision_policy, require_existing};
use crate::{
    ARG_ATTRIBUTES, ARG_HIGH_THRESHOLD, ARG_MID_THRESHOLD, ARG_P_HIGH, ARG_P_MID, ARG_WEIGHTS,
    CliError, ENV_SCORE_ATTRIBUTES, ENV_SCORE_WEIGHTS,
};

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Score a classifier response offline. The attributes file \
                 holds the JSON object a classifier returned, optionally \
                 wrapped in a Markdown code fence. The score, its band and \
                 the matching weight-table entries are printed.",
    about = "Score an attribute set"
)]
#[ortho_config(prefix = "SWIPE")]
pub(crate) struct ScoreArgs {
    /// Path to a JSON object of category/value attributes.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) attributes: Option<Utf8PathBuf>,
    /// Path to the weight table JSON.
    #[arg(long = ARG_WEIGHTS, value_name = "path")]
    #[serde(default)]
    pub(crate) weights: Option<Utf8PathBuf>,
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
}

impl ScoreArgs {
    pub(crate) fn into_config(self) -> Result<ScoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ScoreConfig::try_from(merged)
    }
}

/// Resolved `score` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreConfig {
    pub(crate) attributes: Utf8PathBuf,
    pub(crate) weights: Utf8PathBuf,
    pub(crate) policy: DecisionPolicy,
}

impl ScoreConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.attributes, ARG_ATTRIBUTES)?;
        require_existing(&self.weights, ARG_WEIGHTS)?;
        Ok(())
    }
}

impl TryFrom<ScoreArgs> for ScoreConfig {
    type Error = CliError;

    fn try_from(args: ScoreArgs) -> Result<Self, Self::Error> {
        let attributes = args.attributes.ok_or(CliError::MissingArgument {
            field: ARG_ATTRIBUTES,
            env: ENV_SCORE_ATTRIBUTES,
        })?;
        let weights = args.weights.ok_or(CliError::MissingArgument {
            field: ARG_WEIGHTS,
            env: ENV_SCORE_WEIGHTS,
        })?;
        let policy = decision_policy(
            args.high_threshold,
            args.mid_threshold,
            args.p_high,
            args.p_mid,
        )?;
        Ok(Self {
            attributes,
            weights,
            policy,
        })
    }
}

pub(super) fn run_score(args: ScoreArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_score_with(args.into_config()?, &mut stdout)
}

pub(super) fn run_score_with(config: ScoreConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    config.validate_sources()?;
    let engine = ScoringEngine::new(load_weight_table(&config.weights)?, config.policy)?;
    let attributes = load_attributes(&config.attributes)?;
    let card = engine.score_card(&attributes);
    write_score_card(writer, &engine, &card)
}

/// Load a classifier response saved to disk.
pub(super) fn load_attributes(path: &Utf8Path) -> Result<AttributeSet, CliError> {
    let raw = swipe_fs::read_to_string(path).map_err(|source| CliError::ReadAttributes {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_str(strip_code_fences(&raw)).map_err(
        |source| CliError::ParseAttributes {
            path: path.to_path_buf(),
            source,
        },
    )?;
    AttributeSet::from_json_value(&value).ok_or_else(|| CliError::InvalidAttributes {
        path: path.to_path_buf(),
    })
}

fn write_score_card(
    writer: &mut dyn Write,
    engine: &ScoringEngine,
    card: &ScoreCard,
) -> Result<(), CliError> {
    let band = engine.policy().band(card.total);
    let matches = if card.matches.is_empty() {
        "none".to_owned()
    } else {
        card.describe_matches()
    };
    writeln!(writer, "score: {}", card.total).map_err(CliError::WriteOutput)?;
    writeln!(
        writer,
        "band: {band} (like probability {:.2})",
        engine.policy().like_probability(band)
    )
    .map_err(CliError::WriteOutput)?;
    writeln!(writer, "matches: {matches}").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ScoreConfig, CliError> {
    let merged = ScoreArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ScoreConfig::try_from(merged)
}
