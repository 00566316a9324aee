//! Focused unit tests covering run CLI configuration and session planning.

use super::helpers::{WEIGHTS, workspace, write_utf8};
use super::*;
use crate::run::{PromptSource, RunArgs, RunConfig, config_from_layers_for_test, write_reports};
use camino::Utf8PathBuf;
use ortho_config::MergeComposer;
use rstest::{fixture, rstest};
use serde_json::json;
use std::collections::HashMap;
use swipe_core::{AttributeSet, Decision, QuotaLimits, QuotaTracker};
use swipe_session::{SessionReport, SessionStats};

#[fixture]
fn complete_args() -> RunArgs {
    RunArgs {
        weights: Some(Utf8PathBuf::from("weights.json")),
        prompt: Some("Describe the person as JSON.".to_owned()),
        api_keys: Some("key-a, key-b".to_owned()),
        ..RunArgs::default()
    }
}

#[rstest]
#[case::weights(ARG_WEIGHTS, ENV_RUN_WEIGHTS)]
#[case::prompt(ARG_PROMPT, ENV_RUN_PROMPT)]
#[case::api_keys(ARG_API_KEYS, ENV_RUN_API_KEYS)]
fn converting_without_required_fields_errors(
    complete_args: RunArgs,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let mut args = complete_args;
    match expected_field {
        ARG_WEIGHTS => args.weights = None,
        ARG_PROMPT => args.prompt = None,
        _ => args.api_keys = None,
    }

    let err = RunConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn blank_key_lists_count_as_missing(complete_args: RunArgs) {
    let args = RunArgs {
        api_keys: Some(" , ,".to_owned()),
        ..complete_args
    };
    let err = RunConfig::try_from(args).expect_err("blank keys");
    match err {
        CliError::MissingArgument { field, .. } => assert_eq!(field, ARG_API_KEYS),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn inline_and_file_prompts_conflict(complete_args: RunArgs) {
    let args = RunArgs {
        prompt_file: Some(Utf8PathBuf::from("prompt.txt")),
        ..complete_args
    };
    let err = RunConfig::try_from(args).expect_err("conflict");
    match err {
        CliError::ConflictingArguments { first, second } => {
            assert_eq!((first, second), (ARG_PROMPT, ARG_PROMPT_FILE));
        }
        other => panic!("expected ConflictingArguments, found {other:?}"),
    }
}

#[rstest]
fn unset_options_take_session_defaults(complete_args: RunArgs) {
    let config = RunConfig::try_from(complete_args).expect("config should build");
    assert_eq!(config.sites, ["tinder"]);
    assert_eq!(config.limits, QuotaLimits::default());
    assert_eq!(config.safe_default, Decision::Reject);
    assert!(config.humanise);
    assert_eq!(config.credentials.len(), 2);
    assert_eq!(config.gemini.model, swipe_gemini::DEFAULT_MODEL);
    assert!(config.blacklist.is_empty());
    assert!(config.audit_dir.is_none());
    assert_eq!(
        config.prompt,
        PromptSource::Inline("Describe the person as JSON.".to_owned())
    );
}

#[rstest]
#[case("like", Decision::Like)]
#[case("Reject", Decision::Reject)]
fn safe_default_accepts_decision_labels(
    complete_args: RunArgs,
    #[case] raw: &str,
    #[case] expected: Decision,
) {
    let args = RunArgs {
        safe_default: Some(raw.to_owned()),
        ..complete_args
    };
    let config = RunConfig::try_from(args).expect("config should build");
    assert_eq!(config.safe_default, expected);
}

#[rstest]
fn unknown_safe_default_is_rejected(complete_args: RunArgs) {
    let args = RunArgs {
        safe_default: Some("maybe".to_owned()),
        ..complete_args
    };
    let err = RunConfig::try_from(args).expect_err("invalid decision");
    match err {
        CliError::InvalidDecision { field, .. } => assert_eq!(field, ARG_SAFE_DEFAULT),
        other => panic!("expected InvalidDecision, found {other:?}"),
    }
}

#[rstest]
fn legacy_variables_fill_unset_prompt_and_keys() {
    let vars: HashMap<&str, &str> = [
        ("PROMPT", "Legacy prompt"),
        ("GEMINI_KEY", "first"),
        ("GEMINI_KEY3", "third"),
    ]
    .into_iter()
    .collect();
    let mut args = RunArgs::default();

    args.apply_legacy_env(|name| vars.get(name).map(|value| (*value).to_owned()));

    assert_eq!(args.prompt.as_deref(), Some("Legacy prompt"));
    assert_eq!(args.api_keys.as_deref(), Some("first,third"));
}

#[rstest]
fn legacy_variables_never_override_configuration(complete_args: RunArgs) {
    let mut args = RunArgs {
        prompt: None,
        prompt_file: Some(Utf8PathBuf::from("prompt.txt")),
        ..complete_args
    };

    args.apply_legacy_env(|_| Some("legacy".to_owned()));

    assert!(args.prompt.is_none());
    assert_eq!(args.api_keys.as_deref(), Some("key-a, key-b"));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "max_swipes": "lots" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "weights": "from-file.json",
            "prompt": "From file",
            "max_likes": 10,
            "blacklist": "smoker, vegan",
        }),
        None,
    );
    composer.push_environment(json!({
        "api_keys": "env-key",
        "max_likes": 20,
        "sites": "tinder,bumble",
    }));
    composer.push_cli(json!({ "max_likes": 5 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.weights, Utf8PathBuf::from("from-file.json"));
    assert_eq!(config.limits.max_likes, 5);
    assert_eq!(config.sites, ["tinder", "bumble"]);
    assert_eq!(config.blacklist.len(), 2);
    assert_eq!(config.credentials.len(), 1);
}

#[rstest]
fn validate_sources_reports_missing_weights(complete_args: RunArgs) {
    let (_tmp, root) = workspace();
    let mut config = RunConfig::try_from(complete_args).expect("config should build");
    config.weights = root.join("absent.json");

    let err = config.validate_sources().expect_err("missing weights");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_WEIGHTS);
            assert_eq!(path, root.join("absent.json"));
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn prepare_loads_weights_prompt_and_sites(complete_args: RunArgs) {
    let (_tmp, root) = workspace();
    let weights = root.join("weights.json");
    let prompt = root.join("prompt.txt");
    write_utf8(&weights, WEIGHTS.as_bytes());
    write_utf8(&prompt, b"  Describe the person.\n");
    let args = RunArgs {
        weights: Some(weights),
        prompt: None,
        prompt_file: Some(prompt),
        sites: Some("tinder, bumble".to_owned()),
        max_swipes: Some(7),
        ..complete_args
    };
    let config = RunConfig::try_from(args).expect("config should build");
    config.validate_sources().expect("sources exist");

    let plan = config.prepare().expect("plan");

    let names: Vec<&str> = plan.sites.iter().map(|site| site.name.as_str()).collect();
    assert_eq!(names, ["Tinder", "Bumble"]);
    assert_eq!(plan.session.prompt, "Describe the person.");
    assert_eq!(plan.session.limits.max_swipes, 7);
    let attrs: AttributeSet = [("age", "25"), ("interest", "travel")].into_iter().collect();
    assert_eq!(plan.engine.score_card(&attrs).total, 15);
}

#[rstest]
fn prepare_rejects_blank_prompts(complete_args: RunArgs) {
    let (_tmp, root) = workspace();
    let weights = root.join("weights.json");
    write_utf8(&weights, WEIGHTS.as_bytes());
    let args = RunArgs {
        weights: Some(weights),
        prompt: Some("   ".to_owned()),
        ..complete_args
    };
    let config = RunConfig::try_from(args).expect("config should build");

    let err = config.prepare().expect_err("blank prompt");
    assert!(matches!(err, CliError::BlankPrompt), "unexpected {err:?}");
}

#[rstest]
fn reports_are_written_before_the_first_failure_surfaces() {
    let report = SessionReport {
        site: "Tinder".to_owned(),
        stats: SessionStats::default(),
        quota: QuotaTracker::new(QuotaLimits::new(3, 1)).snapshot(),
    };
    let expected_line = format!("{report}\n");
    let mut output = Vec::new();

    let err = write_reports(
        &mut output,
        vec![
            Err(CliError::SessionPanicked {
                site: "Bumble".to_owned(),
            }),
            Ok(report),
        ],
    )
    .expect_err("failure surfaces");

    assert!(matches!(err, CliError::SessionPanicked { site } if site == "Bumble"));
    assert_eq!(String::from_utf8(output).expect("utf-8"), expected_line);
}
