//! Focused unit tests covering greet CLI configuration.

use super::helpers::{workspace, write_utf8};
use super::*;
use crate::greet::{GreetArgs, GreetConfig, config_from_layers_for_test, write_report};
use camino::Utf8PathBuf;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use swipe_session::{OpenerError, OpenerReport};

const TEMPLATES: &[u8] = br#"[{"message": "Oi!"}, {"message": "Tudo bem?"}]"#;

#[rstest]
fn converting_without_templates_errors() {
    let err = GreetConfig::try_from(GreetArgs::default()).expect_err("missing templates");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_TEMPLATES);
            assert_eq!(env, ENV_GREET_TEMPLATES);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn site_defaults_to_tinder() {
    let args = GreetArgs {
        templates: Some(Utf8PathBuf::from("messages.json")),
        ..GreetArgs::default()
    };
    let config = GreetConfig::try_from(args).expect("config should build");
    assert_eq!(config.site, "tinder");
    assert!(config.limit.is_none());
}

#[rstest]
fn prepare_applies_the_limit() {
    let (_tmp, root) = workspace();
    let templates = root.join("messages.json");
    write_utf8(&templates, TEMPLATES);
    let config = GreetConfig::try_from(GreetArgs {
        templates: Some(templates),
        limit: Some(4),
        ..GreetArgs::default()
    })
    .expect("config should build");

    let (campaign, site) = config.prepare().expect("prepare");

    assert_eq!(campaign.limit, 4);
    assert_eq!(site.name, "Tinder");
}

#[rstest]
fn sites_without_messaging_are_refused() {
    let (_tmp, root) = workspace();
    let templates = root.join("messages.json");
    write_utf8(&templates, TEMPLATES);
    let config = GreetConfig::try_from(GreetArgs {
        site: Some("bumble".to_owned()),
        templates: Some(templates),
        ..GreetArgs::default()
    })
    .expect("config should build");

    let err = config.prepare().expect_err("bumble has no messaging");
    match err {
        CliError::Opener {
            site,
            source: OpenerError::Unsupported { .. },
        } => assert_eq!(site, "Bumble"),
        other => panic!("expected Opener(Unsupported), found {other:?}"),
    }
}

#[rstest]
fn empty_template_files_are_reported() {
    let (_tmp, root) = workspace();
    let templates = root.join("messages.json");
    write_utf8(&templates, br#"[{"message": "  "}]"#);
    let config = GreetConfig::try_from(GreetArgs {
        templates: Some(templates),
        ..GreetArgs::default()
    })
    .expect("config should build");

    let err = config.prepare().expect_err("no usable templates");
    assert!(
        matches!(
            err,
            CliError::Opener {
                source: OpenerError::NoTemplates,
                ..
            }
        ),
        "unexpected {err:?}"
    );
}

#[rstest]
fn merge_layers_resolve_browser_options() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({ "templates": "messages.json", "window_width": 1600, "headless": false }),
        None,
    );
    composer.push_environment(json!({ "headless": true }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert!(config.browser.headless);
    assert_eq!(config.browser.window, (1600, 1080));
}

#[rstest]
fn reports_summarise_the_campaign() {
    let mut output = Vec::new();
    let report = OpenerReport {
        visited: 5,
        sent: 4,
        failed: 1,
    };

    write_report(&mut output, "Tinder", report).expect("write");

    assert_eq!(
        String::from_utf8(output).expect("utf-8"),
        "Tinder: greeted 4 of 5 matches visited (1 skipped)\n"
    );
}
