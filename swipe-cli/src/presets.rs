//! Built-in site scripts.
//!
//! Presets target the Portuguese-language web apps. Any other layout can be
//! described in a JSON site script and passed by path instead of a preset
//! name.

use camino::Utf8Path;
use swipe_core::{Locator, PageAction, Region};
use swipe_session::{MessagingScript, SiteScript};

use crate::CliError;

/// Names accepted by [`preset`].
pub(crate) const PRESET_NAMES: [&str; 2] = ["tinder", "bumble"];

/// Look up a preset by name, ignoring case.
///
/// Classification regions are fractions of `window` so they follow the
/// configured browser size.
pub(crate) fn preset(name: &str, window: (u32, u32)) -> Option<SiteScript> {
    match name.trim().to_ascii_lowercase().as_str() {
        "tinder" => Some(tinder(window)),
        "bumble" => Some(bumble(window)),
        _ => None,
    }
}

/// Resolve each entry to a preset or, failing that, a site script file.
pub(crate) fn resolve_sites(
    names: &[String],
    window: (u32, u32),
) -> Result<Vec<SiteScript>, CliError> {
    names
        .iter()
        .map(|name| {
            if let Some(script) = preset(name, window) {
                return Ok(script);
            }
            let path = Utf8Path::new(name);
            match swipe_fs::file_is_file(path) {
                Ok(true) => Ok(SiteScript::load(path)?),
                _ => Err(CliError::UnknownSite { name: name.clone() }),
            }
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "classification regions are fractions of the window size"
)]
fn fraction(extent: u32, divisor: f64) -> f64 {
    f64::from(extent) / divisor
}

fn tinder((width, height): (u32, u32)) -> SiteScript {
    let button = r#"button[type="button"]"#;
    SiteScript {
        name: "Tinder".to_owned(),
        start_url: "https://tinder.com/app/recs".to_owned(),
        profile_marker: Locator::css(r"span.Typs\(display-1-strong\)"),
        open_profile: Some(PageAction::click(Locator::css_with_text(
            button,
            "Abrir perfil",
        ))),
        bio: Some(Locator::following_label("Sobre mim")),
        classification_region: Region::new(
            fraction(width, 2.5),
            2.5,
            fraction(width, 3.0),
            fraction(height, 1.5),
        ),
        readiness_marker: Locator::css_with_text(button, "Denunciar"),
        like: PageAction::key("ArrowRight"),
        reject: PageAction::key("ArrowLeft"),
        interstitial: Some(Locator::css_with_text("button", "Não, obrigado(a)")),
        humanise_keys: vec!["ArrowDown".to_owned(), "ArrowUp".to_owned()],
        messaging: Some(MessagingScript {
            matches_url: "https://tinder.com/app/matches".to_owned(),
            match_links: Locator::css(r#"a[href^="/app/messages/"]"#),
            message_input: Locator::css(r#"textarea[placeholder="Digite uma mensagem"]"#),
            send_button: Locator::css(r#"button[type="submit"]"#),
        }),
    }
}

fn bumble((width, height): (u32, u32)) -> SiteScript {
    let card = Locator::css("div.encounters-user");
    SiteScript {
        name: "Bumble".to_owned(),
        start_url: "https://bumble.com/app".to_owned(),
        profile_marker: card.clone(),
        open_profile: None,
        bio: Some(Locator::css("p.encounters-story-about__text")),
        classification_region: Region::new(
            fraction(width, 4.0),
            0.0,
            fraction(width, 2.0),
            f64::from(height),
        ),
        readiness_marker: card,
        like: PageAction::key("ArrowRight"),
        reject: PageAction::key("ArrowLeft"),
        interstitial: None,
        humanise_keys: vec!["ArrowDown".to_owned(), "ArrowUp".to_owned()],
        messaging: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("tinder", "Tinder")]
    #[case(" Bumble ", "Bumble")]
    #[case("TINDER", "Tinder")]
    fn presets_are_found_by_name(#[case] name: &str, #[case] expected: &str) {
        let script = preset(name, (1920, 1080)).expect("preset");
        assert_eq!(script.name, expected);
    }

    #[rstest]
    fn tinder_region_follows_the_window() {
        let script = preset("tinder", (1600, 900)).expect("tinder");
        let region = script.classification_region;
        assert_eq!(region.x, 640.0);
        assert_eq!(region.y, 2.5);
        assert_eq!(region.height, 600.0);
    }

    #[rstest]
    fn tinder_waits_for_the_profile_name() {
        let script = preset("tinder", (1920, 1080)).expect("tinder");
        assert_eq!(
            script.profile_marker,
            Locator::css(r"span.Typs\(display-1-strong\)")
        );
        assert_ne!(
            script.open_profile,
            Some(PageAction::click(script.profile_marker.clone()))
        );
    }

    #[rstest]
    fn bumble_region_covers_the_middle_half() {
        let script = preset("bumble", (1920, 1080)).expect("bumble");
        assert_eq!(
            script.classification_region,
            Region::new(480.0, 0.0, 960.0, 1080.0)
        );
        assert!(script.messaging.is_none());
    }

    #[rstest]
    fn only_tinder_supports_openers() {
        let supported: Vec<&str> = PRESET_NAMES
            .iter()
            .copied()
            .filter(|name| {
                preset(name, (1920, 1080)).is_some_and(|script| script.messaging.is_some())
            })
            .collect();
        assert_eq!(supported, ["tinder"]);
    }

    #[rstest]
    fn unknown_names_that_are_not_files_are_rejected() {
        let err = resolve_sites(&["hinge".to_owned()], (1920, 1080)).expect_err("unknown");
        assert!(matches!(err, CliError::UnknownSite { name } if name == "hinge"));
    }

    #[rstest]
    fn script_files_are_loaded_by_path() {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        let path = root.join("okc.json");
        let script = serde_json::to_string(&bumble((800, 600))).expect("encode");
        std::fs::write(path.as_std_path(), script.replace("Bumble", "Okc")).expect("write");

        let sites =
            resolve_sites(&["tinder".to_owned(), path.to_string()], (1920, 1080)).expect("sites");

        let names: Vec<&str> = sites.iter().map(|site| site.name.as_str()).collect();
        assert_eq!(names, ["Tinder", "Okc"]);
    }
}
