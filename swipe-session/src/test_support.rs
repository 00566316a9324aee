//! Site scripts shared by unit and integration tests.

use swipe_core::{Locator, PageAction, Region};

use crate::{MessagingScript, SiteScript};

/// Script shaped like the Tinder preset, with short placeholder selectors.
#[must_use]
pub fn tinder_like_script() -> SiteScript {
    SiteScript {
        name: "Stub".to_owned(),
        start_url: "https://stub.test/app/recs".to_owned(),
        profile_marker: Locator::css("div.card"),
        open_profile: Some(PageAction::click(Locator::css_with_text(
            "button",
            "Open profile",
        ))),
        bio: Some(Locator::following_label("About me")),
        classification_region: Region::new(0.0, 0.0, 400.0, 600.0),
        readiness_marker: Locator::css_with_text("button", "Report"),
        like: PageAction::key("ArrowRight"),
        reject: PageAction::key("ArrowLeft"),
        interstitial: Some(Locator::css_with_text("button", "No thanks")),
        humanise_keys: vec!["ArrowDown".to_owned(), "ArrowUp".to_owned()],
        messaging: Some(MessagingScript {
            matches_url: "https://stub.test/app/matches".to_owned(),
            match_links: Locator::css("a[href^=\"/app/messages/\"]"),
            message_input: Locator::css("textarea"),
            send_button: Locator::css("button[type=\"submit\"]"),
        }),
    }
}
