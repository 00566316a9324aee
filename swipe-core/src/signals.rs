//! Pure text heuristics applied to scraped profile content.
//!
//! These helpers never touch a page; the signal extractor in `swipe-session`
//! feeds them with text read through [`BrowserPage`](crate::BrowserPage).

/// Case-insensitive set of disallowed terms.
///
/// Blank terms are discarded on construction so a trailing comma in a
/// configured list cannot match every profile.
///
/// # Examples
///
/// ```
/// use swipe_core::Blacklist;
///
/// let blacklist = Blacklist::new(["OnlyFans", " ", "pix"]);
/// assert_eq!(blacklist.find("Check my onlyfans"), Some("OnlyFans"));
/// assert!(blacklist.find("loves hiking").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    terms: Vec<(String, String)>,
}

impl Blacklist {
    /// Build a blacklist from raw terms, trimming whitespace.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|term| term.as_ref().trim().to_owned())
                .filter(|term| !term.is_empty())
                .map(|term| {
                    let folded = term.to_lowercase();
                    (term, folded)
                })
                .collect(),
        }
    }

    /// Parse a comma-separated list such as `"onlyfans,pix,venda"`.
    #[must_use]
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Return the first configured term contained in `text`.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&str> {
        if self.terms.is_empty() {
            return None;
        }
        let haystack = text.to_lowercase();
        self.terms
            .iter()
            .find(|(_, folded)| haystack.contains(folded.as_str()))
            .map(|(term, _)| term.as_str())
    }

    /// Number of usable terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no usable terms were configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Report whether a bio is exactly one whitespace-delimited `@handle`.
///
/// # Examples
///
/// ```
/// use swipe_core::bio_is_social_only;
///
/// assert!(bio_is_social_only("  @someone \n"));
/// assert!(!bio_is_social_only("@someone likes cats"));
/// assert!(!bio_is_social_only(""));
/// ```
#[must_use]
pub fn bio_is_social_only(bio: &str) -> bool {
    let mut tokens = bio.split_whitespace();
    matches!(
        (tokens.next(), tokens.next()),
        (Some(token), None) if token.starts_with('@')
    )
}

/// Collect the distinct `@handle` tokens mentioned in a bio, in order.
///
/// Trailing punctuation is stripped so `@name,` and `@name` count once.
#[must_use]
pub fn social_handles(bio: &str) -> Vec<String> {
    let mut handles: Vec<String> = Vec::new();
    for token in bio.split_whitespace() {
        let Some(rest) = token.strip_prefix('@') else {
            continue;
        };
        let name: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.'))
            .collect();
        let trimmed = name.trim_end_matches('.');
        if trimmed.is_empty() {
            continue;
        }
        let handle = format!("@{trimmed}");
        if !handles.contains(&handle) {
            handles.push(handle);
        }
    }
    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Check my OnlyFans", Some("onlyfans"))]
    #[case("pix na bio", Some("pix"))]
    #[case("nothing to see", None)]
    fn find_is_case_insensitive(#[case] text: &str, #[case] expected: Option<&str>) {
        let blacklist = Blacklist::new(["onlyfans", "pix"]);
        assert_eq!(blacklist.find(text), expected);
    }

    #[rstest]
    fn csv_parsing_skips_blank_terms() {
        let blacklist = Blacklist::from_csv("onlyfans, ,pix,");
        assert_eq!(blacklist.len(), 2);
        assert!(blacklist.find("any text at all").is_none());
    }

    #[rstest]
    fn empty_blacklist_never_matches() {
        assert!(Blacklist::default().find("onlyfans").is_none());
    }

    #[rstest]
    #[case("@handle", true)]
    #[case("\t@handle\n", true)]
    #[case("@", true)]
    #[case("handle", false)]
    #[case("@one @two", false)]
    #[case("hi @handle", false)]
    #[case("   ", false)]
    fn social_only_detection(#[case] bio: &str, #[case] expected: bool) {
        assert_eq!(bio_is_social_only(bio), expected);
    }

    #[rstest]
    fn handles_are_deduplicated_and_trimmed() {
        let handles = social_handles("insta @ana_b, also @ana_b and @joao.silva. @");
        assert_eq!(handles, vec!["@ana_b".to_owned(), "@joao.silva".to_owned()]);
    }
}
