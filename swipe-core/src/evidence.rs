//! Per-iteration evidence gathered from a profile before a decision.

/// Screenshot bytes captured for classification.
///
/// The bytes are expected to be PNG encoded, which is what every supported
/// browser adapter produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Vec<u8>,
}

impl CapturedImage {
    /// MIME type sent alongside the image to classification services.
    pub const MIME_TYPE: &'static str = "image/png";

    /// Wrap raw PNG bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Borrow the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Report whether the capture produced no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Signals extracted from one profile.
///
/// Evidence is created fresh every iteration and dropped once the decision
/// has been applied.
///
/// # Examples
///
/// ```
/// use swipe_core::ProfileEvidence;
///
/// let evidence = ProfileEvidence::default().with_blacklist_term("onlyfans");
/// assert!(evidence.blacklist_hit());
/// assert!(evidence.forces_reject());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEvidence {
    blacklist_term: Option<String>,
    /// The bio is a single `@handle` and nothing else.
    pub bio_social_only: bool,
    /// Raw bio text, when the site exposes a bio region.
    pub bio: Option<String>,
}

impl ProfileEvidence {
    /// Record the blacklist term that matched the visible text.
    #[must_use]
    pub fn with_blacklist_term(mut self, term: impl Into<String>) -> Self {
        self.blacklist_term = Some(term.into());
        self
    }

    /// Whether any blacklist term matched.
    #[must_use]
    pub const fn blacklist_hit(&self) -> bool {
        self.blacklist_term.is_some()
    }

    /// The first blacklist term that matched, if any.
    #[must_use]
    pub fn blacklist_term(&self) -> Option<&str> {
        self.blacklist_term.as_deref()
    }

    /// Whether the evidence alone forces a rejection without classification.
    #[must_use]
    pub const fn forces_reject(&self) -> bool {
        self.blacklist_hit() || self.bio_social_only
    }
}
