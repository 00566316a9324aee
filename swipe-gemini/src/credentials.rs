//! API key pool.

use std::fmt;

use swipe_core::RandomSource;

use crate::ProviderBuildError;

/// Non-empty set of API keys.
///
/// Keys never appear in `Debug` output or logs; only their count and the
/// chosen index do.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPool {
    keys: Vec<String>,
}

impl CredentialPool {
    /// Keep the non-blank keys, trimmed.
    ///
    /// # Errors
    /// Returns [`ProviderBuildError::NoCredentials`] when no key remains.
    pub fn new<I, S>(keys: I) -> Result<Self, ProviderBuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|key| key.as_ref().trim().to_owned())
            .filter(|key| !key.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(ProviderBuildError::NoCredentials);
        }
        Ok(Self { keys })
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always `false`; construction rejects empty pools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Draw a key uniformly at random, returning its index and value.
    pub(crate) fn pick<R>(&self, random: &mut R) -> Option<(usize, &str)>
    where
        R: RandomSource + ?Sized,
    {
        let index = random.pick_index(self.keys.len())?;
        self.keys.get(index).map(|key| (index, key.as_str()))
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .finish()
    }
}
