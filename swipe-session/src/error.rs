//! Errors that end a decision loop.

use swipe_core::{PageError, QuotaError};
use thiserror::Error;

use crate::LoopState;

/// Unrecoverable failures raised by [`DecisionLoop`](crate::DecisionLoop).
///
/// Transient page problems, classifier failures and timeouts never surface
/// here; the loop handles them by applying its safe default.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The browser session died.
    #[error("fatal page error while in {state}")]
    Page {
        /// Phase the loop was in.
        state: LoopState,
        /// Underlying page error.
        #[source]
        source: PageError,
    },
    /// The quota tracker refused a record call.
    #[error("quota bookkeeping failed")]
    Quota(#[from] QuotaError),
}
