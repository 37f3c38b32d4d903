use tokio_util::sync::CancellationToken;

use crate::token::ContinuationToken;

/// One fetch attempt issued by a coordinator.
///
/// Cloning shares the cancellation signal.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    sequence: u64,
    token: Option<ContinuationToken>,
    is_initial_load: bool,
    cancel: CancellationToken,
}

impl LoadRequest {
    pub(super) fn new(
        sequence: u64,
        token: Option<ContinuationToken>,
        is_initial_load: bool,
    ) -> Self {
        Self {
            sequence,
            token,
            is_initial_load,
            cancel: CancellationToken::new(),
        }
    }

    /// Monotonic per coordinator; the active request always holds the highest one.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Continuation the fetch targets; `None` for a fresh load.
    pub fn token(&self) -> Option<&ContinuationToken> {
        self.token.as_ref()
    }

    pub fn is_initial_load(&self) -> bool {
        self.is_initial_load
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(super) fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(super) fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
