//! Cancellation tokens for async continuations.
//!
//! Snapshot capture resolves after an arbitrary delay, and the element
//! that requested it may be torn down in the meantime. Every async
//! continuation holds a [`LivenessToken`] and checks it before touching
//! engine state; teardown revokes the token, so a late resolution is
//! discarded instead of mutating freed resources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owner side of the liveness flag. Held by the entity whose lifetime
/// gates the continuations (a glass element).
#[derive(Debug)]
pub struct Liveness {
    flag: Arc<AtomicBool>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Hand out a token for an async continuation to carry.
    pub fn token(&self) -> LivenessToken {
        LivenessToken {
            flag: Arc::clone(&self.flag),
        }
    }

    /// Revoke all outstanding tokens. Idempotent.
    pub fn revoke(&self) {
        if self.flag.swap(false, Ordering::AcqRel) {
            tracing::trace!("liveness revoked, outstanding continuations will discard");
        }
    }

    pub fn is_live(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed proof of life, checked before any resource mutation.
#[derive(Clone, Debug)]
pub struct LivenessToken {
    flag: Arc<AtomicBool>,
}

impl LivenessToken {
    pub fn is_live(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_observe_revocation() {
        let liveness = Liveness::new();
        let token = liveness.token();
        assert!(token.is_live());

        liveness.revoke();
        assert!(!token.is_live());
        assert!(!liveness.is_live());

        // Revoking again is a no-op
        liveness.revoke();
        assert!(!token.is_live());
    }

    #[test]
    fn tokens_outlive_the_owner() {
        let token = {
            let liveness = Liveness::new();
            let token = liveness.token();
            liveness.revoke();
            token
        };
        assert!(!token.is_live());
    }
}
