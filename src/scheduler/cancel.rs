// src/scheduler/cancel.rs
//! Cancellation token carried by every scheduled callback.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared liveness flag. Once cancelled it never becomes live again; a new run
/// gets a new token.
#[derive(Debug, Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// A token that is already cancelled.
    pub fn cancelled() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_live()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_and_idempotent() {
        let token = CancellationToken::new();
        let captured = token.clone();
        assert!(captured.is_live());

        token.cancel();
        token.cancel();
        assert!(captured.is_cancelled());
    }

    #[test]
    fn fresh_tokens_are_independent() {
        let old = CancellationToken::new();
        old.cancel();
        assert!(CancellationToken::new().is_live());
        assert!(CancellationToken::cancelled().is_cancelled());
    }
}
