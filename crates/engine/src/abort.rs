// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator abort signal

use std::sync::Arc;
use tokio::sync::watch;

/// One-way abort flag shared between the signal handler and the sequencer.
///
/// Once raised it stays raised; a fresh signal is needed for a new run.
#[derive(Clone)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the flag. Safe to call from any thread.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is raised
    pub async fn aborted(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as self, so this cannot fail
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

#[cfg(test)]
#[path = "abort_tests.rs"]
mod tests;
