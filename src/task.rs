//! Cooperative cancellation and progress reporting.
//!
//! Long-running operations (bridge mapping, feature store builds) accept a
//! [`TaskHandle`] and poll it at phase boundaries. Cancellation is
//! cooperative only: a request is observed at the next checkpoint, never
//! mid-phase, so partially built state is dropped rather than published.

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::Arc;

use crate::error::{
    Error,
    Result,
};

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type ProgressFn = Box<dyn Fn(u8, &str) + Send + Sync>;

/// Per-operation handle bundling an optional [`CancelToken`] with an
/// optional progress callback. The default handle never cancels and
/// reports nothing.
#[derive(Default)]
pub struct TaskHandle {
    cancel:   Option<CancelToken>,
    progress: Option<ProgressFn>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(
        mut self,
        token: CancelToken,
    ) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress<F>(
        mut self,
        callback: F,
    ) -> Self
    where
        F: Fn(u8, &str) + Send + Sync + 'static, {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Returns `Err(Error::Cancelled)` if cancellation has been requested,
    /// without reporting progress. For per-iteration checks inside batch
    /// loops.
    pub fn check_cancelled(&self) -> Result<()> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }
        }
        Ok(())
    }

    /// Reports progress and returns `Err(Error::Cancelled)` if cancellation
    /// has been requested. Called at phase boundaries only.
    pub fn checkpoint(
        &self,
        percent: u8,
        message: &str,
    ) -> Result<()> {
        self.check_cancelled()?;
        if let Some(progress) = &self.progress {
            progress(percent.min(100), message);
        }
        Ok(())
    }
}
