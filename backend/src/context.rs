//! Request-scoped deadline and cancellation.
//!
//! A [`Context`] travels with every call from the HTTP handler down to the
//! repository. The logic layer narrows it with [`Context::with_timeout`]; the
//! returned [`ScopedContext`] cancels its child token when dropped, so the
//! derived context is released on every exit path of the operation.

use std::future::Future;
use std::ops::Deref;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Why a context stopped admitting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    #[error("context cancelled")]
    Cancelled,
}

/// Cancellation token plus optional deadline.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Derive a child context bounded by `timeout`.
    ///
    /// The child keeps the parent's deadline if that one is earlier, and is
    /// cancelled whenever the parent is. Dropping the returned guard cancels
    /// the child.
    pub fn with_timeout(&self, timeout: Duration) -> ScopedContext {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        let token = self.token.child_token();
        ScopedContext {
            context: Context {
                token: token.clone(),
                deadline: Some(deadline),
            },
            _guard: token.drop_guard(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the error this context already carries, if any.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => ContextError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }

    /// Drive `fut` until it completes or the context ends, whichever is first.
    ///
    /// When the context wins, `fut` is dropped.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ContextError> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            out = fut => Ok(out),
            err = self.done() => Err(err),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

/// A derived context that is cancelled when this value is dropped.
pub struct ScopedContext {
    context: Context,
    _guard: DropGuard,
}

impl ScopedContext {
    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Deref for ScopedContext {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.context
    }
}
