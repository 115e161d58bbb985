//! Cancellation scopes with optional deadlines.
//!
//! A `Context` is cheap to clone and is passed by reference into every
//! blocking operation. Contexts form a tree: a child created with
//! [`Context::with_timeout`] or [`Context::with_cancel`] ends when its parent
//! ends, while cancelling the child leaves the parent untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Upper bound on how long a blocked caller waits before re-checking its context.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelReason {
    #[error("operation canceled")]
    Canceled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<Scope>,
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<Context>,
    deadline: Option<Instant>,
    canceled: Option<Arc<AtomicBool>>,
}

/// Cancels the context it was created with, and every context derived from it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Context {
    /// A context that never ends.
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.child(Some(deadline), None)
    }

    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = self.child(None, Some(Arc::clone(&flag)));
        (ctx, CancelHandle { flag })
    }

    fn child(&self, deadline: Option<Instant>, canceled: Option<Arc<AtomicBool>>) -> Self {
        Self {
            inner: Arc::new(Scope {
                parent: Some(self.clone()),
                deadline,
                canceled,
            }),
        }
    }

    /// Why this context ended, or `None` while it is still live.
    ///
    /// Explicit cancellation anywhere up the chain wins over an expired deadline.
    pub fn err(&self) -> Option<CancelReason> {
        let mut expired = false;
        let now = Instant::now();
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            let s = &ctx.inner;
            if s.canceled.as_ref().is_some_and(|f| f.load(Ordering::SeqCst)) {
                return Some(CancelReason::Canceled);
            }
            if s.deadline.is_some_and(|d| now >= d) {
                expired = true;
            }
            scope = s.parent.as_ref();
        }
        expired.then_some(CancelReason::DeadlineExceeded)
    }

    pub fn check(&self) -> Result<(), CancelReason> {
        match self.err() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// The earliest deadline on the chain.
    pub fn deadline(&self) -> Option<Instant> {
        let mut earliest: Option<Instant> = None;
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            if let Some(d) = ctx.inner.deadline {
                earliest = Some(earliest.map_or(d, |e| e.min(d)));
            }
            scope = ctx.inner.parent.as_ref();
        }
        earliest
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Sleep for `duration`, returning early with the reason if the context ends.
    pub fn sleep(&self, duration: Duration) -> Result<(), CancelReason> {
        let until = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= until {
                return Ok(());
            }
            std::thread::sleep(POLL_INTERVAL.min(until - now));
        }
    }

    /// Run `f` on a worker thread and wait for it while this context is live.
    ///
    /// When the context ends first the call returns immediately and the
    /// worker's result is discarded once it finishes. A panic in `f` is
    /// propagated to the caller.
    pub fn run_blocking<T, F>(&self, f: F) -> Result<T, CancelReason>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.check()?;
        let (tx, rx) = mpsc::channel();
        let worker = std::thread::spawn(move || {
            let _ = tx.send(f());
        });
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(value) => return Ok(value),
                Err(mpsc::RecvTimeoutError::Timeout) => self.check()?,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    if let Err(panic) = worker.join() {
                        std::panic::resume_unwind(panic);
                    }
                    // The worker always sends before exiting normally.
                    unreachable!("worker exited without a result");
                }
            }
        }
    }
}
