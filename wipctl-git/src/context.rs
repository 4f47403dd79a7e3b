//! Operation context: cancellation, deadline and dry-run, as typed fields.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request-scoped settings passed to every executor call.
///
/// Cloning shares the cancellation flag, so cancelling any clone cancels all.
/// [`OpContext::unit`] additionally gives a clone its own record of whether a
/// git command was cut short.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    /// When set, mutating verbs describe their command and run nothing.
    pub dry_run: bool,
    pub deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
    interrupted: Arc<AtomicBool>,
}

impl OpContext {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Set the deadline to `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// True once either cancellation or the deadline has fired.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline_passed()
    }

    /// Clone for one unit of work: same cancellation and deadline, fresh
    /// interruption record.
    pub fn unit(&self) -> Self {
        Self {
            interrupted: Arc::default(),
            ..self.clone()
        }
    }

    /// Whether a git command run under this unit was refused or killed
    /// because of cancellation or the deadline.
    pub fn was_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_interrupted(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = OpContext::new(false);
        let other = ctx.clone();
        other.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.is_done());
    }

    #[test]
    fn zero_timeout_is_immediately_done() {
        let ctx = OpContext::new(true).with_timeout(Duration::ZERO);
        assert!(ctx.deadline_passed());
        assert!(ctx.dry_run);
    }

    #[test]
    fn unit_shares_cancel_but_not_interruption() {
        let ctx = OpContext::new(false);
        let first = ctx.unit();
        let second = ctx.unit();
        first.mark_interrupted();
        assert!(first.was_interrupted());
        assert!(!second.was_interrupted());
        assert!(!ctx.was_interrupted());

        second.cancel();
        assert!(first.is_cancelled());
        assert!(ctx.is_done());
    }
}
