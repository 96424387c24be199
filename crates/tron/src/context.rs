use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller-side deadline and cancellation for one logical operation.
///
/// Every entry point of the client takes a `&Context`. A context without a deadline gets the
/// client's default timeout applied per dispatched RPC, never to the caller's whole operation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Context {
    /// No deadline, never cancelled unless [`Context::cancel`] is called.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Child context sharing cancellation, with `timeout` attached only if no deadline is set.
    pub fn or_timeout(&self, timeout: Duration) -> Self {
        Self {
            deadline: Some(self.deadline.unwrap_or_else(|| Instant::now() + timeout)),
            cancel: self.cancel.child_token(),
        }
    }

    /// Child context whose deadline is the earlier of the parent's and `now + timeout`.
    pub fn narrowed(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(d) if d < candidate => d,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.child_token(),
        }
    }

    /// Fails fast if the context already expired.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match self.deadline {
            Some(d) if d <= Instant::now() => Err(Error::Deadline),
            _ => Ok(()),
        }
    }

    /// Races `fut` against the deadline and cancellation.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        self.check()?;
        let sleep = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = sleep => Err(Error::Deadline),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn run_times_out_pending_future() {
        let ctx = Context::with_timeout(Duration::from_millis(50));
        let err = ctx
            .run(std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.is_deadline());
    }

    #[tokio::test]
    async fn run_reports_cancellation() {
        let ctx = Context::background();
        ctx.cancel();
        let err = ctx.run(async { 1 }).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn or_timeout_keeps_existing_deadline() {
        let ctx = Context::with_timeout(Duration::from_secs(1));
        let child = ctx.or_timeout(Duration::from_secs(30));
        assert_eq!(child.deadline(), ctx.deadline());

        let bg = Context::background().or_timeout(Duration::from_secs(30));
        assert!(bg.deadline().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn narrowed_picks_earlier_deadline() {
        let ctx = Context::with_timeout(Duration::from_secs(1));
        let child = ctx.narrowed(Duration::from_secs(10));
        assert_eq!(child.deadline(), ctx.deadline());

        let child = ctx.narrowed(Duration::from_millis(10));
        assert!(child.deadline() < ctx.deadline());
    }

    #[tokio::test]
    async fn cancelling_parent_cancels_child() {
        let ctx = Context::background();
        let child = ctx.or_timeout(Duration::from_secs(5));
        ctx.cancel();
        assert!(child.is_cancelled());
    }
}
