use crate::errors::DasqError;
use std::{future::Future, time::Duration};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline carried through every retrieval and sampling call. Cancelling a context cancels every
/// context derived from it, and a derived context never outlives its parent's deadline.
#[derive(Clone, Debug)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Context which is never cancelled on its own and has no deadline.
    pub fn background() -> Self {
        Context {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Derived context, cancelled along with this one.
    pub fn child(&self) -> Self {
        Context {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derived context which additionally expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;

        Context {
            token: self.token.child_token(),
            deadline: Some(self.deadline.map_or(deadline, |parent| parent.min(deadline))),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drives `fut` to completion, unless this context is cancelled or its deadline passes first, in which case `fut` is
    /// dropped and `DasqError::Cancelled` or `DasqError::DeadlineExceeded` is returned.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, DasqError>
    where
        F: Future<Output = Result<T, DasqError>>,
    {
        if self.token.is_cancelled() {
            return Err(DasqError::Cancelled);
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(DasqError::Cancelled),
            _ = expired => Err(DasqError::DeadlineExceeded),
            res = fut => res,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
