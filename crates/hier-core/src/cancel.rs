pub use tokio_util::sync::CancellationToken;

/// Returned when a cooperative cancellation check observes a cancelled token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Counts processed items and polls a [`CancellationToken`] every `interval` items.
///
/// Polling is cheap but not free; hot loops over hundreds of thousands of
/// classes only look at the token periodically.
#[derive(Debug)]
pub struct CancelCheck<'a> {
    token: &'a CancellationToken,
    interval: u32,
    countdown: u32,
}

impl<'a> CancelCheck<'a> {
    pub fn new(token: &'a CancellationToken, interval: u32) -> Self {
        let interval = interval.max(1);
        Self {
            token,
            interval,
            countdown: interval,
        }
    }

    /// Record one processed item, checking the token when the interval elapses.
    #[inline]
    pub fn tick(&mut self) -> Result<(), Cancelled> {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = self.interval;
            return self.check();
        }
        Ok(())
    }

    /// Check the token immediately.
    #[inline]
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.token.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
