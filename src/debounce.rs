//! Debouncing for rapidly changing input values.
//!
//! A [`Debouncer`] keeps two stages of the same value: the `raw` stage,
//! updated synchronously on every [`set`](Debouncer::set), and the
//! `committed` stage, which only catches up once the raw value has been
//! left unchanged for the configured delay. Side-effecting consumers read
//! the committed stage exclusively.

use tokio::time::{sleep_until, Duration, Instant};

/// A two-stage debounced value.
///
/// Any change to the raw value before the delay elapses restarts the
/// quiescence window. Dropping an in-progress [`settle`](Debouncer::settle)
/// future acts as the cancellation path: the pending update simply stays
/// pending until a later settle.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    raw: T,
    committed: T,
    pending_since: Option<Instant>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Create a debouncer whose both stages start at `initial`.
    #[must_use]
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            raw: initial.clone(),
            committed: initial,
            pending_since: None,
        }
    }

    /// Update the raw stage. An actual value change restarts the
    /// quiescence window; setting the same raw value again does not.
    pub fn set(&mut self, value: T) {
        if value != self.raw {
            self.raw = value;
            self.pending_since = Some(Instant::now());
        }
    }

    /// The raw (keystroke-level) value.
    pub fn raw(&self) -> &T {
        &self.raw
    }

    /// The committed (debounced) value.
    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// Whether an uncommitted raw change is waiting out its window.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Wait out the remainder of the quiescence window, then commit.
    ///
    /// Returns `true` if the committed value changed. Resolves immediately
    /// when nothing is pending.
    pub async fn settle(&mut self) -> bool {
        if let Some(since) = self.pending_since {
            sleep_until(since + self.delay).await;
        }
        self.commit_now()
    }

    /// Commit the raw stage without waiting. Returns `true` if the
    /// committed value changed.
    pub fn commit_now(&mut self) -> bool {
        self.pending_since = None;
        if self.raw != self.committed {
            self.committed = self.raw.clone();
            true
        } else {
            false
        }
    }
}
