use std::time::Duration;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the latest edit of a value until it has been quiet for `delay`.
/// Time is passed in as seconds so callers can use whatever clock they have.
#[derive(Clone, Debug)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(T, f64)>,
}

impl<T: PartialEq> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records an edit made at `now`. Re-submitting the pending value keeps its
    /// original timestamp.
    pub fn submit(&mut self, value: T, now: f64) {
        if let Some((pending, _)) = &self.pending
            && *pending == value
        {
            return;
        }
        self.pending = Some((value, now));
    }

    /// Releases the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: f64) -> Option<T> {
        let (_, submitted_at) = self.pending.as_ref()?;
        if now - submitted_at < self.delay.as_secs_f64() {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// Seconds until the pending value is due, for repaint scheduling.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pending
            .as_ref()
            .map(|(_, submitted_at)| (self.delay.as_secs_f64() - (now - submitted_at)).max(0.0))
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
