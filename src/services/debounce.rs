use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Holds back a value until it has been stable for a quiescence window.
///
/// Each `push` replaces the pending value and restarts the window.
/// `settled` is cancel-safe: dropping it mid-wait keeps the pending value,
/// so it can sit in a `tokio::select!` loop next to the input source.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.window));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Resolve with the pending value once the window has elapsed. Never
    /// resolves while nothing is pending.
    pub async fn settled(&mut self) -> T {
        let Some((_, deadline)) = &self.pending else {
            return futures::future::pending().await;
        };
        sleep_until(*deadline).await;

        match self.pending.take() {
            Some((value, _)) => value,
            None => futures::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::query::{Mode, QueryState};

    const WINDOW: Duration = Duration::from_millis(350);

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_quiescence() {
        let mut debouncer = Debouncer::new(WINDOW);
        let start = Instant::now();
        debouncer.push("a".to_string());
        tokio::time::advance(Duration::from_millis(200)).await;
        debouncer.push("ab".to_string());

        let early = tokio::time::timeout(Duration::from_millis(200), debouncer.settled()).await;
        assert!(early.is_err());
        assert!(debouncer.is_pending());

        let value = debouncer.settled().await;
        assert_eq!(value, "ab");
        assert!(Instant::now() - start >= Duration::from_millis(550));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_debouncer_never_fires() {
        let mut debouncer: Debouncer<String> = Debouncer::new(WINDOW);
        let waited = tokio::time::timeout(Duration::from_secs(5), debouncer.settled()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push(1);
        debouncer.cancel();
        let waited = tokio::time::timeout(Duration::from_secs(1), debouncer.settled()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_type_then_delete_before_quiescence_stays_browsing() {
        let mut state = QueryState::new(6);
        let mut debouncer = Debouncer::new(WINDOW);

        for text in ["a", "ab", "abc", "ab", "a", ""] {
            state.set_input(text);
            debouncer.push(text.to_string());
            tokio::time::advance(Duration::from_millis(50)).await;
        }

        let sampled = debouncer.settled().await;
        assert_eq!(sampled, "");
        assert!(!state.commit_term(&sampled));
        assert_eq!(state.mode(), Mode::Browsing);
    }
}
