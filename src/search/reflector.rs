//! Debounced search term reflector
//!
//! ```text
//! on_input("l") ─┐
//! on_input("le") ─┼─ mpsc ──▶ debounce task ──(quiet for window)──▶ Location::replace
//! on_input("lee")┘
//! ```
//!
//! Keystrokes inside the window replace the pending term; only the last one
//! is ever navigated to.

use super::location::{Location, QUERY_PARAM, reflect};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period after the last keystroke before the location is updated
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Mirrors a search input into the location's query string
///
/// Must be created inside a tokio runtime. Dropping the reflector stops its
/// task and discards any pending term.
pub struct SearchReflector {
    location: Arc<dyn Location>,
    tx: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl SearchReflector {
    pub fn new(location: Arc<dyn Location>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_debounce_loop(location.clone(), rx, debounce));

        Self { location, tx, task }
    }

    /// Term to pre-populate the input with
    pub fn initial_term(&self) -> String {
        self.location
            .query_pairs()
            .into_iter()
            .find(|(k, _)| k == QUERY_PARAM)
            .map(|(_, v)| v)
            .unwrap_or_default()
    }

    /// Record a keystroke
    pub fn on_input(&self, term: impl Into<String>) {
        if self.tx.send(term.into()).is_err() {
            tracing::warn!("search reflector task has stopped; input dropped");
        }
    }
}

impl Drop for SearchReflector {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_debounce_loop(
    location: Arc<dyn Location>,
    mut rx: mpsc::UnboundedReceiver<String>,
    debounce: Duration,
) {
    let mut pending: Option<String> = None;

    loop {
        match pending.take() {
            None => match rx.recv().await {
                Some(term) => pending = Some(term),
                None => break,
            },
            Some(term) => {
                tokio::select! {
                    next = rx.recv() => match next {
                        Some(next) => pending = Some(next),
                        None => break,
                    },
                    _ = tokio::time::sleep(debounce) => navigate(location.as_ref(), &term),
                }
            }
        }
    }
}

fn navigate(location: &dyn Location, term: &str) {
    let query = reflect(&location.query_pairs(), term);
    let target = format!("{}?{}", location.path(), query);
    tracing::debug!(term = %term, target = %target, "search term reflected");
    location.replace(&target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::location::UrlLocation;

    fn setup(url: &str) -> (Arc<UrlLocation>, SearchReflector) {
        let location = Arc::new(UrlLocation::parse(url).unwrap());
        let reflector = SearchReflector::new(location.clone(), DEFAULT_DEBOUNCE);
        (location, reflector)
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_keystrokes_within_window_coalesce() {
        let (location, reflector) = setup("/dashboard/invoices");

        reflector.on_input("l");
        tokio::time::sleep(Duration::from_millis(100)).await;
        reflector.on_input("le");
        tokio::time::sleep(Duration::from_millis(100)).await;
        reflector.on_input("lee");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(
            location.history(),
            vec!["/dashboard/invoices?page=1&query=lee".to_string()]
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_nothing_happens_before_window_elapses() {
        let (location, reflector) = setup("/dashboard/invoices");

        reflector.on_input("lee");
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(location.history().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(location.history().len(), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_initial_term_reads_query() {
        let (_location, reflector) = setup("/dashboard/invoices?query=amy&page=2");
        assert_eq!(reflector.initial_term(), "amy");

        let (_location, reflector) = setup("/dashboard/invoices");
        assert_eq!(reflector.initial_term(), "");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_drop_discards_pending_term() {
        let (location, reflector) = setup("/dashboard/invoices");

        reflector.on_input("lee");
        drop(reflector);
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(location.history().is_empty());
    }
}
