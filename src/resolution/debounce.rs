//! Keystroke debouncing for location search

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::providers::{GeocodingClient, Suggestion};
use crate::Result;

/// Runs only the last job scheduled within the delay window.
/// Scheduling again aborts the pending job outright.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        }));
    }

    /// Drop the pending job, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Results of one debounced search
#[derive(Debug)]
pub struct SearchResults {
    pub query: String,
    pub suggestions: Result<Vec<Suggestion>>,
}

/// Search box input handling: short input clears, longer input searches
/// once the typing pauses
pub struct SearchInput {
    geocoding: Arc<GeocodingClient>,
    debouncer: Debouncer,
    results: mpsc::UnboundedSender<SearchResults>,
}

impl SearchInput {
    pub fn new(
        geocoding: Arc<GeocodingClient>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchResults>) {
        let (results, receiver) = mpsc::unbounded_channel();
        let input = Self {
            geocoding,
            debouncer: Debouncer::new(delay),
            results,
        };
        (input, receiver)
    }

    /// Feed the current contents of the search box
    pub fn input(&mut self, text: &str) {
        if !self.geocoding.accepts(text) {
            debug!("Search input too short, cancelling pending search");
            self.debouncer.cancel();
            return;
        }

        let query = text.trim().to_string();
        let geocoding = self.geocoding.clone();
        let results = self.results.clone();
        self.debouncer.schedule(async move {
            let suggestions = geocoding.search(&query).await;
            // receiver gone means nobody is listening anymore
            let _ = results.send(SearchResults { query, suggestions });
        });
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }
}
