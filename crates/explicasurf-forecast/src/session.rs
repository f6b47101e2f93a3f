//! Selection session: which forecast is on screen.
//!
//! Every selection change takes a new generation. A completed load only
//! replaces the displayed view when it still carries the current generation,
//! so a slow response for an old selection can never overwrite a newer one.
//! Abandoned loads still run to completion and may fill the cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::ForecastCache;
use crate::client::ForecastClient;
use crate::error::ForecastError;
use crate::types::{ExplainResponse, ForecastView, Selection, SurferProfile};

/// Handle for one selection change; pass it back to [`ForecastSession::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    selection: Selection,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The view is now displayed
    Applied(Arc<ForecastView>),
    /// A newer selection was made meanwhile; nothing changed
    Stale,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

#[derive(Debug, Default)]
struct DisplayState {
    selection: Option<Selection>,
    view: Option<Arc<ForecastView>>,
    loading: bool,
    error: Option<String>,
}

pub struct ForecastSession {
    client: ForecastClient,
    cache: Arc<ForecastCache<Arc<ExplainResponse>>>,
    generation: AtomicU64,
    state: Mutex<DisplayState>,
}

impl ForecastSession {
    pub fn new(client: ForecastClient, cache: Arc<ForecastCache<Arc<ExplainResponse>>>) -> Self {
        Self {
            client,
            cache,
            generation: AtomicU64::new(0),
            state: Mutex::new(DisplayState::default()),
        }
    }

    /// Record a new selection. The session is marked as loading only when
    /// the cache has nothing fresh for it.
    pub fn select(&self, selection: Selection) -> Ticket {
        let cached = self.cache.get(&selection.cache_key()).is_some();

        let mut state = self.state.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.selection = Some(selection);
        state.loading = !cached;
        state.error = None;
        tracing::debug!("Selected {} (generation {})", selection.cache_key(), generation);

        Ticket {
            generation,
            selection,
        }
    }

    /// Fetch (through the cache) and reconcile the forecast for `ticket`.
    ///
    /// # Errors
    ///
    /// The fetch error when `ticket` is still current. Errors for stale
    /// tickets are dropped and reported as [`LoadOutcome::Stale`].
    pub async fn load(&self, ticket: Ticket) -> Result<LoadOutcome, ForecastError> {
        let client = &self.client;
        let selection = ticket.selection;

        let result = self
            .cache
            .get_or_fetch(&selection, move || async move {
                client.fetch_explain(&selection).await.map(Arc::new)
            })
            .await
            .map(|response| Arc::new(ForecastView::from_response(&response)));

        self.complete(ticket, result)
    }

    /// Select and load in one step.
    pub async fn request(&self, selection: Selection) -> Result<LoadOutcome, ForecastError> {
        let ticket = self.select(selection);
        self.load(ticket).await
    }

    /// Apply a finished load if `ticket` is still the latest selection.
    pub fn complete(
        &self,
        ticket: Ticket,
        result: Result<Arc<ForecastView>, ForecastError>,
    ) -> Result<LoadOutcome, ForecastError> {
        let mut state = self.state.lock();

        if ticket.generation != self.generation.load(Ordering::SeqCst) {
            tracing::debug!(
                "Discarding stale completion for {} (generation {})",
                ticket.selection.cache_key(),
                ticket.generation
            );
            return Ok(LoadOutcome::Stale);
        }

        state.loading = false;
        match result {
            Ok(view) => {
                tracing::info!("Displaying forecast {}", ticket.selection.cache_key());
                state.view = Some(Arc::clone(&view));
                state.error = None;
                Ok(LoadOutcome::Applied(view))
            }
            Err(e) => {
                tracing::warn!("Forecast load failed: {}", e);
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// AI explanation for the current selection. Not cached.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` when nothing is selected, otherwise the fetch error.
    pub async fn explain(&self, profile: &SurferProfile) -> Result<Option<String>, ForecastError> {
        let selection = self
            .current_selection()
            .ok_or_else(|| ForecastError::InvalidSelection("nothing selected".to_string()))?;

        let response = self.client.explain(&selection, profile).await?;
        Ok(response.explanation_pt)
    }

    pub fn current_view(&self) -> Option<Arc<ForecastView>> {
        self.state.lock().view.clone()
    }

    pub fn current_selection(&self) -> Option<Selection> {
        self.state.lock().selection
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// User-facing message of the last failed load, if the latest one failed.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn cache(&self) -> &Arc<ForecastCache<Arc<ExplainResponse>>> {
        &self.cache
    }

    pub fn client(&self) -> &ForecastClient {
        &self.client
    }
}
