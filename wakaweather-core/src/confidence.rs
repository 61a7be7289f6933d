//! View-model behind the confidence dashboard.
//!
//! One GET per [`ConfidenceLoader::load`] call, no internal retries. State is
//! published on a `watch` channel so any number of views can follow it.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    backend::ConfidenceSource,
    model::{ConfidencePayload, ConfidenceQuery},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfidenceState {
    /// Last successful payload. Survives failed and in-flight reloads.
    pub data: Option<ConfidencePayload>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// What a view should show for a given state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfidencePhase<'a> {
    Idle,
    Loading,
    Failed(&'a str),
    Ready(&'a ConfidencePayload),
}

impl ConfidenceState {
    pub fn phase(&self) -> ConfidencePhase<'_> {
        if self.is_loading {
            ConfidencePhase::Loading
        } else if let Some(error) = &self.error {
            ConfidencePhase::Failed(error)
        } else if let Some(data) = &self.data {
            ConfidencePhase::Ready(data)
        } else {
            ConfidencePhase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// Another load was still running; nothing was done.
    Busy,
}

#[derive(Debug)]
pub struct ConfidenceLoader<S> {
    source: S,
    query: ConfidenceQuery,
    state: watch::Sender<ConfidenceState>,
}

impl<S: ConfidenceSource> ConfidenceLoader<S> {
    pub fn new(source: S, query: ConfidenceQuery) -> Self {
        let (state, _) = watch::channel(ConfidenceState::default());
        Self {
            source,
            query,
            state,
        }
    }

    pub fn query(&self) -> &ConfidenceQuery {
        &self.query
    }

    /// Used by later loads; current data stays until the next success.
    pub fn set_query(&mut self, query: ConfidenceQuery) {
        self.query = query;
    }

    pub fn subscribe(&self) -> watch::Receiver<ConfidenceState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ConfidenceState {
        self.state.borrow().clone()
    }

    pub async fn load(&self) -> LoadOutcome {
        let started = self.state.send_if_modified(|state| {
            if state.is_loading {
                return false;
            }
            state.is_loading = true;
            state.error = None;
            true
        });
        if !started {
            debug!("confidence load already in flight, ignoring");
            return LoadOutcome::Busy;
        }

        let in_flight = InFlight {
            state: &self.state,
            finished: false,
        };

        match self.source.fetch_confidence(&self.query).await {
            Ok(payload) => {
                debug!(city = %payload.city, confidence = payload.confidence, "confidence loaded");
                in_flight.finish(|state| {
                    state.data = Some(payload);
                    state.error = None;
                });
                LoadOutcome::Loaded
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "confidence load failed");
                let message = err.to_string();
                in_flight.finish(|state| state.error = Some(message));
                LoadOutcome::Failed
            }
        }
    }
}

/// Clears `is_loading` even if the `load` future is dropped mid-request.
struct InFlight<'a> {
    state: &'a watch::Sender<ConfidenceState>,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self, apply: impl FnOnce(&mut ConfidenceState)) {
        self.state.send_modify(|state| {
            apply(state);
            state.is_loading = false;
        });
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.send_modify(|state| state.is_loading = false);
        }
    }
}
