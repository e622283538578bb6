//! Model provider abstraction
//!
//! The engine asks a provider for the current bundle instead of holding one
//! itself, so tests and callers can swap in their own source of models.
//! Lifecycle: `Unloaded -> Loaded`, `Loaded -> Stale` on drift, and
//! `Stale -> Loaded` after a refresh.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::ModelBundle;
use crate::store::{LoadOutcome, ModelStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Unloaded,
    Loaded,
    /// The current bundle no longer matches the rows being built
    Stale,
}

pub trait ModelProvider {
    /// Current bundle, loading it on first use (or refreshing a stale one)
    fn bundle(&mut self) -> Result<&ModelBundle>;

    /// Flag the current bundle as out of date
    fn mark_stale(&mut self);

    /// Throw the current bundle away and train a replacement
    fn refresh(&mut self) -> Result<&ModelBundle>;

    fn state(&self) -> ProviderState;

    /// Canonical columns the training source provides, if known. The row
    /// builder only expects canonical columns the source can supply.
    fn source_columns(&mut self) -> Option<Vec<String>>;
}

/// Provider backed by a [`ModelStore`]
#[derive(Debug)]
pub struct StoreProvider {
    store: ModelStore,
    bundle: Option<ModelBundle>,
    state: ProviderState,
    trainings: usize,
    /// Header read cached until the next retrain; `Some(None)` when unreadable
    source_columns: Option<Option<Vec<String>>>,
}

impl StoreProvider {
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            bundle: None,
            state: ProviderState::Unloaded,
            trainings: 0,
            source_columns: None,
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Number of training runs this provider has triggered
    pub fn trainings(&self) -> usize {
        self.trainings
    }

    fn load(&mut self) -> Result<ModelBundle> {
        let (bundle, outcome) = self.store.load_with_outcome()?;
        if outcome == LoadOutcome::Trained {
            self.trainings += 1;
        }
        Ok(bundle)
    }

    fn retrain(&mut self) -> Result<ModelBundle> {
        warn!(path = %self.store.artifact_path().display(), "Retraining stale model");
        self.source_columns = None;
        self.store.discard()?;
        let bundle = self.store.retrain()?;
        self.trainings += 1;
        info!(features = bundle.schema.len(), "Model refreshed");
        Ok(bundle)
    }
}

impl ModelProvider for StoreProvider {
    fn bundle(&mut self) -> Result<&ModelBundle> {
        let bundle = match (self.state, self.bundle.take()) {
            (ProviderState::Loaded, Some(bundle)) => bundle,
            (ProviderState::Stale, _) => self.retrain()?,
            _ => self.load()?,
        };
        self.state = ProviderState::Loaded;
        Ok(self.bundle.insert(bundle))
    }

    fn mark_stale(&mut self) {
        if self.state == ProviderState::Loaded {
            self.state = ProviderState::Stale;
        }
    }

    fn refresh(&mut self) -> Result<&ModelBundle> {
        self.bundle = None;
        let bundle = self.retrain()?;
        self.state = ProviderState::Loaded;
        Ok(self.bundle.insert(bundle))
    }

    fn state(&self) -> ProviderState {
        self.state
    }

    fn source_columns(&mut self) -> Option<Vec<String>> {
        let store = &self.store;
        self.source_columns
            .get_or_insert_with(|| match store.source_columns() {
                Ok(columns) => Some(columns),
                Err(err) => {
                    debug!(error = %err, "Data source unreadable, scoring with bundle columns");
                    None
                }
            })
            .clone()
    }
}
