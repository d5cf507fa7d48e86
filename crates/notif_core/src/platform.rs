use std::sync::Arc;

use crate::payload::Payload;
use crate::store::{MemoryStore, StoreError};

/// Renders payloads to the user. Platform adapters implement this trait.
pub trait Presenter: Send + Sync {
    fn notify(&self, id: i32, payload: &Payload);
    fn dismiss(&self, id: i32);
}

/// Alarms registered for future triggers, addressed by identifier.
pub trait AlarmScheduler: Send + Sync {
    fn cancel(&self, identifier: &str);
}

/// Namespaced key-value storage that survives process restarts.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, namespace: &str, key: &str) -> Result<(), StoreError>;
    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn notify(&self, id: i32, _payload: &Payload) {
        tracing::debug!(id, "no presenter configured, dropping payload");
    }

    fn dismiss(&self, _id: i32) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAlarms;

impl AlarmScheduler for NoopAlarms {
    fn cancel(&self, _identifier: &str) {}
}

/// Shared handle to the platform services. Cloning is cheap.
#[derive(Clone)]
pub struct Context {
    presenter: Arc<dyn Presenter>,
    alarms: Arc<dyn AlarmScheduler>,
    store: Arc<dyn PreferenceStore>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    pub fn alarms(&self) -> &dyn AlarmScheduler {
        self.alarms.as_ref()
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    presenter: Option<Arc<dyn Presenter>>,
    alarms: Option<Arc<dyn AlarmScheduler>>,
    store: Option<Arc<dyn PreferenceStore>>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn with_alarms(mut self, alarms: Arc<dyn AlarmScheduler>) -> Self {
        self.alarms = Some(alarms);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Context {
        Context {
            presenter: self.presenter.unwrap_or_else(|| Arc::new(NoopPresenter)),
            alarms: self.alarms.unwrap_or_else(|| Arc::new(NoopAlarms)),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
        }
    }
}
