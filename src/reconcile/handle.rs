use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use tokio::sync::watch;

use crate::{
    collectors::{CollectorUpdate, MetricSink},
    error::VitalsError,
    models::{InboundMessage, Metric},
};

use super::engine::{ApplyOutcome, EngineSnapshot, ReconciliationEngine};

/// Shared owner of the engine. Every mutation recomputes and publishes the
/// snapshot inside the same critical section, so subscribers never observe a
/// value without its combination flags.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Mutex<ReconciliationEngine>>,
    publisher: Arc<watch::Sender<EngineSnapshot>>,
}

impl EngineHandle {
    pub fn new(engine: ReconciliationEngine) -> Self {
        let (publisher, _) = watch::channel(engine.snapshot());
        Self {
            inner: Arc::new(Mutex::new(engine)),
            publisher: Arc::new(publisher),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.publisher.borrow().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ReconciliationEngine> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut ReconciliationEngine) -> T) -> T {
        let mut engine = self.lock();
        let result = f(&mut engine);
        self.publisher.send_replace(engine.snapshot());
        result
    }

    pub fn set_local(&self, metric: Metric, value: Option<f64>) {
        self.mutate(|engine| engine.set_local(metric, value));
    }

    pub fn set_field(&self, metric: Metric, value: Option<f64>) {
        self.mutate(|engine| engine.set_field(metric, value));
    }

    pub fn set_lab(&self, metric: Metric, value: Option<f64>) -> Result<(), VitalsError> {
        self.mutate(|engine| engine.set_lab(metric, value))
    }

    pub fn apply(&self, message: &InboundMessage) -> Result<ApplyOutcome, VitalsError> {
        self.mutate(|engine| engine.apply(message))
    }

    pub fn reset_for_page(&self, url: &str) {
        self.mutate(|engine| engine.reset_for_page(url));
    }

    pub fn page_url(&self) -> Option<String> {
        self.lock().page_url().map(str::to_string)
    }
}

impl MetricSink for EngineHandle {
    fn emit(&self, update: CollectorUpdate) {
        if let Err(err) = self.apply(&update.to_inbound()) {
            warn!("collector update for {} rejected: {}", update.metric(), err);
        }
    }
}
