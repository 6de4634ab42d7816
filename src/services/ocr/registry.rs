use super::engine::{EngineFactory, OcrEngine};
use crate::error::Result;
use crate::models::language::LanguageSet;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Engine shared by every caller using the same language set.
/// The mutex serializes recognition calls on the instance.
pub type SharedEngine = Arc<Mutex<Box<dyn OcrEngine>>>;

type Slot = Arc<Mutex<Option<SharedEngine>>>;

/// Lazily-populated cache of OCR engines keyed by language set.
///
/// At most one engine is created per key, even when several threads ask for
/// the same key at once: the per-key slot stays locked while the factory
/// runs. Keys never wait on each other's initialization. A failed creation
/// leaves the slot empty so the next call retries.
pub struct EngineRegistry {
    factory: Box<dyn EngineFactory>,
    slots: Mutex<HashMap<LanguageSet, Slot>>,
}

impl EngineRegistry {
    pub fn new(factory: impl EngineFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the engine for `languages`, creating it on first use
    pub fn get(&self, languages: &LanguageSet) -> Result<SharedEngine> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(languages.clone()).or_default())
        };

        let mut slot = slot.lock();
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        tracing::info!(languages = %languages, "Initializing OCR engine");
        let engine: SharedEngine = Arc::new(Mutex::new(self.factory.create(languages)?));
        *slot = Some(Arc::clone(&engine));

        Ok(engine)
    }

    /// Number of engines created so far
    pub fn initialized(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }
}
