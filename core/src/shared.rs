use crate::engine::{Assignment, Engine, EngineSummary};
use crate::error::Result;
use crate::tokenizer::TokenBag;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle for feeding one engine from several threads.
///
/// Tokenizing happens outside the lock; scoring, assignment and indexing of a
/// document run under it, so two documents never interleave.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self { inner: Arc::new(Mutex::new(engine)) }
    }

    pub fn process(&self, line: &str) -> Result<Option<Assignment>> {
        let bag = TokenBag::from_text(line);
        self.inner.lock().process_bag(&bag)
    }

    pub fn summary(&self) -> EngineSummary { self.inner.lock().summary() }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::thread;

    #[test]
    fn concurrent_feeds_see_every_document() {
        let shared = SharedEngine::new(Engine::new(EngineConfig::default()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        shared.process(&format!("thread{t} item{i} shared words")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let summary = shared.summary();
        assert_eq!(summary.documents, 100);
        let sizes: u64 = shared.with(|e| e.store().iter().map(|c| c.size()).sum());
        assert_eq!(sizes, 100);
    }
}
