use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::base::{CrawlerError, ErrorKind, Item};

/// A processing stage run over every [`Item`] the item pipeline accepts
/// (§4.7 `ItemPipeline`). Returns the (possibly transformed) item alongside
/// an optional error; a `Some` item replaces the input for the next stage,
/// `None` means the current item carries forward unchanged.
pub type ProcessItem = dyn Fn(Item) -> (Option<Item>, Option<String>) + Send + Sync;

/// Threads an accepted [`Item`] through a frozen chain of [`ProcessItem`]
/// stages, tracking throughput counters and an in-flight gauge (§4.7).
///
/// `sent >= accepted >= processed` holds at every observation point: `sent`
/// increments before the `None` check, `accepted` only after it passes,
/// `processed` unconditionally on every exit path (including a panicking
/// processor, guarded by a decrement-on-drop guard around
/// `processing_number`).
pub struct ItemPipeline {
    processors: Vec<Arc<ProcessItem>>,
    fail_fast: AtomicBool,
    sent: AtomicU64,
    accepted: AtomicU64,
    processed: AtomicU64,
    processing_number: AtomicU64,
}

struct InFlightGuard<'a>(&'a AtomicU64);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ItemPipeline {
    #[must_use]
    pub fn new(processors: Vec<Arc<ProcessItem>>, fail_fast: bool) -> Self {
        Self {
            processors,
            fail_fast: AtomicBool::new(fail_fast),
            sent: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            processing_number: AtomicU64::new(0),
        }
    }

    /// Runs `item` (if present) through every processor in order.
    ///
    /// `None` is rejected immediately as a single [`CrawlerError`] without
    /// entering the processor chain. When `fail_fast` is set, the first
    /// processor error stops the chain; otherwise every processor runs and
    /// every error it raises is collected.
    pub fn send(&self, item: Option<Item>) -> Vec<CrawlerError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        self.processing_number.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.processing_number);

        let Some(item) = item else {
            self.processed.fetch_add(1, Ordering::SeqCst);
            return vec![CrawlerError::new(ErrorKind::ItemProcessor, "item pipeline received no item")];
        };

        self.accepted.fetch_add(1, Ordering::SeqCst);

        let mut errors = Vec::new();
        let mut current = item;
        for processor in &self.processors {
            let (replacement, error) = processor(current.clone());
            if let Some(next) = replacement {
                current = next;
            }
            if let Some(message) = error {
                errors.push(CrawlerError::new(ErrorKind::ItemProcessor, message));
                if self.fail_fast.load(Ordering::SeqCst) {
                    break;
                }
            }
        }

        self.processed.fetch_add(1, Ordering::SeqCst);
        errors
    }

    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn processing_number(&self) -> u64 {
        self.processing_number.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn fail_fast(&self) -> bool {
        self.fail_fast.load(Ordering::SeqCst)
    }

    /// Overrides `fail_fast` after construction. The scheduler forces this
    /// to `true` for every live crawl run (§4.8.1).
    pub fn set_fail_fast(&self, fail_fast: bool) {
        self.fail_fast.store(fail_fast, Ordering::SeqCst);
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "sent: {}, accepted: {}, processed: {}, processing: {}",
            self.sent(),
            self.accepted(),
            self.processed(),
            self.processing_number()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn none_item_is_rejected_without_entering_processors() {
        let pipeline = ItemPipeline::new(vec![], false);
        let errors = pipeline.send(None);
        assert_eq!(errors.len(), 1);
        assert_eq!(pipeline.sent(), 1);
        assert_eq!(pipeline.accepted(), 0);
        assert_eq!(pipeline.processed(), 1);
        assert_eq!(pipeline.processing_number(), 0);
    }

    #[test]
    fn accepted_item_runs_all_processors_when_not_fail_fast() {
        let failing: Arc<ProcessItem> = Arc::new(|item: Item| (Some(item), Some("bad".to_string())));
        let ok: Arc<ProcessItem> = Arc::new(|item: Item| (Some(item), None));
        let pipeline = ItemPipeline::new(vec![failing.clone(), ok, failing], false);

        let errors = pipeline.send(Some(Item::new()));
        assert_eq!(errors.len(), 2);
        assert_eq!(pipeline.sent(), 1);
        assert_eq!(pipeline.accepted(), 1);
        assert_eq!(pipeline.processed(), 1);
    }

    #[test]
    fn fail_fast_stops_after_first_processor_error() {
        let failing: Arc<ProcessItem> = Arc::new(|item: Item| (Some(item), Some("bad".to_string())));
        let ok: Arc<ProcessItem> = Arc::new(|item: Item| (Some(item), None));
        let pipeline = ItemPipeline::new(vec![failing, ok], true);

        let errors = pipeline.send(Some(Item::new()));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn processing_number_is_decremented_even_when_a_processor_panics() {
        let panics: Arc<ProcessItem> = Arc::new(|_item: Item| panic!("boom"));
        let pipeline = ItemPipeline::new(vec![panics], false);

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| pipeline.send(Some(Item::new()))));
        assert!(result.is_err());
        assert_eq!(pipeline.processing_number(), 0);
    }

    #[test]
    fn a_processor_returned_item_replaces_input_for_the_next_stage() {
        let seen_by_second: Arc<std::sync::Mutex<Option<Item>>> = Arc::new(std::sync::Mutex::new(None));
        let transform: Arc<ProcessItem> = Arc::new(|mut item: Item| {
            item.insert("stage", "first");
            (Some(item), None)
        });
        let capture = seen_by_second.clone();
        let observe: Arc<ProcessItem> = Arc::new(move |item: Item| {
            *capture.lock().unwrap() = Some(item.clone());
            (None, None)
        });

        let mut original = Item::new();
        original.insert("stage", "original");

        let pipeline = ItemPipeline::new(vec![transform, observe], false);
        let errors = pipeline.send(Some(original));
        assert!(errors.is_empty());

        let seen = seen_by_second.lock().unwrap().clone().unwrap();
        assert_eq!(seen.get("stage"), Some(&serde_json::Value::from("first")));
    }
}
