use std::collections::VecDeque;
use std::sync::Mutex;

use crate::base::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running,
    Closed,
}

/// A bounded-in-memory FIFO of pending requests (§4.4 `RequestCache`).
///
/// `capacity()` reports the underlying buffer's allocated capacity but
/// nothing is enforced — growth is unbounded, a known latent property of the
/// reference implementation preserved deliberately (`SPEC_FULL.md` §9).
#[derive(Debug)]
pub struct RequestCache {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    queue: VecDeque<Request>,
    status: Status,
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                status: Status::Running,
            }),
        }
    }

    /// Appends `req`. Returns `false` if the cache is closed.
    pub fn put(&self, req: Request) -> bool {
        let mut inner = self.inner.lock().expect("request cache mutex poisoned");
        if inner.status == Status::Closed {
            return false;
        }
        inner.queue.push_back(req);
        true
    }

    /// Pops the oldest pending request, or `None` if empty or closed.
    pub fn get(&self) -> Option<Request> {
        let mut inner = self.inner.lock().expect("request cache mutex poisoned");
        if inner.status == Status::Closed {
            return None;
        }
        inner.queue.pop_front()
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.inner.lock().expect("request cache mutex poisoned").queue.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().expect("request cache mutex poisoned").queue.capacity()
    }

    /// Idempotent.
    pub fn close(&self) {
        self.inner.lock().expect("request cache mutex poisoned").status = Status::Closed;
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let inner = self.inner.lock().expect("request cache mutex poisoned");
        let status = match inner.status {
            Status::Running => "running",
            Status::Closed => "closed",
        };
        format!("status: {status}, length: {}, capacity: {}", inner.queue.len(), inner.queue.capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn req(depth: u32) -> Request {
        Request::new(Url::parse("http://example.com").unwrap(), depth)
    }

    #[test]
    fn fifo_round_trips_a_single_request() {
        let cache = RequestCache::new();
        assert!(cache.put(req(0)));
        let popped = cache.get().unwrap();
        assert_eq!(popped.depth(), 0);
        assert!(cache.get().is_none());
    }

    #[test]
    fn fifo_preserved_across_mixed_puts() {
        let cache = RequestCache::new();
        cache.put(req(0));
        cache.put(req(1));
        assert_eq!(cache.get().unwrap().depth(), 0);
        cache.put(req(2));
        assert_eq!(cache.get().unwrap().depth(), 1);
        assert_eq!(cache.get().unwrap().depth(), 2);
        assert!(cache.get().is_none());
    }

    #[test]
    fn closed_cache_rejects_put_and_get() {
        let cache = RequestCache::new();
        cache.put(req(0));
        cache.close();
        assert!(!cache.put(req(1)));
        assert!(cache.get().is_none());
        cache.close();
    }
}
