use std::collections::HashMap;
use std::sync::Mutex;

/// A latched broadcast stop flag with per-stage acknowledgement counters
/// (§4.3 `StopSign`).
///
/// Each stage, upon noticing [`StopSign::signed`], calls
/// [`StopSign::deal`] with its own code before exiting; the accumulated
/// counters become an audit trail of which stages acknowledged the stop.
#[derive(Debug, Default)]
pub struct StopSign {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    signed: bool,
    deal_counts: HashMap<String, u32>,
}

impl StopSign {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches the stop flag. Returns `false` if it was already signed.
    pub fn sign(&self) -> bool {
        let mut inner = self.inner.lock().expect("stop sign mutex poisoned");
        if inner.signed {
            return false;
        }
        inner.signed = true;
        true
    }

    #[must_use]
    pub fn signed(&self) -> bool {
        self.inner.lock().expect("stop sign mutex poisoned").signed
    }

    /// Clears the flag and every deal counter.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("stop sign mutex poisoned");
        inner.signed = false;
        inner.deal_counts.clear();
    }

    /// Records that `code` acknowledged the stop signal. A no-op unless the
    /// signal is currently set.
    pub fn deal(&self, code: impl Into<String>) {
        let mut inner = self.inner.lock().expect("stop sign mutex poisoned");
        if !inner.signed {
            return;
        }
        *inner.deal_counts.entry(code.into()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn deal_count(&self, code: &str) -> u32 {
        let inner = self.inner.lock().expect("stop sign mutex poisoned");
        inner.deal_counts.get(code).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn deal_total(&self) -> u32 {
        let inner = self.inner.lock().expect("stop sign mutex poisoned");
        inner.deal_counts.values().sum()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let inner = self.inner.lock().expect("stop sign mutex poisoned");
        format!(
            "dealCountMap:{},signed:{}",
            inner.deal_counts.len(),
            inner.signed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_idempotent_and_observable() {
        let sign = StopSign::new();
        assert!(!sign.signed());
        assert!(sign.sign());
        assert!(sign.signed());
        assert!(!sign.sign());
    }

    #[test]
    fn deal_is_noop_unless_signed() {
        let sign = StopSign::new();
        sign.deal("scheduler");
        assert_eq!(sign.deal_total(), 0);

        sign.sign();
        sign.deal("scheduler");
        sign.deal("scheduler");
        sign.deal("downloader-1");
        assert_eq!(sign.deal_count("scheduler"), 2);
        assert_eq!(sign.deal_count("downloader-1"), 1);
        assert_eq!(sign.deal_total(), 3);
    }

    #[test]
    fn reset_clears_flag_and_counters() {
        let sign = StopSign::new();
        sign.sign();
        sign.deal("scheduler");
        sign.reset();
        assert!(!sign.signed());
        assert_eq!(sign.deal_total(), 0);
    }
}
