use std::sync::atomic::{AtomicU32, Ordering};

/// A monotonic id generator, one instance per pool-backed component family
/// (downloaders, analyzers), replacing the reference implementation's
/// process-wide global counters (see `SPEC_FULL.md` §9 REDESIGN FLAGS).
#[derive(Debug, Default)]
pub struct IdGenerator(AtomicU32);

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_unique() {
        let gen = IdGenerator::new();
        let ids: Vec<u32> = (0..100).map(|_| gen.next()).collect();
        for window in ids.windows(2) {
            assert!(window[0] < window[1]);
        }
    }
}
