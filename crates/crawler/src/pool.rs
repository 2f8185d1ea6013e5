use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("the pool has no free entities")]
    Empty,

    #[error("the pool is already at capacity, cannot accept a return")]
    Full,
}

/// A fixed-capacity, compile-time-typed free-list of entities (§4.1 `Pool`).
///
/// Replaces the reference implementation's `reflect.Type` runtime check with
/// a generic `Pool<T>` — a mismatched `give_back` is a compile error instead
/// of a `WrongType` runtime failure (see `SPEC_FULL.md` §9 REDESIGN FLAGS).
///
/// `take`/`give_back` never block; a caller that finds the pool empty or full
/// must handle it, which is how backpressure climbs from pool exhaustion up
/// into the scheduler's channel writes.
pub struct Pool<T> {
    free: Mutex<Vec<T>>,
    total: usize,
}

impl<T> Pool<T> {
    /// Eagerly builds `capacity` entities with `factory`.
    pub fn new(capacity: usize, factory: impl Fn() -> T) -> Self {
        let free = (0..capacity).map(|_| factory()).collect();
        Self {
            free: Mutex::new(free),
            total: capacity,
        }
    }

    /// # Errors
    ///
    /// Returns [`PoolError::Empty`] if no entity is currently free.
    pub fn take(&self) -> Result<T, PoolError> {
        let mut free = self.free.lock().expect("pool mutex poisoned");
        free.pop().ok_or(PoolError::Empty)
    }

    /// # Errors
    ///
    /// Returns [`PoolError::Full`] if every slot is already occupied (which
    /// can only happen if `entity` did not actually come from this pool).
    pub fn give_back(&self, entity: T) -> Result<(), PoolError> {
        let mut free = self.free.lock().expect("pool mutex poisoned");
        if free.len() >= self.total {
            return Err(PoolError::Full);
        }
        free.push(entity);
        Ok(())
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn used(&self) -> usize {
        let free = self.free.lock().expect("pool mutex poisoned");
        self.total - free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn take_and_give_back_track_used_count() {
        let pool = Pool::new(3, || 0u32);
        assert_eq!(pool.used(), 0);

        let a = pool.take().unwrap();
        let b = pool.take().unwrap();
        assert_eq!(pool.used(), 2);

        pool.give_back(a).unwrap();
        assert_eq!(pool.used(), 1);
        pool.give_back(b).unwrap();
        assert_eq!(pool.used(), 0);
    }

    #[test]
    fn take_fails_when_empty() {
        let pool = Pool::new(1, || 0u32);
        let _entity = pool.take().unwrap();
        assert_eq!(pool.take(), Err(PoolError::Empty));
    }

    #[test]
    fn give_back_fails_when_full() {
        let pool = Pool::new(1, || 0u32);
        assert_eq!(pool.give_back(42u32), Err(PoolError::Full));
    }

    #[test]
    fn concurrent_takes_never_exceed_capacity() {
        let pool = Arc::new(Pool::new(3, || 0u32));
        let handles: Vec<_> = (0..5)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || pool.take())
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let failures = results.iter().filter(|r| r.is_err()).count();

        assert_eq!(successes, 3);
        assert_eq!(failures, 2);
        assert_eq!(pool.used(), 3);

        for entity in results.into_iter().flatten() {
            pool.give_back(entity).unwrap();
        }
        assert_eq!(pool.used(), 0);
    }
}
