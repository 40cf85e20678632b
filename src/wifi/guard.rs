//! Mutual exclusion guard for wireless control operations.
//!
//! The guard is a reentrant lock with bounded-wait acquisition. It does not
//! exist until the radio is first powered on; acquiring it before that
//! reports [`WifiError::LockUnavailable`]. Release happens when the returned
//! token is dropped, so every exit path of a caller releases it.

use super::error::WifiError;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::sync::OnceLock;
use std::time::Duration;

/// Lazily created reentrant lock.
pub struct Guard {
    lock: OnceLock<ReentrantMutex<()>>,
    wait: Duration,
}

/// Proof that the current thread holds the guard.
///
/// The guard is released when the last token of the thread is dropped.
#[must_use = "dropping the token releases the guard immediately"]
pub struct GuardToken<'a> {
    _held: ReentrantMutexGuard<'a, ()>,
}

impl Guard {
    /// Create an absent guard whose acquisitions wait at most `wait`.
    pub fn new(wait: Duration) -> Self {
        Self {
            lock: OnceLock::new(),
            wait,
        }
    }

    /// Create the lock if it does not exist yet.
    ///
    /// Returns `true` if this call created it.
    pub fn create(&self) -> bool {
        let mut created = false;
        self.lock.get_or_init(|| {
            created = true;
            ReentrantMutex::new(())
        });
        created
    }

    pub fn exists(&self) -> bool {
        self.lock.get().is_some()
    }

    /// Acquire with the configured bound.
    pub fn acquire(&self) -> Result<GuardToken<'_>, WifiError> {
        self.acquire_for(self.wait)
    }

    /// Acquire, waiting at most `wait`.
    pub fn acquire_for(&self, wait: Duration) -> Result<GuardToken<'_>, WifiError> {
        let lock = self.lock.get().ok_or(WifiError::LockUnavailable)?;
        lock.try_lock_for(wait)
            .map(|held| GuardToken { _held: held })
            .ok_or(WifiError::LockTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_unavailable_before_create() {
        let guard = Guard::new(Duration::from_millis(10));
        assert!(!guard.exists());
        assert!(matches!(guard.acquire(), Err(WifiError::LockUnavailable)));
    }

    #[test]
    fn test_create_is_idempotent() {
        let guard = Guard::new(Duration::from_millis(10));
        assert!(guard.create());
        assert!(!guard.create());
        assert!(guard.exists());
    }

    #[test]
    fn test_reentrant_acquire() {
        let guard = Guard::new(Duration::from_millis(10));
        guard.create();

        let outer = guard.acquire().unwrap();
        let inner = guard.acquire().unwrap();
        drop(inner);
        drop(outer);
        assert!(guard.acquire().is_ok());
    }

    #[test]
    fn test_other_thread_times_out() {
        let guard = Arc::new(Guard::new(Duration::from_millis(20)));
        guard.create();
        let (held_tx, held_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let holder = {
            let guard = guard.clone();
            thread::spawn(move || {
                let _token = guard.acquire().unwrap();
                held_tx.send(()).unwrap();
                // Hold until the main thread has observed the timeout
                let _ = done_rx.recv();
            })
        };

        held_rx.recv().unwrap();
        assert!(matches!(guard.acquire(), Err(WifiError::LockTimeout)));
        done_tx.send(()).unwrap();
        holder.join().unwrap();

        // Released once the holder exits
        assert!(guard.acquire().is_ok());
    }

    #[test]
    fn test_nested_release_counts() {
        let guard = Arc::new(Guard::new(Duration::from_millis(20)));
        guard.create();

        let outer = guard.acquire().unwrap();
        let inner = guard.acquire().unwrap();
        drop(inner);

        // Still held once by this thread
        let contender = {
            let guard = guard.clone();
            thread::spawn(move || guard.acquire().is_ok())
        };
        assert!(!contender.join().unwrap());

        drop(outer);
        let contender = {
            let guard = guard.clone();
            thread::spawn(move || guard.acquire().is_ok())
        };
        assert!(contender.join().unwrap());
    }
}
