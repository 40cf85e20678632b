//! Event notification bus.
//!
//! A set of independent binary flags shared between the callback context and
//! the tasks blocked in the manager. Flags can be set and cleared from any
//! thread; [`EventBus::wait`] blocks until any or all of a mask is asserted
//! or a timeout elapses.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::time::{Duration, Instant};

/// Named event bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventFlags(u32);

impl EventFlags {
    pub const NONE: Self = Self(0);
    pub const CONNECT_SUCCEEDED: Self = Self(1 << 0);
    pub const CONNECT_FAILED: Self = Self(1 << 1);
    pub const DISCONNECTED: Self = Self(1 << 2);
    pub const SCAN_COMPLETE: Self = Self(1 << 3);
    pub const AP_STARTED: Self = Self(1 << 4);
    pub const AP_START_FAILED: Self = Self(1 << 5);
    pub const AP_STOPPED: Self = Self(1 << 6);

    const NAMES: [(Self, &'static str); 7] = [
        (Self::CONNECT_SUCCEEDED, "CONNECT_SUCCEEDED"),
        (Self::CONNECT_FAILED, "CONNECT_FAILED"),
        (Self::DISCONNECTED, "DISCONNECTED"),
        (Self::SCAN_COMPLETE, "SCAN_COMPLETE"),
        (Self::AP_STARTED, "AP_STARTED"),
        (Self::AP_START_FAILED, "AP_START_FAILED"),
        (Self::AP_STOPPED, "AP_STOPPED"),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for EventFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for EventFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for EventFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "EventFlags(NONE)");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "EventFlags({})", names.join(" | "))
    }
}

/// Wait condition for [`EventBus::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitFor {
    /// Any bit of the mask.
    Any,
    /// Every bit of the mask.
    All,
}

/// Shared flag set with a blocking wait primitive.
#[derive(Default)]
pub struct EventBus {
    flags: Mutex<EventFlags>,
    changed: Condvar,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert `flags` and wake every waiter. Returns the resulting flag set.
    pub fn set(&self, flags: EventFlags) -> EventFlags {
        let mut current = self.flags.lock();
        *current |= flags;
        self.changed.notify_all();
        *current
    }

    /// Clear `flags`. Returns the flag set as it was before clearing.
    pub fn clear(&self, flags: EventFlags) -> EventFlags {
        let mut current = self.flags.lock();
        let before = *current;
        *current = before.difference(flags);
        before
    }

    pub fn get(&self) -> EventFlags {
        *self.flags.lock()
    }

    /// Block until the condition on `mask` holds or `timeout` elapses.
    ///
    /// Returns the flag set observed when the wait ended, before any
    /// clearing. With `clear_on_exit`, the bits of `mask` are cleared if the
    /// condition was met. Callers decide success by inspecting the result.
    pub fn wait(
        &self,
        mask: EventFlags,
        wait_for: WaitFor,
        clear_on_exit: bool,
        timeout: Duration,
    ) -> EventFlags {
        let deadline = Instant::now() + timeout;
        let mut current = self.flags.lock();
        let mut timed_out = false;

        loop {
            let satisfied = match wait_for {
                WaitFor::Any => current.intersects(mask),
                WaitFor::All => current.contains(mask),
            };
            if satisfied {
                let observed = *current;
                if clear_on_exit {
                    *current = observed.difference(mask);
                }
                return observed;
            }
            if timed_out {
                return *current;
            }
            timed_out = self.changed.wait_until(&mut current, deadline).timed_out();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_and_clear() {
        let bus = EventBus::new();
        bus.set(EventFlags::CONNECT_SUCCEEDED | EventFlags::SCAN_COMPLETE);
        assert!(bus.get().contains(EventFlags::CONNECT_SUCCEEDED));

        let before = bus.clear(EventFlags::SCAN_COMPLETE);
        assert!(before.contains(EventFlags::SCAN_COMPLETE));
        assert_eq!(bus.get(), EventFlags::CONNECT_SUCCEEDED);
    }

    #[test]
    fn test_wait_already_set_returns_immediately() {
        let bus = EventBus::new();
        bus.set(EventFlags::AP_STARTED);
        let observed = bus.wait(
            EventFlags::AP_STARTED | EventFlags::AP_START_FAILED,
            WaitFor::Any,
            false,
            Duration::from_secs(5),
        );
        assert!(observed.contains(EventFlags::AP_STARTED));
        // Not cleared
        assert!(bus.get().contains(EventFlags::AP_STARTED));
    }

    #[test]
    fn test_wait_clear_on_exit() {
        let bus = EventBus::new();
        bus.set(EventFlags::DISCONNECTED | EventFlags::AP_STARTED);
        let observed = bus.wait(
            EventFlags::DISCONNECTED,
            WaitFor::All,
            true,
            Duration::from_millis(10),
        );
        assert!(observed.contains(EventFlags::DISCONNECTED));
        assert_eq!(bus.get(), EventFlags::AP_STARTED);
    }

    #[test]
    fn test_wait_times_out() {
        let bus = EventBus::new();
        let start = Instant::now();
        let observed = bus.wait(
            EventFlags::SCAN_COMPLETE,
            WaitFor::Any,
            true,
            Duration::from_millis(30),
        );
        assert!(!observed.contains(EventFlags::SCAN_COMPLETE));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_all_needs_every_bit() {
        let bus = EventBus::new();
        bus.set(EventFlags::CONNECT_SUCCEEDED);
        let observed = bus.wait(
            EventFlags::CONNECT_SUCCEEDED | EventFlags::AP_STARTED,
            WaitFor::All,
            true,
            Duration::from_millis(20),
        );
        assert!(!observed.contains(EventFlags::AP_STARTED));
        // Unsatisfied wait leaves flags untouched
        assert_eq!(bus.get(), EventFlags::CONNECT_SUCCEEDED);
    }

    #[test]
    fn test_wait_woken_from_other_thread() {
        let bus = Arc::new(EventBus::new());
        let setter = {
            let bus = bus.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                bus.set(EventFlags::CONNECT_FAILED);
            })
        };

        let observed = bus.wait(
            EventFlags::CONNECT_SUCCEEDED | EventFlags::CONNECT_FAILED,
            WaitFor::Any,
            false,
            Duration::from_secs(5),
        );
        setter.join().unwrap();
        assert!(observed.contains(EventFlags::CONNECT_FAILED));
        assert!(!observed.contains(EventFlags::CONNECT_SUCCEEDED));
    }

    #[test]
    fn test_debug_names() {
        let flags = EventFlags::CONNECT_SUCCEEDED | EventFlags::AP_STOPPED;
        assert_eq!(
            format!("{:?}", flags),
            "EventFlags(CONNECT_SUCCEEDED | AP_STOPPED)"
        );
        assert_eq!(format!("{:?}", EventFlags::NONE), "EventFlags(NONE)");
    }
}
