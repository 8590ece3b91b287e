use std::{
    ops::Deref,
    sync::atomic::{AtomicUsize, Ordering},
};

use crossbeam::utils::Backoff;
use parking_lot::{RwLock, RwLockReadGuard};

const STATE_EMPTY: usize = 0; // Nothing computed (or invalidated), free to compute
const STATE_INVALIDATING: usize = 1; // Value is being dropped (should not compute nor read)
const STATE_COMPUTING: usize = 2; // Value is being computed (should not invalidate nor read)
const STATE_READY: usize = 3; // Value is ready and can be read or invalidated
// Everything above STATE_READY counts readers, which prevents invalidation

/// Read access to the value of a [`LazySlot`].
///
/// While the guard lives the slot cannot be invalidated.
pub struct SlotGuard<'a, T> {
    guard: RwLockReadGuard<'a, Option<T>>,
    state: &'a AtomicUsize,
}

impl<'a, T> Deref for SlotGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.guard.as_ref() {
            Some(value) => value,
            None => unreachable!("slot guard is only handed out for ready slots"),
        }
    }
}

impl<'a, T> Drop for SlotGuard<'a, T> {
    fn drop(&mut self) {
        let prev_state = self.state.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(
            prev_state > STATE_READY,
            "slot state should count readers when dropping a guard"
        );
    }
}

/// Lazily computed value that can be reset.
///
/// The first reader computes the value; concurrent readers spin until it is
/// ready. A failed computation leaves the slot empty so that a later reader
/// retries. [`LazySlot::invalidate`] waits for all readers to leave and drops
/// the value, and happens-before any read that starts after it returns.
pub struct LazySlot<T> {
    elem: RwLock<Option<T>>,
    state: AtomicUsize,
}

impl<T> Default for LazySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazySlot<T> {
    pub const fn new() -> Self {
        Self {
            elem: RwLock::new(None),
            state: AtomicUsize::new(STATE_EMPTY),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) >= STATE_READY
    }

    /// Drop the value. Blocks while readers hold guards.
    pub fn invalidate(&self) {
        let backoff = Backoff::new();
        loop {
            let prev_state = self.state.load(Ordering::Acquire);
            if matches!(prev_state, STATE_EMPTY | STATE_READY)
                && self
                    .state
                    .compare_exchange(
                        prev_state,
                        STATE_INVALIDATING,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
            {
                break;
            }
            backoff.snooze();
        }

        self.elem.write().take();
        self.state.store(STATE_EMPTY, Ordering::Release);
    }

    fn read(&self) -> SlotGuard<'_, T> {
        SlotGuard {
            guard: self.elem.read(),
            state: &self.state,
        }
    }

    /// Read the value, computing it first if the slot is empty.
    pub fn get_or_try_init<E>(
        &self,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<SlotGuard<'_, T>, E> {
        let backoff = Backoff::new();

        loop {
            let prev_state = self.state.load(Ordering::Acquire);

            match prev_state {
                STATE_READY..=usize::MAX => {
                    if self
                        .state
                        .compare_exchange(
                            prev_state,
                            prev_state + 1,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        return Ok(self.read());
                    }
                }
                STATE_EMPTY => {
                    if self
                        .state
                        .compare_exchange(
                            STATE_EMPTY,
                            STATE_COMPUTING,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        return match compute() {
                            Ok(value) => {
                                *self.elem.write() = Some(value);
                                // Ready with one reader (the caller)
                                self.state.store(STATE_READY + 1, Ordering::Release);
                                Ok(self.read())
                            }
                            Err(err) => {
                                self.state.store(STATE_EMPTY, Ordering::Release);
                                Err(err)
                            }
                        };
                    }
                }
                _ => {
                    // Wait until the slot is either empty or ready
                    backoff.snooze();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, atomic::AtomicU32};

    use super::*;

    #[test]
    fn computes_once_until_invalidated() {
        let slot = LazySlot::new();
        let calls = AtomicU32::new(0);
        let compute = || -> Result<u32, ()> { Ok(calls.fetch_add(1, Ordering::SeqCst) + 10) };

        assert_eq!(*slot.get_or_try_init(compute).unwrap(), 10);
        assert_eq!(*slot.get_or_try_init(compute).unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        slot.invalidate();
        assert!(!slot.is_ready());
        assert_eq!(*slot.get_or_try_init(compute).unwrap(), 11);
    }

    #[test]
    fn failed_computation_leaves_slot_empty() {
        let slot: LazySlot<u32> = LazySlot::new();
        assert!(slot.get_or_try_init(|| Err("boom")).is_err());
        assert!(!slot.is_ready());
        assert_eq!(*slot.get_or_try_init(|| Ok::<_, ()>(3)).unwrap(), 3);
    }

    #[test]
    fn concurrent_readers_share_one_computation() {
        let slot = Arc::new(LazySlot::new());
        let calls = Arc::new(AtomicU32::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    *slot
                        .get_or_try_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(7u32)
                        })
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
