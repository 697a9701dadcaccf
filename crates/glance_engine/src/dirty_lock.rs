//! Render gate: at most one rasterization in flight per panel.
//!
//! A caller that fails to [`DirtyLock::acquire`] leaves the lock dirty; the
//! holder checks that flag when it finishes and renders once more, so any
//! burst of invalidations collapses into a single trailing pass.

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    Idle,
    Rendering,
    /// Rendering, and at least one invalidation arrived meanwhile.
    Stale,
}

#[derive(Debug, Default)]
struct Flags {
    locked: bool,
    dirty: bool,
}

#[derive(Debug, Default)]
pub struct DirtyLock {
    flags: Mutex<Flags>,
}

impl DirtyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lock if idle. Otherwise marks the lock dirty and returns `false`.
    pub fn acquire(&self) -> bool {
        let mut flags = self.flags.lock();
        if flags.locked {
            flags.dirty = true;
            return false;
        }
        flags.locked = true;
        true
    }

    pub fn release(&self) {
        self.flags.lock().locked = false;
    }

    pub fn clean(&self) {
        self.flags.lock().dirty = false;
    }

    /// Releases and clears the dirty flag in one step, returning whether a
    /// re-render was requested while the lock was held.
    pub fn finish(&self) -> bool {
        let mut flags = self.flags.lock();
        flags.locked = false;
        std::mem::take(&mut flags.dirty)
    }

    pub fn locked(&self) -> bool {
        self.flags.lock().locked
    }

    pub fn dirty(&self) -> bool {
        self.flags.lock().dirty
    }

    pub fn state(&self) -> LockState {
        let flags = self.flags.lock();
        match (flags.locked, flags.dirty) {
            (false, _) => LockState::Idle,
            (true, false) => LockState::Rendering,
            (true, true) => LockState::Stale,
        }
    }
}
