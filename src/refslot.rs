//! The parent-to-child edge (a reference slot, or `Ref`) and its state
//! machine.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::ids::{PageAddr, PageId};

/// A `Ref`'s state, declared so that transitions are published with a
/// release barrier and observed with an acquire load. The numeric values
/// are part of the atomic encoding, not a public API surface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum RefState {
    /// The child lives on disk only; `addr`/`size` are valid, `page` is
    /// `None`.
    Disk = 0,
    /// A reader is in the process of bringing the child into memory.
    Reading = 1,
    /// The child is resident in memory; `page` is valid.
    Mem = 2,
    /// This session holds exclusive access; no reader may enter the
    /// pointed page.
    Locked = 3,
}

impl RefState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => RefState::Disk,
            1 => RefState::Reading,
            2 => RefState::Mem,
            3 => RefState::Locked,
            _ => unreachable!("RefState is only ever stored through RefState::store"),
        }
    }
}

/// The edge from a parent to a child page.
///
/// `state` is kept as a standalone `AtomicU8`, never folded together with
/// `page`/`addr` into one word, and every transition that must be visible
/// to a reader is a release store paired with an acquire load on the fast
/// path.
pub struct Ref {
    state: AtomicU8,
    /// Valid iff `state` is `Mem` or `Locked`.
    pub page: Option<PageId>,
    /// Valid iff `state` is `Disk`, or after a successful write.
    pub addr: PageAddr,
}

impl Ref {
    pub fn new_in_memory(page: PageId) -> Self {
        Self { state: AtomicU8::new(RefState::Mem as u8), page: Some(page), addr: PageAddr::INVALID }
    }

    pub fn new_on_disk(addr: PageAddr) -> Self {
        Self { state: AtomicU8::new(RefState::Disk as u8), page: None, addr }
    }

    /// Reader fast-path load: a reader that observes `Mem` still has to
    /// publish a hazard and re-check before trusting `page`.
    pub fn state(&self) -> RefState {
        RefState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Attempt the `Mem` -> `Locked` transition the acquirer uses before it
    /// has finished verifying no hazard holds the page. This is the actual
    /// exclusivity boundary between two sessions racing to acquire the
    /// same Ref: only one `try_lock` call can observe `Mem` and win the
    /// compare-exchange, so a concurrent loser sees it fail and must report
    /// contention rather than also proceeding as if it held the lock.
    /// Readers observing `Locked` already bounce off regardless of
    /// ordering, so `Relaxed` is sufficient for the winning store itself.
    pub fn try_lock(&self) -> bool {
        self.state
            .compare_exchange(RefState::Mem as u8, RefState::Locked as u8, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// A publication store: all other fields must already be written by
    /// the caller before this runs.
    pub fn publish(&self, state: RefState) {
        self.state.store(state as u8, Ordering::Release);
    }
}
