//! The process-wide hazard table and the per-session snapshot the acquirer
//! binary-searches.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ids::{PageId, SessionId};

/// Encodes `Option<PageId>` into a single `u64` word so each slot can be a
/// plain atomic: `0` means empty, any other value is `page.0 as u64 + 1`.
fn encode(page: Option<PageId>) -> u64 {
    page.map_or(0, |p| p.0 as u64 + 1)
}

fn decode(word: u64) -> Option<PageId> {
    if word == 0 {
        None
    } else {
        Some(PageId((word - 1) as u32))
    }
}

/// A process-wide `sessions x hazard_per_session` array of reader-published
/// page references.
///
/// Readers (external to this crate) write their slot before dereferencing a
/// child pointer and clear it afterwards. The eviction core only reads this
/// table, via [`HazardTable::snapshot`].
pub struct HazardTable {
    sessions: usize,
    per_session: usize,
    slots: Vec<AtomicU64>,
}

impl HazardTable {
    pub fn new(sessions: usize, per_session: usize) -> Self {
        let mut slots = Vec::with_capacity(sessions * per_session);
        slots.resize_with(sessions * per_session, || AtomicU64::new(0));
        Self { sessions, per_session, slots }
    }

    fn row(&self, session: SessionId) -> &[AtomicU64] {
        let start = session.0 as usize * self.per_session;
        &self.slots[start..start + self.per_session]
    }

    /// Publish a hazard reference for `session` in its first free column.
    /// Returns `false` if the session's row is full.
    ///
    /// Exposed so tests can simulate the reader side of the protocol this
    /// crate does not itself implement.
    pub fn set(&self, session: SessionId, page: PageId) -> bool {
        for slot in self.row(session) {
            if slot
                .compare_exchange(0, encode(Some(page)), Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
        false
    }

    /// Clear a previously published hazard reference.
    pub fn clear(&self, session: SessionId, page: PageId) {
        for slot in self.row(session) {
            if slot.load(Ordering::Relaxed) == encode(Some(page)) {
                slot.store(0, Ordering::Release);
                return;
            }
        }
    }

    /// Walk the whole table, compact the live entries, and sort them by
    /// page address. Fresh on every call; callers expect to retry through a
    /// live acquirer loop rather than cache the result.
    pub fn snapshot(&self) -> HazardSnapshot {
        let mut pages: Vec<PageId> = self
            .slots
            .iter()
            .filter_map(|slot| decode(slot.load(Ordering::Acquire)))
            .collect();
        pages.sort_unstable();
        HazardSnapshot { pages }
    }

    pub fn sessions(&self) -> usize {
        self.sessions
    }
}

/// A compacted, address-sorted copy of the live hazard table, private to
/// the acquirer's current attempt.
pub struct HazardSnapshot {
    pages: Vec<PageId>,
}

impl HazardSnapshot {
    /// `true` if some reader currently holds a hazard reference to `page`.
    pub fn contains(&self, page: PageId) -> bool {
        self.pages.binary_search(&page).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_snapshot_round_trips() {
        let table = HazardTable::new(4, 4);
        assert!(table.set(SessionId(0), PageId(7)));
        assert!(table.set(SessionId(2), PageId(3)));
        let snap = table.snapshot();
        assert!(snap.contains(PageId(7)));
        assert!(snap.contains(PageId(3)));
        assert!(!snap.contains(PageId(9)));
    }

    #[test]
    fn clear_removes_from_snapshot() {
        let table = HazardTable::new(2, 2);
        table.set(SessionId(1), PageId(5));
        table.clear(SessionId(1), PageId(5));
        let snap = table.snapshot();
        assert!(!snap.contains(PageId(5)));
    }

    #[test]
    fn row_full_returns_false() {
        let table = HazardTable::new(1, 1);
        assert!(table.set(SessionId(0), PageId(1)));
        assert!(!table.set(SessionId(0), PageId(2)));
    }
}
