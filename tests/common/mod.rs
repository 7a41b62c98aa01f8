//! Shared fakes for the external collaborators, exercising the eviction
//! core against small in-test doubles instead of a real reconciler or
//! block allocator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, Once};

use evict_core::collab::{PageDiscarder, ReadGenClock, Reconciler};
use evict_core::error::EvictError;
use evict_core::ids::{PageAddr, PageId, SessionId};
use evict_core::page::{Modify, ReconcileOutcome};
use evict_core::{flags::PageFlags, tree::Tree};

static LOG_INIT: Once = Once::new();

/// Turns on the driver's `log::{trace,debug,info,warn}!` call sites for
/// whichever test calls this first; `cargo test -- --nocapture` then shows
/// them. `Once`-guarded because every test in the binary calls it and
/// `env_logger` panics on a second `init()`.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        env_logger::Builder::from_default_env().is_test(true).format_timestamp_secs().init();
    });
}

/// Scripts a single reconciliation outcome per page, and records which
/// pages were asked to write.
#[derive(Default)]
pub struct ScriptedReconciler {
    outcomes: Mutex<HashMap<PageId, ReconcileOutcome>>,
    pub calls: Mutex<Vec<PageId>>,
}

impl ScriptedReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, page: PageId, outcome: ReconcileOutcome) {
        self.outcomes.lock().unwrap().insert(page, outcome);
    }
}

impl Reconciler for ScriptedReconciler {
    fn write_page(&self, tree: &Tree, page: PageId) -> Result<(), EvictError> {
        self.calls.lock().unwrap().push(page);
        let outcome = *self
            .outcomes
            .lock()
            .unwrap()
            .get(&page)
            .unwrap_or_else(|| panic!("no scripted outcome for {page:?}"));

        tree.with_page_mut(page, |p| {
            let flag = match outcome {
                ReconcileOutcome::Replace(_) => PageFlags::REC_REPLACE,
                ReconcileOutcome::Split { .. } => PageFlags::REC_SPLIT,
                ReconcileOutcome::Empty => PageFlags::REC_EMPTY,
            };
            p.flags.remove(PageFlags::REC_MASK);
            p.flags.insert(flag);
            p.modify = Some(Modify { outcome: Some(outcome) });
        })
    }
}

/// A reconciler that always fails, for the write-failure propagation test.
pub struct FailingReconciler;

impl Reconciler for FailingReconciler {
    fn write_page(&self, _tree: &Tree, _page: PageId) -> Result<(), EvictError> {
        Err(EvictError::Write(evict_core::error::ReconcileError(
            "disk full".into(),
        )))
    }
}

/// Records discarded pages; never fails.
#[derive(Default)]
pub struct RecordingDiscarder {
    pub discarded: Mutex<Vec<PageId>>,
}

impl RecordingDiscarder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageDiscarder for RecordingDiscarder {
    fn discard_page(&self, tree: &Tree, page: PageId) -> Result<(), EvictError> {
        self.discarded.lock().unwrap().push(page);
        tree.take_page(page);
        Ok(())
    }
}

/// A monotonically increasing read-generation clock.
pub struct CountingClock {
    next: AtomicU64,
}

impl CountingClock {
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }
}

impl ReadGenClock for CountingClock {
    fn cache_read_gen(&self, _session: SessionId) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

pub fn addr(n: u64) -> PageAddr {
    PageAddr { addr: n, size: 4096 }
}
