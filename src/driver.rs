//! The eviction driver: the top-level entry point that orchestrates
//! review, write, parent update and discard.

use crate::collab::{PageDiscarder, ReadGenClock, Reconciler};
use crate::config::EvictConfig;
use crate::error::EvictError;
use crate::flags::{EvictFlags, PageFlags};
use crate::ids::{PageId, SessionId};
use crate::parent_update::{clean_update_parent, dirty_update_parent, DirtyOutcome};
use crate::refslot::RefState;
use crate::review::{candidate_ref, review};
use crate::tree::Tree;
use crate::unlock::release;

/// Orchestrates `review -> write_page -> parent-update -> discard` for one
/// candidate page.
///
/// Generic over its three collaborators the way a B-tree reader/writer can
/// be generic over a `RawRead`/`RawWrite` backing store: production code
/// wires in the real cache and reconciler, tests wire in small recording
/// fakes.
pub struct Evictor<'a, RC: Reconciler, PD: PageDiscarder, RG: ReadGenClock> {
    reconciler: &'a RC,
    discarder: &'a PD,
    read_gen: &'a RG,
    config: EvictConfig,
    session: SessionId,
}

impl<'a, RC: Reconciler, PD: PageDiscarder, RG: ReadGenClock> Evictor<'a, RC, PD, RG> {
    pub fn new(reconciler: &'a RC, discarder: &'a PD, read_gen: &'a RG, config: EvictConfig, session: SessionId) -> Self {
        Self { reconciler, discarder, read_gen, config, session }
    }

    /// Evict `page`, recursively collapsing any mergeable descendants into it.
    pub fn evict(&self, tree: &Tree, page: PageId, mut flags: EvictFlags) -> Result<(), EvictError> {
        log::trace!("evict: page={page:?} flags={flags:?}");

        let page_flags = tree.with_page(page, |p| p.flags)?;

        if page_flags.contains(PageFlags::REC_SPLIT_MERGE) {
            log::debug!("evict: refusing merge-split page {page:?}, bumping read_gen");
            let gen = self.read_gen.cache_read_gen(self.session);
            tree.with_page_mut(page, |p| p.read_gen = gen)?;
            let own_ref = candidate_ref(tree, page)?;
            tree.with_ref_mut(own_ref, |r| r.publish(RefState::Mem));
            return Ok(());
        }

        if page_flags.contains(PageFlags::FORCE_EVICT) {
            flags |= EvictFlags::WAIT;
            tree.with_page_mut(page, |p| p.flags.remove(PageFlags::FORCE_EVICT))?;
        }

        let last_locked = review(tree, &self.config, page, flags)?;

        if tree.with_page(page, |p| p.is_modified())? {
            if let Err(e) = self.reconciler.write_page(tree, page) {
                log::warn!("evict: write_page failed for {page:?}: {e}");
                release(tree, page, last_locked, flags);
                return Err(e);
            }
        }

        let rec_flags = tree.with_page(page, |p| p.rec_flags())?;
        let own_ref = candidate_ref(tree, page)?;

        if rec_flags.is_empty() {
            clean_update_parent(tree, self.discarder, own_ref, page)?;
            log::info!("evict: page {page:?} evicted clean");
            return Ok(());
        }

        let is_root = tree.with_page(page, |p| p.parent_ref.is_none())?;
        match dirty_update_parent(tree, &self.config, self.reconciler, self.discarder, own_ref, page, is_root, flags, last_locked)? {
            DirtyOutcome::Evicted => log::info!("evict: page {page:?} evicted dirty"),
            DirtyOutcome::EmptyNonRootAbort => {
                log::debug!("evict: page {page:?} empty, deferred to parent, bumping read_gen");
                let gen = self.read_gen.cache_read_gen(self.session);
                tree.with_page_mut(page, |p| p.read_gen = gen)?;
            }
        }
        Ok(())
    }
}
