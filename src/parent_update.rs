//! Translating a reconciliation outcome into parent state, plus the
//! root-split collapse.

use crate::collab::{PageDiscarder, Reconciler};
use crate::config::EvictConfig;
use crate::error::EvictError;
use crate::flags::{EvictFlags, PageFlags};
use crate::ids::{PageAddr, PageId, RefId};
use crate::page::ReconcileOutcome;
use crate::refslot::RefState;
use crate::tree::Tree;
use crate::unlock::release;

/// What happened after a dirty page's outcome was applied to its parent.
pub enum DirtyOutcome {
    /// The candidate was evicted; its locks are gone and it has been
    /// discarded.
    Evicted,
    /// The page reconciled to `Empty` but isn't the root: eviction is
    /// aborted, the page is left in place to be merged by its own parent
    /// later, and every lock `review` took has been released.
    EmptyNonRootAbort,
}

/// The clean (no reconciliation flags) path: identical for root and
/// non-root.
pub fn clean_update_parent(tree: &Tree, discarder: &dyn PageDiscarder, own_ref: RefId, candidate: PageId) -> Result<(), EvictError> {
    tree.with_ref_mut(own_ref, |r| r.page = None);
    tree.with_ref_mut(own_ref, |r| r.publish(RefState::Disk));
    discard_subtree_then_self(tree, discarder, candidate)
}

/// The dispatch table for a dirty page's reconciliation outcome, plus the
/// root-split collapse that runs when the outcome is `Split` on the root.
#[allow(clippy::too_many_arguments)]
pub fn dirty_update_parent(
    tree: &Tree,
    config: &EvictConfig,
    reconciler: &dyn Reconciler,
    discarder: &dyn PageDiscarder,
    own_ref: RefId,
    candidate: PageId,
    is_root: bool,
    flags: EvictFlags,
    last_locked: Option<RefId>,
) -> Result<DirtyOutcome, EvictError> {
    let outcome = tree
        .with_page(candidate, |p| p.modify.as_ref().and_then(|m| m.outcome))?
        .ok_or(EvictError::Invariant("dirty page has no reconcile outcome after write_page"))?;

    match outcome {
        ReconcileOutcome::Empty => {
            if is_root {
                tree.with_ref_mut(own_ref, |r| {
                    r.addr = PageAddr::INVALID;
                    r.page = None;
                });
                tree.with_ref_mut(own_ref, |r| r.publish(RefState::Disk));
                discard_subtree_then_self(tree, discarder, candidate)?;
                Ok(DirtyOutcome::Evicted)
            } else {
                release(tree, candidate, last_locked, flags);
                Ok(DirtyOutcome::EmptyNonRootAbort)
            }
        }
        ReconcileOutcome::Replace(addr) => {
            tree.with_ref_mut(own_ref, |r| {
                r.addr = addr;
                r.page = None;
            });
            tree.with_ref_mut(own_ref, |r| r.publish(RefState::Disk));
            discard_subtree_then_self(tree, discarder, candidate)?;
            Ok(DirtyOutcome::Evicted)
        }
        ReconcileOutcome::Split { new_page } => {
            if is_root {
                let addr = collapse_root_split(tree, config, reconciler, discarder, new_page)?;
                tree.with_ref_mut(own_ref, |r| {
                    r.addr = addr;
                    r.page = None;
                });
                tree.with_ref_mut(own_ref, |r| r.publish(RefState::Disk));
            } else {
                tree.with_page_mut(new_page, |p| p.parent_ref = Some(own_ref))?;
                tree.with_ref_mut(own_ref, |r| r.page = Some(new_page));
                tree.with_ref_mut(own_ref, |r| r.publish(RefState::Mem));
            }
            discard_subtree_then_self(tree, discarder, candidate)?;
            Ok(DirtyOutcome::Evicted)
        }
    }
}

/// A new root produced by a split has no parent to merge into, and must be
/// written immediately. Iterates until reconciliation produces a single
/// `Replace`, discarding each stale intermediate page as it goes.
fn collapse_root_split(
    tree: &Tree,
    _config: &EvictConfig,
    reconciler: &dyn Reconciler,
    discarder: &dyn PageDiscarder,
    mut page: PageId,
) -> Result<PageAddr, EvictError> {
    loop {
        tree.with_page_mut(page, |p| {
            p.mark_modified();
            p.flags.remove(PageFlags::REC_MASK);
        })?;

        reconciler.write_page(tree, page)?;

        let outcome = tree
            .with_page(page, |p| p.modify.as_ref().and_then(|m| m.outcome))?
            .ok_or(EvictError::Invariant("write_page succeeded without recording an outcome"))?;

        let stale = page;
        match outcome {
            ReconcileOutcome::Replace(addr) => {
                discarder.discard_page(tree, stale)?;
                return Ok(addr);
            }
            ReconcileOutcome::Split { new_page } => {
                page = new_page;
                discarder.discard_page(tree, stale)?;
            }
            ReconcileOutcome::Empty => {
                return Err(EvictError::Invariant("root split collapse produced Empty; no address to install"));
            }
        }
    }
}

/// Discard descendants merged into `page` during reconciliation (recursive
/// walk, skipping `Disk` children), then discard `page` itself.
fn discard_subtree_then_self(tree: &Tree, discarder: &dyn PageDiscarder, page: PageId) -> Result<(), EvictError> {
    discard_merged_descendants(tree, discarder, page)?;
    discarder.discard_page(tree, page)
}

fn discard_merged_descendants(tree: &Tree, discarder: &dyn PageDiscarder, page: PageId) -> Result<(), EvictError> {
    let children = tree.with_page(page, |p| p.kind.children().to_vec())?;
    for child_ref in children {
        if tree.with_ref(child_ref, |r| r.state()) == RefState::Disk {
            continue;
        }
        let Some(child_page) = tree.ref_page(child_ref) else { continue };
        discard_merged_descendants(tree, discarder, child_page)?;
        discarder.discard_page(tree, child_page)?;
    }
    Ok(())
}
