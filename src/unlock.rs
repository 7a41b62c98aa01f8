//! The subtree unlocker: a reverse walk that mirrors the reviewer's
//! traversal order exactly, restoring every `Locked` Ref up to the
//! watermark the reviewer recorded.

use crate::flags::EvictFlags;
use crate::ids::{PageId, RefId};
use crate::refslot::RefState;
use crate::review::candidate_ref;
use crate::tree::Tree;

/// Release every lock `review` took on `candidate`'s subtree, stopping
/// once `last_locked` has been restored to `Mem`.
///
/// `SINGLE` mode never took any locks, so this is a no-op. `last_locked`
/// being `None` means nothing was locked at all (the `SINGLE` case, or a
/// failure before the candidate's own ref could be acquired), so there is
/// nothing to release either.
pub fn release(tree: &Tree, candidate: PageId, last_locked: Option<RefId>, flags: EvictFlags) {
    if flags.contains(EvictFlags::SINGLE) {
        return;
    }
    let Some(last_locked) = last_locked else { return };

    let own_ref = match candidate_ref(tree, candidate) {
        Ok(r) => r,
        Err(_) => return,
    };
    tree.with_ref(own_ref, |r| r.publish(RefState::Mem));
    if own_ref == last_locked {
        return;
    }

    release_subtree(tree, candidate, last_locked);
}

/// Walk `parent_page`'s children in the same order `review_subtree` did,
/// unlocking every one we find still `Locked` (children left `Disk`, or
/// that a failed `review_child` already unwound itself, are simply
/// skipped rather than asserted locked -- see DESIGN.md for why this
/// crate's unlocker skips instead of asserting). Returns `true` once
/// `last_locked` has been found and restored, which tells the caller to
/// stop walking remaining siblings.
fn release_subtree(tree: &Tree, parent_page: PageId, last_locked: RefId) -> bool {
    let children = match tree.with_page(parent_page, |p| p.kind.children().to_vec()) {
        Ok(c) => c,
        Err(_) => return false,
    };

    for child_ref in children {
        if tree.with_ref(child_ref, |r| r.state()) != RefState::Locked {
            continue;
        }
        tree.with_ref(child_ref, |r| r.publish(RefState::Mem));
        if child_ref == last_locked {
            return true;
        }

        let Some(child_page) = tree.ref_page(child_ref) else { continue };
        let is_internal = tree.with_page(child_page, |p| p.kind.is_internal()).unwrap_or(false);
        if is_internal && release_subtree(tree, child_page, last_locked) {
            return true;
        }
    }
    false
}
