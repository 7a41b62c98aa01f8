//! The exclusive-access acquirer: flips a Ref to `Locked` and confirms no
//! reader still holds a hazard reference to it.

use crate::config::EvictConfig;
use crate::error::EvictError;
use crate::ids::RefId;
use crate::refslot::RefState;
use crate::tree::Tree;

/// Flip `ref_id` to `Locked` iff no reader holds a hazard reference to the
/// page it points at.
///
/// The only legitimate starting state is `Mem`: the transition is a
/// compare-exchange, so this is also the exclusivity boundary between two
/// sessions racing to acquire the same Ref -- the loser's CAS simply fails
/// and it reports contention without ever touching the Ref or the page it
/// points at, exactly as if it had found the Ref already `Locked`. On
/// success the Ref ends `Locked`. On [`EvictError::Busy`] the Ref is
/// unchanged (still `Mem`, or already `Locked` by whoever won the race).
pub fn acquire_exclusive(
    tree: &Tree,
    config: &EvictConfig,
    ref_id: RefId,
    force: bool,
) -> Result<(), EvictError> {
    if !tree.with_ref(ref_id, |r| r.try_lock()) {
        // The CAS only fails if the Ref wasn't `Mem` at that instant. Most
        // commonly that's a losing race against another session's
        // `Locked` (ordinary contention); `Disk`/`Reading` would mean a
        // caller handed us a Ref outside its contract (`review_subtree`
        // already filters those out before ever calling here).
        return match tree.with_ref(ref_id, |r| r.state()) {
            RefState::Mem | RefState::Locked => Err(EvictError::Busy),
            RefState::Disk | RefState::Reading => {
                Err(EvictError::Invariant("acquire_exclusive called on a Ref that is neither Mem nor Locked"))
            }
        };
    }

    let mut yields: u32 = 0;
    loop {
        let page = tree.ref_page(ref_id);
        let snapshot = tree.hazards().snapshot();

        let held = match page {
            Some(p) => snapshot.contains(p),
            None => false,
        };

        if !held {
            return Ok(());
        }

        if !force {
            tree.with_ref(ref_id, |r| r.publish(RefState::Mem));
            return Err(EvictError::Busy);
        }

        if let Some(budget) = config.force_yield_budget {
            if yields >= budget {
                tree.with_ref(ref_id, |r| r.publish(RefState::Mem));
                return Err(EvictError::ForceTimedOut(budget));
            }
        }
        yields += 1;
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PageId, SessionId};
    use crate::page::Page;
    use crate::refslot::Ref;

    fn test_tree() -> Tree {
        Tree::new(4, 4, Page::new_leaf(None))
    }

    #[test]
    fn acquires_when_no_hazard_held() {
        let tree = test_tree();
        let config = EvictConfig::default();
        let child_page = tree.alloc_page(Page::new_leaf(None));
        let child_ref = tree.alloc_ref(Ref::new_in_memory(child_page));

        assert!(acquire_exclusive(&tree, &config, child_ref, false).is_ok());
        tree.with_ref(child_ref, |r| assert_eq!(r.state(), RefState::Locked));
    }

    #[test]
    fn busy_restores_mem_and_fails_without_force() {
        let tree = test_tree();
        let config = EvictConfig::default();
        let child_page = tree.alloc_page(Page::new_leaf(None));
        let child_ref = tree.alloc_ref(Ref::new_in_memory(child_page));
        tree.hazards().set(SessionId(0), child_page);

        let result = acquire_exclusive(&tree, &config, child_ref, false);
        assert!(matches!(result, Err(EvictError::Busy)));
        tree.with_ref(child_ref, |r| assert_eq!(r.state(), RefState::Mem));
    }

    #[test]
    fn forced_acquisition_times_out_when_budgeted() {
        let tree = test_tree();
        let config = EvictConfig { force_yield_budget: Some(3), ..EvictConfig::default() };
        let child_page = tree.alloc_page(Page::new_leaf(None));
        let child_ref = tree.alloc_ref(Ref::new_in_memory(child_page));
        tree.hazards().set(SessionId(0), child_page);

        let result = acquire_exclusive(&tree, &config, child_ref, true);
        assert!(matches!(result, Err(EvictError::ForceTimedOut(3))));
    }

    #[test]
    fn forced_acquisition_succeeds_once_reader_clears() {
        use std::sync::Arc;
        use std::time::Duration;

        let tree = Arc::new(test_tree());
        let config = EvictConfig::default();
        let child_page = tree.alloc_page(Page::new_leaf(None));
        let child_ref = tree.alloc_ref(Ref::new_in_memory(child_page));
        tree.hazards().set(SessionId(0), child_page);

        let reader_tree = Arc::clone(&tree);
        let reader = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            reader_tree.hazards().clear(SessionId(0), child_page);
        });

        let result = acquire_exclusive(&tree, &config, child_ref, true);
        reader.join().unwrap();
        assert!(result.is_ok());
    }
}
