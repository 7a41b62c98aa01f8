//! Owning storage for pages and their reference slots.
//!
//! Pages hold cyclic parent back-references, so they can't be owned by a
//! normal tree of `Box`es. Instead they live in a flat arena addressed by
//! [`PageId`]/[`RefId`] handles rather than raw pointers.
//!
//! The arena and its refs are guarded by a single mutex (a handful of
//! `Mutex`-wrapped fields, the same shape as a couple of coarse critical
//! sections rather than lock-free bookkeeping for the tree shape itself).
//! [`crate::refslot::Ref`]'s `state` word stays a standalone atomic, so the
//! acquire/release protocol is still expressed at the field level even
//! though, in this implementation, it is additionally covered by the
//! coarser lock.

use std::sync::Mutex;

use crate::error::EvictError;
use crate::hazard::HazardTable;
use crate::ids::{PageId, RefId};
use crate::page::Page;
use crate::refslot::Ref;

struct TreeInner {
    pages: Vec<Option<Page>>,
    refs: Vec<Ref>,
}

/// The tree being evicted against, plus the hazard table readers publish
/// into.
pub struct Tree {
    inner: Mutex<TreeInner>,
    hazards: HazardTable,
    root: RefId,
}

impl Tree {
    /// Build an empty tree whose root slot points at `root_page`.
    pub fn new(sessions: usize, hazard_per_session: usize, root_page: Page) -> Self {
        let mut inner = TreeInner { pages: Vec::new(), refs: Vec::new() };
        let root_id = PageId(inner.pages.len() as u32);
        inner.pages.push(Some(root_page));
        let root_ref = RefId(inner.refs.len() as u32);
        inner.refs.push(Ref::new_in_memory(root_id));
        Self { inner: Mutex::new(inner), hazards: HazardTable::new(sessions, hazard_per_session), root: root_ref }
    }

    pub fn hazards(&self) -> &HazardTable {
        &self.hazards
    }

    /// The tree-level slot with no owning parent page: used whenever the
    /// candidate being evicted is currently the root.
    pub fn root_ref(&self) -> RefId {
        self.root
    }

    pub fn alloc_page(&self, page: Page) -> PageId {
        let mut inner = self.inner.lock().expect("tree mutex poisoned");
        let id = PageId(inner.pages.len() as u32);
        inner.pages.push(Some(page));
        id
    }

    pub fn alloc_ref(&self, r: Ref) -> RefId {
        let mut inner = self.inner.lock().expect("tree mutex poisoned");
        let id = RefId(inner.refs.len() as u32);
        inner.refs.push(r);
        id
    }

    pub fn with_page<T>(&self, id: PageId, f: impl FnOnce(&Page) -> T) -> Result<T, EvictError> {
        let inner = self.inner.lock().expect("tree mutex poisoned");
        let page = inner.pages[id.0 as usize]
            .as_ref()
            .ok_or(EvictError::Invariant("page accessed after discard"))?;
        Ok(f(page))
    }

    pub fn with_page_mut<T>(&self, id: PageId, f: impl FnOnce(&mut Page) -> T) -> Result<T, EvictError> {
        let mut inner = self.inner.lock().expect("tree mutex poisoned");
        let page = inner.pages[id.0 as usize]
            .as_mut()
            .ok_or(EvictError::Invariant("page accessed after discard"))?;
        Ok(f(page))
    }

    pub fn with_ref<T>(&self, id: RefId, f: impl FnOnce(&Ref) -> T) -> T {
        let inner = self.inner.lock().expect("tree mutex poisoned");
        f(&inner.refs[id.0 as usize])
    }

    pub fn with_ref_mut<T>(&self, id: RefId, f: impl FnOnce(&mut Ref) -> T) -> T {
        let mut inner = self.inner.lock().expect("tree mutex poisoned");
        f(&mut inner.refs[id.0 as usize])
    }

    /// Remove a page from the arena, returning its owned contents so the
    /// caller (the discard collaborator) can drain whatever tracked-object
    /// list it needs to before dropping it.
    pub fn take_page(&self, id: PageId) -> Option<Page> {
        let mut inner = self.inner.lock().expect("tree mutex poisoned");
        inner.pages[id.0 as usize].take()
    }

    /// The page a Ref currently points at, if resident.
    pub fn ref_page(&self, id: RefId) -> Option<PageId> {
        self.with_ref(id, |r| r.page)
    }
}
