//! Traits for the external collaborators this crate treats as opaque: the
//! reconciler that rewrites dirty pages, the deallocator that frees
//! evicted ones, and the clock the cache daemon uses for read-generation
//! bookkeeping.
//!
//! The driver is generic over these so tests can supply small recording
//! fakes instead of a real backing store.

use crate::error::EvictError;
use crate::ids::{PageId, SessionId};
use crate::tree::Tree;

/// Turns a dirty in-memory page into on-disk images and/or a replacement
/// subtree.
///
/// Postcondition on success: the page's `modify.outcome` is set, and its
/// flags carry the corresponding `REC_*` bit (or none, for a page that
/// reconciled clean — which in practice only happens for the root-split
/// collapse's terminal `Replace`).
pub trait Reconciler {
    fn write_page(&self, tree: &Tree, page: PageId) -> Result<(), EvictError>;
}

/// Deallocates a page and drains its tracked-object list.
pub trait PageDiscarder {
    fn discard_page(&self, tree: &Tree, page: PageId) -> Result<(), EvictError>;
}

/// Read-generation bookkeeping, consulted so a refused or merged-away page
/// doesn't get reselected by the cache daemon on the very next sweep.
pub trait ReadGenClock {
    fn cache_read_gen(&self, session: SessionId) -> u64;
}
