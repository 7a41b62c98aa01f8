//! The page reconciliation-and-eviction core of a B-tree-backed storage
//! engine.
//!
//! On behalf of a cache-pressure daemon, this crate selects an in-memory
//! page, acquires exclusive access to it and to any descendants that would
//! need to be collapsed with it, hands the dirty page to an external
//! reconciler, splices the result into the parent, and releases memory.
//! It does not read pages from disk, run queries, manage transactions, or
//! schedule I/O; the reconciler, the block allocator, and the cache
//! daemon that selects eviction candidates are all external collaborators,
//! consumed here as the [`collab`] traits.

pub mod acquire;
pub mod collab;
pub mod config;
pub mod driver;
pub mod error;
pub mod flags;
pub mod hazard;
pub mod ids;
pub mod page;
pub mod parent_update;
pub mod refslot;
pub mod review;
pub mod tree;
pub mod unlock;

pub use config::EvictConfig;
pub use driver::Evictor;
pub use error::{DiscardError, EvictError, ReconcileError};
pub use flags::{EvictFlags, PageFlags};
pub use ids::{PageAddr, PageId, RefId, SessionId};
pub use page::{InternalKind, Modify, Page, PageKind, ReconcileOutcome};
pub use refslot::{Ref, RefState};
pub use tree::Tree;
