use thiserror::Error;

/// Failures the external reconciler (`write_page`) may surface.
///
/// Opaque from this crate's point of view: we only need a source error to
/// wrap and propagate, mirroring how `AllocError` wraps `std::io::Error`
/// from its own external collaborator (the OS).
#[derive(Debug, Error)]
#[error("reconciliation failed")]
pub struct ReconcileError(#[source] pub Box<dyn std::error::Error + Send + Sync + 'static>);

/// Failures the external deallocator (`discard_page`) may surface.
#[derive(Debug, Error)]
#[error("page discard failed")]
pub struct DiscardError(#[source] pub Box<dyn std::error::Error + Send + Sync + 'static>);

/// Errors produced by this crate's eviction core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvictError {
    /// Another session holds a hazard reference, or a child Ref is
    /// `Locked`/`Reading`. Non-fatal: the caller should try a different
    /// candidate.
    #[error("page is busy")]
    Busy,
    /// A forced acquisition exhausted its configured yield budget without
    /// obtaining exclusive access. Only reachable when
    /// [`crate::config::EvictConfig::force_yield_budget`] is set; production
    /// configuration has no budget and spins indefinitely, as the protocol
    /// requires.
    #[error("forced acquisition timed out after {0} yields")]
    ForceTimedOut(u32),
    /// The external reconciler failed to write the page.
    #[error("failed to reconcile page")]
    Write(#[source] ReconcileError),
    /// The external deallocator failed to discard a page.
    #[error("failed to discard page")]
    Discard(#[source] DiscardError),
    /// A Ref or Page was observed in a state that should be impossible in
    /// context. Indicates a bug in the caller or in this crate, not a
    /// transient condition.
    #[error("invariant violation: {0}")]
    Invariant(&'static str),
}
