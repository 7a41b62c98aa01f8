//! Bit flags carried on pages and passed to [`crate::driver::Evictor::evict`].
//!
//! Two independent flag sets, each with several mutually-relevant bits —
//! exactly what `bitflags` exists for, rather than a raw flag byte.

bitflags::bitflags! {
    /// Flags recognized by [`crate::driver::Evictor::evict`].
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct EvictFlags: u8 {
        /// Forced-mode hazard acquisition: spin-yield instead of failing on
        /// contention.
        const WAIT = 1 << 0;
        /// Caller holds the tree exclusively; skip all hazard and state
        /// manipulation.
        const SINGLE = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Flags carried on a [`crate::page::Page`].
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct PageFlags: u8 {
        /// The cache daemon wants this page evicted regardless of its
        /// normal eviction priority; the driver upgrades the request to
        /// `WAIT` and clears this bit.
        const FORCE_EVICT   = 1 << 0;
        /// Reconciliation found the page now holds nothing.
        const REC_EMPTY     = 1 << 1;
        /// Reconciliation rewrote the page into a single on-disk image.
        const REC_REPLACE   = 1 << 2;
        /// Reconciliation rewrote the page into a new in-memory subtree.
        const REC_SPLIT     = 1 << 3;
        /// This internal page exists only as the product of splitting
        /// another page, and must never be written independently.
        const REC_SPLIT_MERGE = 1 << 4;
    }
}

impl PageFlags {
    /// The bits [`crate::page::Modify`] assigns on completion of a write.
    pub const REC_MASK: PageFlags = PageFlags::REC_EMPTY
        .union(PageFlags::REC_REPLACE)
        .union(PageFlags::REC_SPLIT)
        .union(PageFlags::REC_SPLIT_MERGE);

    /// A child is a *candidate* for subtree merge only if at least one of
    /// these is set; this is the cheap prefilter run before ever locking
    /// the child.
    pub fn mergeable_candidate(self) -> bool {
        self.intersects(PageFlags::REC_EMPTY | PageFlags::REC_SPLIT | PageFlags::REC_SPLIT_MERGE)
    }
}
