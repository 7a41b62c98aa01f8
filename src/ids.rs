//! Arena handles and on-disk addressing.

/// A stable, non-owning handle to a page stored in a [`crate::tree::Tree`]'s arena.
///
/// `PageId` doubles as the total order the hazard snapshot sorts on: the
/// wrapped index stands in for a page's memory address in a pointer-based
/// design.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PageId(pub(crate) u32);

/// A stable, non-owning handle to a [`crate::refslot::Ref`] edge.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RefId(pub(crate) u32);

/// Identifies a reader session for hazard-table indexing and read-generation
/// bookkeeping.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SessionId(pub u32);

/// An on-disk block address, valid once a `Ref` reaches state `Disk`.
///
/// `size` is the encoded length of the page image; both fields are
/// meaningless (and left at their sentinel values) until a write or a
/// root-split collapse installs them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct PageAddr {
    pub addr: u64,
    pub size: u32,
}

impl PageAddr {
    /// Sentinel marking "no address": an empty root, or a Ref that has
    /// never been written.
    pub const INVALID: PageAddr = PageAddr { addr: u64::MAX, size: 0 };

    pub fn is_invalid(&self) -> bool {
        self.addr == u64::MAX
    }
}

impl Default for PageAddr {
    fn default() -> Self {
        PageAddr::INVALID
    }
}
