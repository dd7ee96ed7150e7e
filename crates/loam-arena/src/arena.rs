//! The arena: a reserved span of address space consumed by a bump pointer.
//!
//! [`Arena::new`] reserves the whole span up front with no physical
//! backing. Allocation advances a bump pointer and commits pages on
//! demand, so an arena can reserve gigabytes while the process only pays
//! for the prefix it has actually touched.
//!
//! ```text
//! base                                              base + reserved
//! ├──────────────────┬──────────────────┬────────────────────────┤
//! │ live allocations │ committed, free  │  reserved, PROT_NONE   │
//! └──────────────────┴──────────────────┴────────────────────────┘
//!                    ▲                  ▲
//!                  offset           committed
//! ```
//!
//! Invariant: `0 <= offset <= committed <= reserved`, preserved across
//! failed operations. A failed call mutates none of the three fields.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::ptr::{self, NonNull};

use crate::align::align_up;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::vm;

/// Handle to a block carved from an [`Arena`].
///
/// A `Block` names an `(offset, len)` byte range; resolving it to memory
/// goes through the arena that issued it ([`Arena::slice`],
/// [`Arena::slice_mut`], [`Arena::ptr`]). The range stays valid until the
/// arena's next [`reset`](Arena::reset), the close of an enclosing
/// scratch region, or the arena's drop — blocks are never freed
/// individually. A block is only meaningful to the arena that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Block {
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl Block {
    /// Byte offset of the block within its arena.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length block.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte. Cannot overflow: `offset + len` was
    /// bounds-checked against the reservation when the block was carved.
    fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block(off={}, len={})", self.offset, self.len)
    }
}

/// A demand-paged bump allocator over one reserved span of address space.
///
/// The arena exclusively owns its span: every block it hands out is a
/// view into that span, valid until the next [`reset`](Self::reset) or
/// drop. Dropping the arena releases the whole reservation in one
/// `munmap`; there is no per-block free.
///
/// Single-threaded by design — no internal synchronization exists, and
/// the type is deliberately neither `Send` nor `Sync`. Callers that need
/// concurrent allocation give each thread its own arena or serialize
/// externally.
pub struct Arena {
    /// Start of the reserved span. Exclusively owned; unmapped on drop.
    base: NonNull<u8>,
    /// Total span size, fixed at creation, page-rounded.
    reserved: usize,
    /// Size of the prefix currently backed by physical memory.
    committed: usize,
    /// Bump pointer: next free byte relative to `base`.
    offset: usize,
    /// OS page size, queried once at construction.
    page_size: usize,
}

impl Arena {
    /// Reserve an arena's address space.
    ///
    /// Rounds `config.reserve_size` up to the OS page size and reserves
    /// that span with no access rights — no physical memory is committed
    /// yet. The page size is queried here, once, and cached on the arena.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        if config.reserve_size == 0 {
            return Err(ArenaError::InvalidReserveSize { requested: 0 });
        }
        let page_size = vm::page_size().map_err(|errno| ArenaError::ReservationFailed {
            size: config.reserve_size,
            errno,
        })?;
        let reserved =
            align_up(config.reserve_size, page_size).ok_or(ArenaError::InvalidReserveSize {
                requested: config.reserve_size,
            })?;
        let base = vm::reserve(reserved).map_err(|errno| ArenaError::ReservationFailed {
            size: reserved,
            errno,
        })?;
        Ok(Self {
            base,
            reserved,
            committed: 0,
            offset: 0,
            page_size,
        })
    }

    /// Reserve `bytes` of address space with an otherwise default
    /// configuration.
    pub fn with_reserve(bytes: usize) -> Result<Self, ArenaError> {
        Self::new(ArenaConfig::new(bytes))
    }

    /// Bump-allocate `size` bytes at the given power-of-two alignment.
    ///
    /// The bump pointer itself is aligned before the block is carved, so
    /// blocks of mixed alignment can be allocated in any sequence. The
    /// block's bytes are unspecified; use [`alloc_zeroed`](Self::alloc_zeroed)
    /// for zero-filled memory. Fresh pages arrive zeroed from the OS, but
    /// after a [`reset`](Self::reset) or scratch rollback the bytes are
    /// whatever the previous occupant left there.
    pub fn alloc(&mut self, size: usize, align: usize) -> Result<Block, ArenaError> {
        self.alloc_inner(size, align, false)
    }

    /// Like [`alloc`](Self::alloc), but zero-fills the block's bytes.
    ///
    /// Only the block itself is zeroed, not the alignment padding before
    /// it, whose content stays unspecified.
    pub fn alloc_zeroed(&mut self, size: usize, align: usize) -> Result<Block, ArenaError> {
        self.alloc_inner(size, align, true)
    }

    /// Allocate a block satisfying `layout`.
    pub fn alloc_layout(&mut self, layout: Layout) -> Result<Block, ArenaError> {
        self.alloc_inner(layout.size(), layout.align(), false)
    }

    fn alloc_inner(&mut self, size: usize, align: usize, zero: bool) -> Result<Block, ArenaError> {
        if size == 0 || !align.is_power_of_two() {
            return Err(ArenaError::InvalidLayout { size, align });
        }
        let remaining = self.reserved - self.offset;
        let out_of_space = ArenaError::OutOfReservedSpace {
            requested: size,
            remaining,
        };
        let start = align_up(self.offset, align).ok_or(out_of_space)?;
        let new_offset = start.checked_add(size).ok_or(out_of_space)?;
        if new_offset > self.reserved {
            return Err(out_of_space);
        }
        if new_offset > self.committed {
            self.commit_to(new_offset)?;
        }
        self.offset = new_offset;
        if zero {
            // SAFETY: `start..start + size` lies within the committed
            // read/write prefix of the span this arena owns.
            unsafe { ptr::write_bytes(self.base.as_ptr().add(start), 0, size) };
        }
        Ok(Block { offset: start, len: size })
    }

    /// Extend the committed prefix to cover `new_offset`.
    ///
    /// The commit target is `new_offset` rounded up to the page size and
    /// clamped to the reservation. `committed` moves only after the OS
    /// accepts the whole range; on refusal no partial commit is recorded.
    fn commit_to(&mut self, new_offset: usize) -> Result<(), ArenaError> {
        // `reserved` is page-aligned, so the rounded target can only pass
        // it on usize overflow, where the clamp applies the same bound.
        let target = align_up(new_offset, self.page_size).map_or(self.reserved, |t| t.min(self.reserved));
        let grow = target - self.committed;
        // SAFETY: `[base + committed, base + target)` is page-aligned at
        // both ends and lies within this arena's reservation.
        unsafe { vm::commit(self.base.as_ptr().add(self.committed), grow) }
            .map_err(|errno| ArenaError::CommitFailed { size: grow, errno })?;
        self.committed = target;
        Ok(())
    }

    /// Move a block to a fresh allocation of `new_size` bytes.
    ///
    /// A bump allocator has no in-place free: reallocation always carves
    /// a new block via [`alloc`](Self::alloc), copies
    /// `min(old.len(), new_size)` bytes across, and returns the new
    /// handle. The old block becomes dead space reclaimable only by
    /// [`reset`](Self::reset) or drop — callers that reallocate often
    /// will waste span until then. The tail of a grown block is
    /// unspecified; see [`realloc_zeroed`](Self::realloc_zeroed).
    ///
    /// Blocks do not record their alignment, so `align` is explicit.
    ///
    /// # Panics
    ///
    /// Panics if `old` does not lie within the allocated prefix.
    pub fn realloc(
        &mut self,
        old: Block,
        new_size: usize,
        align: usize,
    ) -> Result<Block, ArenaError> {
        self.realloc_inner(old, new_size, align, false)
    }

    /// Like [`realloc`](Self::realloc), but zero-fills the grown tail.
    pub fn realloc_zeroed(
        &mut self,
        old: Block,
        new_size: usize,
        align: usize,
    ) -> Result<Block, ArenaError> {
        self.realloc_inner(old, new_size, align, true)
    }

    fn realloc_inner(
        &mut self,
        old: Block,
        new_size: usize,
        align: usize,
        zero_tail: bool,
    ) -> Result<Block, ArenaError> {
        self.check_block(old);
        let new = self.alloc_inner(new_size, align, false)?;
        let keep = old.len.min(new.len);
        // SAFETY: the new block starts at or past the old allocated
        // prefix, so the two ranges cannot overlap; both lie within the
        // committed prefix.
        unsafe {
            ptr::copy_nonoverlapping(
                self.base.as_ptr().add(old.offset),
                self.base.as_ptr().add(new.offset),
                keep,
            );
            if zero_tail && new.len > keep {
                ptr::write_bytes(self.base.as_ptr().add(new.offset + keep), 0, new.len - keep);
            }
        }
        Ok(new)
    }

    /// Rewind the bump pointer to zero.
    ///
    /// Committed pages are deliberately retained, so refilling the arena
    /// after a reset pays no new commit calls; committed memory only
    /// returns to the OS when the arena is dropped. Every outstanding
    /// [`Block`] becomes stale, and the bytes they covered are not wiped
    /// — if sensitive data was stored, the next occupant can observe it
    /// unless allocated zeroed.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Scratch-region rollback point restore.
    pub(crate) fn rewind_to(&mut self, offset: usize) {
        debug_assert!(offset <= self.committed);
        self.offset = offset;
    }

    /// Shared view of a block's bytes.
    ///
    /// # Panics
    ///
    /// Panics if `block` does not lie within the allocated prefix — in
    /// particular, if it went stale through a reset or scratch rollback.
    pub fn slice(&self, block: Block) -> &[u8] {
        self.check_block(block);
        // SAFETY: the checked range lies within the committed prefix, and
        // the borrow ties it to `&self`.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr().add(block.offset), block.len) }
    }

    /// Mutable view of a block's bytes.
    ///
    /// # Panics
    ///
    /// Panics if `block` does not lie within the allocated prefix.
    pub fn slice_mut(&mut self, block: Block) -> &mut [u8] {
        self.check_block(block);
        // SAFETY: the checked range lies within the committed prefix, and
        // the exclusive borrow ties it to `&mut self`.
        unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr().add(block.offset), block.len) }
    }

    /// Raw pointer to a block's first byte.
    ///
    /// The address is valid until the arena's next [`reset`](Self::reset),
    /// enclosing scratch rollback, or drop. Keeping it alive past any of
    /// those is the caller's obligation to avoid — nothing checks at use
    /// time.
    ///
    /// # Panics
    ///
    /// Panics if `block` does not lie within the allocated prefix.
    pub fn ptr(&self, block: Block) -> NonNull<u8> {
        self.check_block(block);
        // SAFETY: `base + offset` stays within the owned reservation and
        // is therefore non-null.
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(block.offset)) }
    }

    #[track_caller]
    fn check_block(&self, block: Block) {
        assert!(
            block.end() <= self.offset,
            "{block} outside the allocated prefix (offset {})",
            self.offset
        );
    }

    /// Bytes allocated since the last reset (the bump pointer).
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Size of the prefix currently backed by physical memory.
    pub fn committed_bytes(&self) -> usize {
        self.committed
    }

    /// Total reserved span size, fixed at creation.
    pub fn reserved_bytes(&self) -> usize {
        self.reserved
    }

    /// Bytes left between the bump pointer and the reservation end.
    pub fn remaining(&self) -> usize {
        self.reserved - self.offset
    }

    /// OS page size cached at construction.
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: `base` is the reservation obtained at construction with
        // exactly `reserved` bytes, released exactly once here.
        unsafe { vm::release(self.base.as_ptr(), self.reserved) };
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("reserved", &self.reserved)
            .field("committed", &self.committed)
            .field("offset", &self.offset)
            .field("page_size", &self.page_size)
            .finish()
    }
}
