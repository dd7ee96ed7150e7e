//! Checkpoint/rollback scratch regions over an arena's bump pointer.
//!
//! A [`Scratch`] records the arena's offset when opened and restores it
//! when dropped. Allocations made through the guard are ordinary bump
//! allocations against the same arena; closing the region makes their
//! memory reusable by the next allocation without wiping it.

use std::ops::{Deref, DerefMut};

use crate::arena::Arena;

/// Rollback guard for short-lived, nested temporary allocations.
///
/// Opened with [`Arena::scratch`]. While the guard lives it holds the
/// arena's unique borrow, so a sibling region cannot be opened next to
/// it — nested regions are opened *through* the guard, which derefs to
/// [`Arena`]. Nesting is therefore well-bracketed by construction; there
/// is no rollback point to corrupt.
///
/// Dropping the guard (or calling [`end`](Self::end)) rewinds the bump
/// pointer to the snapshot taken at open time. Every [`Block`] carved
/// after the snapshot goes stale at that moment: resolving one through
/// the arena panics, and any raw pointer obtained from
/// [`Arena::ptr`] dangles — keeping such a pointer alive past the
/// region is the caller's obligation to avoid.
///
/// The rolled-back bytes are not wiped, only marked reusable. If
/// sensitive data was written inside the region, the next occupant can
/// observe it unless it allocates zeroed.
///
/// [`Block`]: crate::Block
#[must_use]
pub struct Scratch<'a> {
    arena: &'a mut Arena,
    snapshot: usize,
}

impl Arena {
    /// Open a scratch region at the current bump pointer.
    pub fn scratch(&mut self) -> Scratch<'_> {
        let snapshot = self.used();
        Scratch {
            arena: self,
            snapshot,
        }
    }
}

impl Scratch<'_> {
    /// Offset the arena rewinds to when this region closes.
    pub fn snapshot(&self) -> usize {
        self.snapshot
    }

    /// Bytes allocated inside this region so far.
    pub fn used_in_region(&self) -> usize {
        self.arena.used() - self.snapshot
    }

    /// Close the region, rewinding the arena's bump pointer.
    ///
    /// Equivalent to dropping the guard; provided for call sites where
    /// the rollback point deserves a name.
    pub fn end(self) {}
}

impl Deref for Scratch<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        self.arena
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        self.arena
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        self.arena.rewind_to(self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_restores_the_offset_exactly() {
        let mut arena = Arena::with_reserve(1).unwrap();
        let _ = arena.alloc(100, 8).unwrap();

        let mut scratch = arena.scratch();
        assert_eq!(scratch.snapshot(), 100);
        let _ = scratch.alloc(50, 4).unwrap();
        let _ = scratch.alloc(30, 2).unwrap();
        assert_eq!(scratch.used_in_region(), 80);
        scratch.end();

        assert_eq!(arena.used(), 100);
    }

    #[test]
    fn drop_is_equivalent_to_end() {
        let mut arena = Arena::with_reserve(1).unwrap();
        let _ = arena.alloc(64, 8).unwrap();
        {
            let mut scratch = arena.scratch();
            let _ = scratch.alloc(128, 16).unwrap();
        }
        assert_eq!(arena.used(), 64);
    }

    #[test]
    fn rollback_is_independent_of_bytes_allocated_inside() {
        let mut arena = Arena::with_reserve(crate::config::kib(64)).unwrap();
        let _ = arena.alloc(7, 1).unwrap();

        let mut scratch = arena.scratch();
        for _ in 0..100 {
            let _ = scratch.alloc(513, 4).unwrap();
        }
        scratch.end();

        assert_eq!(arena.used(), 7);
    }

    #[test]
    fn next_allocation_reuses_the_rolled_back_address() {
        let mut arena = Arena::with_reserve(1).unwrap();
        let _ = arena.alloc(100, 8).unwrap();

        let mut scratch = arena.scratch();
        let inside = scratch.alloc(50, 8).unwrap();
        let inside_addr = scratch.ptr(inside);
        scratch.end();

        let after = arena.alloc(50, 8).unwrap();
        assert_eq!(arena.ptr(after), inside_addr);
        assert_eq!(arena.used(), 154); // 4 bytes of padding before each
    }

    #[test]
    fn nested_regions_unwind_in_order() {
        let mut arena = Arena::with_reserve(1).unwrap();
        let _ = arena.alloc(10, 1).unwrap();

        let mut outer = arena.scratch();
        let _ = outer.alloc(20, 1).unwrap();
        {
            let mut inner = outer.scratch();
            let _ = inner.alloc(40, 1).unwrap();
            assert_eq!(inner.used(), 70);
        }
        assert_eq!(outer.used(), 30);
        outer.end();

        assert_eq!(arena.used(), 10);
    }

    #[test]
    fn committed_pages_survive_the_rollback() {
        let mut arena = Arena::with_reserve(crate::config::kib(64)).unwrap();
        let page = arena.page_size();

        let mut scratch = arena.scratch();
        let _ = scratch.alloc(3 * page, 8).unwrap();
        let committed = scratch.committed_bytes();
        scratch.end();

        assert_eq!(arena.used(), 0);
        assert_eq!(arena.committed_bytes(), committed);
    }

    #[test]
    #[should_panic(expected = "outside the allocated prefix")]
    fn blocks_from_inside_the_region_are_stale_after_close() {
        let mut arena = Arena::with_reserve(1).unwrap();
        let mut scratch = arena.scratch();
        let block = scratch.alloc(16, 8).unwrap();
        scratch.end();
        let _ = arena.slice(block);
    }
}
