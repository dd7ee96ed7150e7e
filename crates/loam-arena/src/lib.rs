//! Demand-paged arena allocation for the Loam container library.
//!
//! An [`Arena`] reserves a large span of virtual address space at
//! creation and commits physical pages lazily, one page boundary at a
//! time, as a bump pointer consumes it. Allocation is a pointer bump;
//! release is wholesale — [`Arena::reset`] rewinds the bump pointer and
//! dropping the arena returns the entire span to the OS. Individual
//! blocks are never freed.
//!
//! # Architecture
//!
//! ```text
//! Arena (exclusive owner of one reserved span)
//! ├── vm        reserve / commit / release — the only syscall site
//! ├── Block     (offset, len) handles, resolved through the arena
//! └── Scratch   checkpoint/rollback guard over the bump pointer
//! ```
//!
//! # Allocation contract
//!
//! The Loam containers (hash table, AVL tree, dynamic array, deque,
//! queue, stack, string builder/view, priority queue) perform no memory
//! management of their own. They consume exactly four operations:
//! [`Arena::alloc`], [`Arena::realloc`], [`Arena::reset`], and drop —
//! and never touch OS memory primitives directly.
//!
//! Every block is a borrow scoped to "until the next reset, enclosing
//! scratch rollback, or drop" of its arena. The safe accessors enforce
//! this; raw pointers from [`Arena::ptr`] are the caller's obligation.
//!
//! # Example
//!
//! ```
//! use loam_arena::{mib, Arena, ArenaConfig};
//!
//! let mut arena = Arena::new(ArenaConfig::new(mib(64)))?;
//! let block = arena.alloc_zeroed(256, 16)?;
//! arena.slice_mut(block)[0] = 7;
//!
//! let mut scratch = arena.scratch();
//! let tmp = scratch.alloc(1024, 8)?;
//! scratch.slice_mut(tmp).fill(0xAB);
//! scratch.end(); // rewinds past `tmp`
//!
//! assert_eq!(arena.used(), 256);
//! # Ok::<(), loam_arena::ArenaError>(())
//! ```
//!
//! # Concurrency
//!
//! Single-threaded by design: the check-commit-advance sequence is not
//! atomic and the arena holds no locks, so [`Arena`] is deliberately
//! neither `Send` nor `Sync`. Give each thread its own arena, or wrap a
//! shared one in an external mutex.
//!
//! # Safety
//!
//! `unsafe` code is confined to two modules: `vm` (the syscalls) and
//! `arena` (pointer arithmetic inside the owned span). Everything else
//! is `#![deny(unsafe_code)]`-clean.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod align;
pub mod arena;
pub mod config;
pub mod error;
pub mod scratch;
mod vm;

// Public re-exports for the primary API surface.
pub use arena::{Arena, Block};
pub use config::{gib, kib, mib, ArenaConfig};
pub use error::ArenaError;
pub use scratch::Scratch;
