//! Benchmark profiles and utilities for the Loam arena allocator.
//!
//! Provides pre-built arena configurations so every benchmark measures
//! against the same reservation sizes:
//!
//! - [`reference_arena`]: 256 MiB reservation, the size the container
//!   library provisions per worker
//! - [`small_arena`]: 1 MiB reservation for commit-path benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use loam_arena::{kib, mib, Arena, ArenaConfig};

/// Build the reference benchmark arena: 256 MiB of reserved address space.
pub fn reference_arena() -> Arena {
    Arena::new(ArenaConfig::new(mib(256))).expect("address-space reservation")
}

/// Build a small arena whose commit boundary is crossed early and often.
pub fn small_arena() -> Arena {
    Arena::new(ArenaConfig::new(mib(1))).expect("address-space reservation")
}

/// Allocation sizes exercised by the throughput benchmarks.
pub const ALLOC_SIZES: [usize; 3] = [64, kib(1), kib(16)];
