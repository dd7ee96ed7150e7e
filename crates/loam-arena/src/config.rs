//! Arena configuration parameters.

/// Byte count of `n` kibibytes.
pub const fn kib(n: usize) -> usize {
    n << 10
}

/// Byte count of `n` mebibytes.
pub const fn mib(n: usize) -> usize {
    n << 20
}

/// Byte count of `n` gibibytes.
pub const fn gib(n: usize) -> usize {
    n << 30
}

/// Configuration for an [`Arena`](crate::Arena).
///
/// Address space is cheap on 64-bit platforms: only the pages the bump
/// pointer actually reaches are ever backed by physical memory, so the
/// reservation can be sized for the worst case rather than the expected
/// one. Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Total address-space reservation in bytes.
    ///
    /// Rounded up to the OS page size when the arena is created. The
    /// reservation is a hard ceiling: an arena never grows past it.
    /// Default: 1 GiB.
    pub reserve_size: usize,
}

impl ArenaConfig {
    /// Default reservation: 1 GiB of address space.
    pub const DEFAULT_RESERVE_SIZE: usize = gib(1);

    /// Create a config with the given reservation size.
    pub fn new(reserve_size: usize) -> Self {
        Self { reserve_size }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RESERVE_SIZE)
    }
}
