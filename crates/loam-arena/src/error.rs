//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Every error is returned to the caller; the arena performs no retries
/// and no silent recovery. OS failures carry the `errno` captured at the
/// failure site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The requested reservation size is zero, or rounding it up to the
    /// page size overflows.
    InvalidReserveSize {
        /// Number of bytes requested at construction.
        requested: usize,
    },
    /// The OS declined the address-space reservation (e.g. exhausted
    /// address space). Fatal for this construction attempt.
    ReservationFailed {
        /// Page-rounded size of the attempted reservation.
        size: usize,
        /// OS error code from `mmap`.
        errno: i32,
    },
    /// Zero allocation size, or an alignment that is not a power of two.
    /// A caller bug; retrying the same request cannot succeed.
    InvalidLayout {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment.
        align: usize,
    },
    /// The bump pointer would pass the fixed reservation. Fatal for this
    /// arena instance; recoverable only by provisioning a larger arena
    /// up front, never by automatic growth.
    OutOfReservedSpace {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes left between the bump pointer and the reservation end.
        remaining: usize,
    },
    /// The OS declined to grant read/write access to reserved pages.
    /// Surfaced as-is; no partial commit is recorded.
    CommitFailed {
        /// Size of the attempted commit range in bytes.
        size: usize,
        /// OS error code from `mprotect`.
        errno: i32,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReserveSize { requested } => {
                write!(f, "invalid reserve size: {requested} bytes")
            }
            Self::ReservationFailed { size, errno } => {
                write!(
                    f,
                    "address-space reservation of {size} bytes failed (errno {errno})"
                )
            }
            Self::InvalidLayout { size, align } => {
                write!(
                    f,
                    "invalid layout: size {size}, alignment {align} \
                     (size must be nonzero, alignment a power of two)"
                )
            }
            Self::OutOfReservedSpace {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "out of reserved space: requested {requested} bytes, {remaining} remaining"
                )
            }
            Self::CommitFailed { size, errno } => {
                write!(f, "commit of {size} bytes failed (errno {errno})")
            }
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_fields() {
        let err = ArenaError::OutOfReservedSpace {
            requested: 5000,
            remaining: 3996,
        };
        let text = err.to_string();
        assert!(text.contains("5000"));
        assert!(text.contains("3996"));
    }

    #[test]
    fn os_errors_carry_errno() {
        let err = ArenaError::CommitFailed { size: 4096, errno: 12 };
        assert!(err.to_string().contains("errno 12"));
    }
}
