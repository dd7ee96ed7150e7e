//! The OS virtual-memory boundary.
//!
//! Three primitives back the arena: reserve a span of address space with
//! no access rights, grant read/write access to a page-aligned range
//! inside it, and release the whole span. This module is the only
//! syscall site in the crate; everything above it works in offsets.

#![allow(unsafe_code)]

#[cfg(not(unix))]
compile_error!("loam-arena requires a Unix virtual-memory interface (mmap/mprotect/munmap)");

use std::io;
use std::ptr::{self, NonNull};

/// Raw OS error code captured at the failure site.
pub(crate) type Errno = i32;

fn last_errno() -> Errno {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Query the system page size.
pub(crate) fn page_size() -> Result<usize, Errno> {
    // SAFETY: sysconf is a pure query with no pointer preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size < 1 {
        return Err(last_errno());
    }
    Ok(size as usize)
}

/// Reserve `size` bytes of address space with no access rights and no
/// physical backing.
pub(crate) fn reserve(size: usize) -> Result<NonNull<u8>, Errno> {
    // SAFETY: an anonymous private mapping with a null placement hint has
    // no pointer preconditions; the kernel chooses the address.
    let block = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if block == libc::MAP_FAILED {
        return Err(last_errno());
    }
    match NonNull::new(block.cast::<u8>()) {
        Some(base) => Ok(base),
        // mmap only returns null when asked to map address zero, which
        // the null hint above never requests.
        None => Err(last_errno()),
    }
}

/// Grant read/write access to `size` bytes starting at `addr`, backing
/// them with physical memory on first touch.
///
/// # Safety
///
/// `addr..addr + size` must lie within a reservation obtained from
/// [`reserve`] and be page-aligned at both ends.
pub(crate) unsafe fn commit(addr: *mut u8, size: usize) -> Result<(), Errno> {
    // SAFETY: range validity is the caller's contract above.
    let rc = unsafe { libc::mprotect(addr.cast(), size, libc::PROT_READ | libc::PROT_WRITE) };
    if rc != 0 {
        return Err(last_errno());
    }
    Ok(())
}

/// Release an entire reservation back to the OS.
///
/// # Safety
///
/// `addr` must be the base of a reservation of exactly `size` bytes
/// obtained from [`reserve`] and not yet released.
pub(crate) unsafe fn release(addr: *mut u8, size: usize) {
    // Failure leaves no recovery path; the span is abandoned either way.
    // SAFETY: range validity is the caller's contract above.
    let _ = unsafe { libc::munmap(addr.cast(), size) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_a_power_of_two() {
        let size = page_size().unwrap();
        assert!(size.is_power_of_two());
        assert!(size >= 512);
    }

    #[test]
    fn reserve_commit_release_round_trip() {
        let size = page_size().unwrap();
        let base = reserve(size).unwrap();
        unsafe {
            commit(base.as_ptr(), size).unwrap();
            // Committed memory must be writable and zero-filled.
            assert_eq!(*base.as_ptr(), 0);
            *base.as_ptr() = 0xA5;
            assert_eq!(*base.as_ptr(), 0xA5);
            release(base.as_ptr(), size);
        }
    }

    #[test]
    fn zero_sized_reserve_is_refused_by_the_os() {
        assert!(reserve(0).is_err());
    }
}
