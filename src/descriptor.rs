//! The move-only, single-owner OS descriptor handle.

/// The raw OS handle a connection or listener is identified by: a file
/// descriptor on Unix, a socket handle on Windows. Connections are
/// addressed by this value throughout the public API rather than by an
/// opaque token, matching the data model's "the connection table is
/// keyed on the descriptor itself" design.
#[cfg(unix)]
pub type RawDescriptor = std::os::unix::io::RawFd;
#[cfg(windows)]
pub type RawDescriptor = std::os::windows::io::RawSocket;

#[cfg(unix)]
const INVALID: RawDescriptor = -1;
#[cfg(windows)]
const INVALID: RawDescriptor = windows_sys::Win32::Networking::WinSock::INVALID_SOCKET as RawDescriptor;

/// A move-only wrapper over a raw OS socket handle.
///
/// Ownership transfer (move) invalidates the source, matching the
/// original design's "[m]ove transfers ownership and invalidates the
/// source." Equality and ordering are defined by the underlying integer
/// value.
///
/// Deliberately does **not** close the descriptor on drop — see §9 of
/// the design notes. Closing a descriptor is centralized in whichever
/// component logically owns its lifecycle: [`crate::Connection`] (via
/// the reactor's close-and-erase path) or [`crate::ListenerSocket`]
/// (via reactor teardown). A `Descriptor` that is dropped without its
/// owner explicitly closing it leaks the underlying handle; this is the
/// documented trade-off, not an oversight.
#[derive(Debug)]
pub struct Descriptor {
    raw: RawDescriptor,
}

impl Descriptor {
    /// Takes ownership of an existing raw descriptor.
    ///
    /// # Safety
    ///
    /// `raw` must be a valid, open OS socket handle not already owned by
    /// another `Descriptor`.
    pub(crate) unsafe fn from_raw(raw: RawDescriptor) -> Descriptor {
        Descriptor { raw }
    }

    /// The invalid sentinel descriptor (platform-specific: `-1` on Unix,
    /// `INVALID_SOCKET` on Windows).
    pub(crate) fn invalid() -> Descriptor {
        Descriptor { raw: INVALID }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.raw != INVALID
    }

    pub(crate) fn raw(&self) -> RawDescriptor {
        self.raw
    }

    /// Moves the raw handle out, invalidating `self` in place (the
    /// "ownership transfer invalidates the source" invariant, expressed
    /// without requiring the caller to drop the emptied wrapper
    /// immediately).
    pub(crate) fn take(&mut self) -> RawDescriptor {
        std::mem::replace(&mut self.raw, INVALID)
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Descriptor {}

impl PartialOrd for Descriptor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Descriptor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

#[cfg(unix)]
impl std::os::unix::io::AsRawFd for Descriptor {
    fn as_raw_fd(&self) -> std::os::unix::io::RawFd {
        self.raw
    }
}

#[cfg(windows)]
impl std::os::windows::io::AsRawSocket for Descriptor {
    fn as_raw_socket(&self) -> std::os::windows::io::RawSocket {
        self.raw as std::os::windows::io::RawSocket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sentinel_is_not_valid() {
        assert!(!Descriptor::invalid().is_valid());
    }

    #[test]
    fn take_invalidates_source() {
        let mut d = unsafe { Descriptor::from_raw(7 as RawDescriptor) };
        let moved = d.take();
        assert_eq!(moved, 7 as RawDescriptor);
        assert!(!d.is_valid());
    }

    #[test]
    fn equality_and_order_follow_the_integer() {
        let a = unsafe { Descriptor::from_raw(3 as RawDescriptor) };
        let b = unsafe { Descriptor::from_raw(3 as RawDescriptor) };
        let c = unsafe { Descriptor::from_raw(5 as RawDescriptor) };
        assert_eq!(a, b);
        assert!(a < c);
    }
}
