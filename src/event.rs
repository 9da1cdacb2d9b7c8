//! Readiness interest flags and the event batch handed to the
//! multiplexer's `wait` call.

use std::fmt;
use std::ops;

/// Readiness interests used when registering a descriptor.
///
/// Every descriptor the reactor registers is always monitored in
/// edge-triggered mode (§6: "registers every monitored descriptor in
/// edge-triggered mode"); `Interest` therefore only needs to express
/// read/write, not the edge-triggered bit itself — the selector
/// implementation ORs that in unconditionally.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Interest(u8);

const READABLE: u8 = 0b01;
const WRITABLE: u8 = 0b10;

impl Interest {
    pub const READABLE: Interest = Interest(READABLE);
    pub const WRITABLE: Interest = Interest(WRITABLE);

    pub const fn add(self, other: Interest) -> Interest {
        Interest(self.0 | other.0)
    }

    pub const fn is_readable(self) -> bool {
        self.0 & READABLE != 0
    }

    pub const fn is_writable(self) -> bool {
        self.0 & WRITABLE != 0
    }
}

impl ops::BitOr for Interest {
    type Output = Interest;
    fn bitor(self, rhs: Interest) -> Interest {
        self.add(rhs)
    }
}

impl fmt::Debug for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if self.is_readable() {
            f.write_str("READABLE")?;
            wrote = true;
        }
        if self.is_writable() {
            if wrote {
                f.write_str(" | ")?;
            }
            f.write_str("WRITABLE")?;
        }
        Ok(())
    }
}

/// A single readiness record, as reported by the multiplexer.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub(crate) fd: crate::descriptor::RawDescriptor,
    pub(crate) readable: bool,
    pub(crate) writable: bool,
    pub(crate) error: bool,
    pub(crate) hangup: bool,
}

impl Event {
    pub fn fd(&self) -> crate::descriptor::RawDescriptor {
        self.fd
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn is_hangup(&self) -> bool {
        self.hangup
    }
}

/// A growable buffer of readiness records passed to the multiplexer.
///
/// Initial capacity is 4096; the loop doubles it whenever a `wait` call
/// returns a full batch (every slot filled), on the theory that a full
/// batch means there was more readiness to report than room to report
/// it in. Capacity never shrinks.
pub struct Events {
    inner: crate::sys::SysEvents,
}

pub(crate) const INITIAL_EVENT_BATCH_CAPACITY: usize = 4096;

impl Events {
    pub fn with_capacity(capacity: usize) -> Events {
        Events {
            inner: crate::sys::SysEvents::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Doubles the capacity in place. Never shrinks.
    pub(crate) fn grow(&mut self) {
        let new_capacity = self.inner.capacity() * 2;
        self.inner.reserve_to(new_capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    pub(crate) fn sys_mut(&mut self) -> &mut crate::sys::SysEvents {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_combines_read_and_write() {
        let both = Interest::READABLE | Interest::WRITABLE;
        assert!(both.is_readable());
        assert!(both.is_writable());
        assert!(!Interest::READABLE.is_writable());
    }

    #[test]
    fn event_batch_capacity_doubles_and_never_shrinks() {
        let mut events = Events::with_capacity(INITIAL_EVENT_BATCH_CAPACITY);
        assert_eq!(events.capacity(), INITIAL_EVENT_BATCH_CAPACITY);

        events.grow();
        assert!(events.capacity() >= INITIAL_EVENT_BATCH_CAPACITY * 2);

        let grown = events.capacity();
        events.grow();
        assert!(events.capacity() >= grown * 2);
    }
}
