use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use libc::{EPOLLERR, EPOLLET, EPOLLHUP, EPOLLIN, EPOLLOUT};

use crate::event::{Event, Interest};

/// Thin wrapper over a Linux `epoll` instance.
///
/// Grounded directly on the teacher crate's
/// `src/sys/unix/selector/epoll.rs`: same `epoll_create1`/`epoll_ctl`/
/// `epoll_wait` call shape, generalized so registration always requests
/// edge-triggered mode (the reactor never registers a descriptor any
/// other way) and the token passed through `epoll_event.u64` is simply
/// the raw descriptor, matching the connection table's "keyed by raw
/// descriptor" design.
#[derive(Debug)]
pub(crate) struct Selector {
    ep: OwnedFd,
}

impl Selector {
    pub(crate) fn new() -> io::Result<Selector> {
        // SAFETY: `epoll_create1(2)` ensures the fd is valid.
        let ep = unsafe { OwnedFd::from_raw_fd(syscall!(epoll_create1(libc::EPOLL_CLOEXEC))?) };
        Ok(Selector { ep })
    }

    pub(crate) fn add(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        let mut event = libc::epoll_event {
            events: interest_to_epoll(interest),
            u64: fd as u64,
        };
        syscall!(epoll_ctl(
            self.ep.as_raw_fd(),
            libc::EPOLL_CTL_ADD,
            fd,
            &mut event,
        ))
        .map(|_| ())
    }

    pub(crate) fn modify(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        let mut event = libc::epoll_event {
            events: interest_to_epoll(interest),
            u64: fd as u64,
        };
        syscall!(epoll_ctl(
            self.ep.as_raw_fd(),
            libc::EPOLL_CTL_MOD,
            fd,
            &mut event,
        ))
        .map(|_| ())
    }

    pub(crate) fn remove(&self, fd: RawFd) -> io::Result<()> {
        // The event argument is ignored by EPOLL_CTL_DEL on Linux >= 2.6.9
        // but older kernels require a non-null pointer; the teacher passes
        // one unconditionally and so do we.
        let mut event = libc::epoll_event { events: 0, u64: 0 };
        syscall!(epoll_ctl(
            self.ep.as_raw_fd(),
            libc::EPOLL_CTL_DEL,
            fd,
            &mut event,
        ))
        .map(|_| ())
    }

    pub(crate) fn select(&self, events: &mut Events, timeout: Option<Duration>) -> io::Result<()> {
        let timeout_ms = timeout
            .map(|to| {
                // `Duration::as_millis` truncates; round up so a
                // sub-millisecond timeout doesn't become an immediate
                // return unless the caller explicitly asked for zero.
                to.checked_add(Duration::from_nanos(999_999))
                    .unwrap_or(to)
                    .as_millis() as libc::c_int
            })
            .unwrap_or(-1);

        events.raw.clear();
        events.raw.resize(events.raw.capacity(), libc::epoll_event { events: 0, u64: 0 });
        let n = syscall!(epoll_wait(
            self.ep.as_raw_fd(),
            events.raw.as_mut_ptr(),
            events.raw.len() as i32,
            timeout_ms,
        ))?;
        events.raw.truncate(n as usize);
        Ok(())
    }
}

fn interest_to_epoll(interest: Interest) -> u32 {
    let mut bits = EPOLLET as u32;
    if interest.is_readable() {
        bits |= EPOLLIN as u32;
    }
    if interest.is_writable() {
        bits |= EPOLLOUT as u32;
    }
    bits
}

/// A batch of raw `epoll_event` records.
///
/// Mirrors [`crate::event::Events`]'s doubling-capacity contract at the
/// syscall-facing layer: `with_capacity`/`reserve_to` never shrink.
#[derive(Debug)]
pub(crate) struct Events {
    raw: Vec<libc::epoll_event>,
}

impl Events {
    pub(crate) fn with_capacity(capacity: usize) -> Events {
        Events {
            raw: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub(crate) fn len(&self) -> usize {
        self.raw.len()
    }

    pub(crate) fn reserve_to(&mut self, new_capacity: usize) {
        if new_capacity > self.raw.capacity() {
            self.raw.reserve(new_capacity - self.raw.capacity());
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.raw.iter().map(|raw| Event {
            fd: raw.u64 as RawFd,
            readable: raw.events & (EPOLLIN as u32) != 0,
            writable: raw.events & (EPOLLOUT as u32) != 0,
            error: raw.events & (EPOLLERR as u32) != 0,
            hangup: raw.events & (EPOLLHUP as u32) != 0,
        })
    }
}

// SAFETY: epoll_event is a plain C struct of integers; zeroed is valid.
unsafe impl Send for Selector {}
unsafe impl Sync for Selector {}
