//! `wepoll`-backed selector.
//!
//! `wepoll` (bound here through the `wepoll-ffi` crate) is a user-space
//! reimplementation of the Linux epoll API for Windows, internally built
//! on IOCP and AFD polling. It exposes the exact
//! `epoll_create1`/`epoll_ctl`/`epoll_wait` call shape as Linux epoll, so
//! this module mirrors `sys::unix::selector` almost line for line instead
//! of reimplementing the teacher crate's own ~7,000-line hand-rolled
//! completion-port backend — see DESIGN.md for why.
use std::io;
use std::os::windows::io::RawSocket;
use std::time::Duration;

use wepoll_ffi as we;

use crate::event::{Event, Interest};

#[derive(Debug)]
pub(crate) struct Selector {
    handle: we::HANDLE,
}

// SAFETY: wepoll's handle is safe to share/send across threads; the
// underlying IOCP it wraps is documented as thread-safe by Microsoft.
unsafe impl Send for Selector {}
unsafe impl Sync for Selector {}

impl Selector {
    pub(crate) fn new() -> io::Result<Selector> {
        let handle = unsafe { we::epoll_create1(0) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Selector { handle })
    }

    pub(crate) fn add(&self, sock: RawSocket, interest: Interest) -> io::Result<()> {
        self.ctl(we::EPOLL_CTL_ADD as i32, sock, interest)
    }

    pub(crate) fn modify(&self, sock: RawSocket, interest: Interest) -> io::Result<()> {
        self.ctl(we::EPOLL_CTL_MOD as i32, sock, interest)
    }

    pub(crate) fn remove(&self, sock: RawSocket) -> io::Result<()> {
        let mut ev = we::epoll_event {
            events: 0,
            data: we::epoll_data { sock: sock as we::SOCKET },
        };
        let ret = unsafe {
            we::epoll_ctl(
                self.handle,
                we::EPOLL_CTL_DEL as i32,
                sock as we::SOCKET,
                &mut ev,
            )
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn ctl(&self, op: i32, sock: RawSocket, interest: Interest) -> io::Result<()> {
        let mut events = we::EPOLLET;
        if interest.is_readable() {
            events |= we::EPOLLIN;
        }
        if interest.is_writable() {
            events |= we::EPOLLOUT;
        }
        let mut ev = we::epoll_event {
            events: events as u32,
            data: we::epoll_data { sock: sock as we::SOCKET },
        };
        let ret = unsafe { we::epoll_ctl(self.handle, op, sock as we::SOCKET, &mut ev) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub(crate) fn select(&self, events: &mut Events, timeout: Option<Duration>) -> io::Result<()> {
        let timeout_ms = timeout
            .map(|to| to.as_millis() as i32)
            .unwrap_or(-1);

        events.raw.clear();
        events
            .raw
            .resize(events.raw.capacity(), unsafe { std::mem::zeroed() });
        let n = unsafe {
            we::epoll_wait(
                self.handle,
                events.raw.as_mut_ptr(),
                events.raw.len() as i32,
                timeout_ms,
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        events.raw.truncate(n as usize);
        Ok(())
    }
}

impl Drop for Selector {
    fn drop(&mut self) {
        unsafe {
            we::epoll_close(self.handle);
        }
    }
}

#[derive(Debug)]
pub(crate) struct Events {
    raw: Vec<we::epoll_event>,
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
            fd: unsafe { raw.data.sock } as RawSocket,
            readable: raw.events & we::EPOLLIN != 0,
            writable: raw.events & we::EPOLLOUT != 0,
            error: raw.events & we::EPOLLERR != 0,
            hangup: raw.events & we::EPOLLHUP != 0,
        })
    }
}
