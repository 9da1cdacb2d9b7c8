//! Platform backends.
//!
//! Exactly one of these compiles for a given target: `epoll` on
//! Linux/Android, `wepoll` (via the `wepoll-ffi` crate) on Windows. Both
//! expose the same shape — `Selector::{new, add, modify, remove, select}`
//! and a `SysEvents` type iterable into [`crate::event::Event`]s — so the
//! reactor and dispatch code above this module are written once.

#[cfg(unix)]
pub(crate) use unix::{
    accept, bind_listener, close_descriptor, local_addr, raise_fd_limit, recv, send, set_nodelay,
    waker::Waker, Events as SysEvents, Selector,
};

#[cfg(unix)]
#[path = "unix/mod.rs"]
pub(crate) mod unix;

#[cfg(windows)]
pub(crate) use windows::{
    accept, bind_listener, close_descriptor, local_addr, raise_fd_limit, recv, send, set_nodelay,
    waker::Waker, Events as SysEvents, Selector,
};

#[cfg(windows)]
#[path = "windows/mod.rs"]
pub(crate) mod windows;
