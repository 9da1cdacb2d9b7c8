use std::io;

use crate::descriptor::{Descriptor, RawDescriptor};
use crate::endpoint::Endpoint;
use crate::sys;

/// Ownership of one accepted descriptor together with its local and
/// remote endpoints.
///
/// Created by the reactor on a successful `accept`; the reactor is the
/// sole owner for the purposes of closing the descriptor (see
/// [`Descriptor`]'s doc comment). `send`/`recv` here are the raw,
/// non-blocking primitives the reactor's read-drain and write-flush
/// algorithms use internally — they are not meant to be called directly
/// by an embedder outside of those algorithms; the public surface for
/// sending bytes is [`crate::Reactor::send`].
#[derive(Debug)]
pub struct Connection {
    descriptor: Descriptor,
    local: Endpoint,
    remote: Endpoint,
    open: bool,
}

impl Connection {
    pub(crate) fn new(descriptor: Descriptor, local: Endpoint, remote: Endpoint) -> Connection {
        Connection {
            descriptor,
            local,
            remote,
            open: true,
        }
    }

    pub fn local_endpoint(&self) -> &Endpoint {
        &self.local
    }

    pub fn remote_endpoint(&self) -> &Endpoint {
        &self.remote
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn mark_closed(&mut self) {
        self.open = false;
    }

    pub fn raw_fd(&self) -> RawDescriptor {
        self.descriptor.raw()
    }

    /// Sets `TCP_NODELAY`. Documented in §6 as optional and unset by
    /// default — the reactor never calls this itself; it's a
    /// convenience the embedder can reach for from `on_opened`.
    pub fn set_nodelay(&self, enable: bool) -> io::Result<()> {
        sys::set_nodelay(self.descriptor.raw(), enable)
    }

    /// Non-blocking recv into `buf`. Used internally by the read-drain
    /// algorithm (§4.4); `Ok(0)` means the peer closed its write side.
    pub(crate) fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        sys::recv(self.descriptor.raw(), buf)
    }

    /// Non-blocking send with "no SIGPIPE" semantics. Used internally by
    /// the write-flush algorithm (§4.5).
    pub(crate) fn send(&self, buf: &[u8]) -> io::Result<usize> {
        sys::send(self.descriptor.raw(), buf)
    }

    /// Closes the underlying descriptor. Called exactly once, from the
    /// reactor's close-and-erase path, never from `Drop` — see
    /// [`Descriptor`]. A no-op if already closed.
    pub(crate) fn close(&mut self) {
        if !self.descriptor.is_valid() {
            return;
        }
        let raw = self.descriptor.take();
        sys::close_descriptor(raw);
    }
}
