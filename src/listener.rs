use std::io;

use crate::descriptor::Descriptor;
use crate::endpoint::Endpoint;
use crate::error::{Error, ErrorKind, IoResultExt};
use crate::sys;

/// A bound, listening TCP socket: non-blocking, close-on-exec, with
/// `SO_REUSEADDR` set before bind. One `ListenerSocket` is registered
/// with the reactor per call to [`crate::Reactor::register_listener`];
/// the reactor owns it afterward and is responsible for closing it on
/// teardown.
#[derive(Debug)]
pub struct ListenerSocket {
    descriptor: Descriptor,
    local: Endpoint,
}

impl ListenerSocket {
    /// Creates, binds and starts listening on `address:port`, with
    /// `backlog` pending connections queued by the kernel (`backlog <= 0`
    /// requests the OS-defined maximum).
    ///
    /// Any failure in this sequence — socket creation, `SO_REUSEADDR`,
    /// `bind`, or `listen` — is reported as
    /// [`ErrorKind::ListenerSetupFailed`]; the partially-built socket is
    /// closed before the error is returned.
    pub fn bind(address: &Endpoint, backlog: i32) -> Result<ListenerSocket, Error> {
        let addr = address.to_socket_addr()?;
        let raw = sys::bind_listener(addr, backlog)
            .ctx(ErrorKind::ListenerSetupFailed, "bind/listen failed")?;
        let descriptor = unsafe { Descriptor::from_raw(raw) };
        let local = sys::local_addr(raw)
            .map(Endpoint::from_socket_addr)
            .unwrap_or_else(|_| address.clone());
        Ok(ListenerSocket { descriptor, local })
    }

    pub fn local_endpoint(&self) -> &Endpoint {
        &self.local
    }

    pub(crate) fn raw_fd(&self) -> crate::descriptor::RawDescriptor {
        self.descriptor.raw()
    }

    /// Accepts one pending connection, returning the new descriptor's
    /// raw handle, remote endpoint, and local endpoint. `WouldBlock`
    /// signals "no more connections queued right now" — the expected,
    /// non-exceptional end of an accept-loop drain (§4.3).
    pub(crate) fn accept(&self) -> io::Result<(crate::descriptor::RawDescriptor, Endpoint)> {
        let (raw, remote) = sys::accept(self.descriptor.raw())?;
        Ok((raw, Endpoint::from_socket_addr(remote)))
    }

    /// Closes the listening socket. Called once, from reactor teardown.
    pub(crate) fn close(&mut self) {
        if !self.descriptor.is_valid() {
            return;
        }
        let raw = self.descriptor.take();
        sys::close_descriptor(raw);
    }
}
