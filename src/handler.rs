use crate::descriptor::RawDescriptor;
use crate::error::Error;
use crate::reactor::Reactor;

/// The embedder's callback surface.
///
/// One `Handler` is supplied to [`Reactor::run`] and driven exclusively
/// from the reactor's own thread — none of these methods are ever
/// called concurrently, and none of them are called re-entrantly from
/// within another callback. An implementation that blocks inside any of
/// these methods blocks the entire event loop; long-running work
/// belongs on another thread, handed off through whatever channel the
/// embedder chooses.
///
/// Every callback receives the `&mut Reactor` that is currently
/// dispatching it, so `send`/`close` can be called directly and
/// synchronously — the capability-interface reading of the original
/// "inheritance by overridable methods" design: the reactor owns the
/// handler, the handler owns nothing the reactor also owns, and
/// connections are addressed by the raw descriptor the connection table
/// is itself keyed on (see [`Reactor::connection`] for the endpoint/
/// open-state accessor).
///
/// Every method has a default no-op body so an embedder only overrides
/// what it cares about.
pub trait Handler {
    /// Called once a registered listener has started accepting
    /// connections.
    fn on_listen_success(&mut self, reactor: &mut Reactor) {
        let _ = reactor;
    }

    /// Called once [`Reactor::stop`] has fully drained the loop and all
    /// connections have been closed.
    fn on_shutdown_success(&mut self, reactor: &mut Reactor) {
        let _ = reactor;
    }

    /// Called when `wait()` returns with no ready events before the
    /// idle timeout elapses — i.e. every time the loop goes idle.
    fn on_waiting_for_activity(&mut self, reactor: &mut Reactor) {
        let _ = reactor;
    }

    /// Called once per newly accepted connection, before any
    /// [`Handler::on_message`] call for it.
    fn on_opened(&mut self, reactor: &mut Reactor, fd: RawDescriptor) {
        let _ = (reactor, fd);
    }

    /// Called with each chunk of bytes drained from a readable
    /// connection. May be called multiple times per loop iteration if
    /// the peer sent more than one read's worth of data.
    fn on_message(&mut self, reactor: &mut Reactor, fd: RawDescriptor, bytes: &[u8]) {
        let _ = (reactor, fd, bytes);
    }

    /// Called once a connection has been fully closed and erased from
    /// the reactor's table.
    fn on_closed(&mut self, reactor: &mut Reactor, fd: RawDescriptor) {
        let _ = (reactor, fd);
    }

    /// Called for non-fatal errors the reactor encounters while
    /// running (transient accept failures, connection I/O failures).
    /// Fatal errors are returned directly from [`Reactor::run`]
    /// instead.
    fn on_exception(&mut self, reactor: &mut Reactor, err: &Error) {
        let _ = (reactor, err);
    }
}
