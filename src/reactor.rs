//! The event loop: registers listeners and connections with the
//! platform multiplexer, drains readiness events, and drives the
//! embedder's [`Handler`] callbacks.
//!
//! Grounded on the teacher crate's `src/poll.rs` (construction,
//! register/reregister/deregister contract, `Events` batch handed to
//! `wait`) generalized from "hand the caller readiness records" to "own
//! the connection table and dispatch callbacks," which `Poll` itself
//! does not do — that half is grounded on `examples/tcp_server.rs`'s
//! `HashMap<Token, TcpStream>` server loop instead, with the token
//! replaced by the raw descriptor per the data model.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, trace, warn};

use crate::buffer::ByteBuffer;
use crate::connection::Connection;
use crate::descriptor::{Descriptor, RawDescriptor};
use crate::endpoint::Endpoint;
use crate::error::{Error, ErrorKind};
use crate::event::{Events, Event, Interest, INITIAL_EVENT_BATCH_CAPACITY};
use crate::handler::Handler;
use crate::listener::ListenerSocket;
use crate::sys;

const READ_DRAIN_BUFFER_SIZE: usize = 64 * 1024;

struct PerConnState {
    conn: Connection,
    outq: VecDeque<ByteBuffer>,
    want_write: bool,
    want_close: bool,
}

/// A cheap, cloneable handle that can request the reactor stop from any
/// thread, or from a signal handler.
///
/// `AtomicBool::store` and the waker's `write(2)` underneath it are both
/// async-signal-safe, satisfying the contract that `stop()` "must be
/// safe to call from a signal handler or any thread" without requiring
/// `Reactor` itself to be `Sync`.
#[derive(Clone)]
pub struct Stopper {
    flag: Arc<AtomicBool>,
    waker: Arc<sys::Waker>,
}

impl Stopper {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let _ = self.waker.wake();
    }
}

/// The single-threaded, edge-triggered TCP event loop.
///
/// Construction, registration, and teardown follow the teacher crate's
/// `Poll`/`Registry` split in spirit but collapse them into one type,
/// since this crate's `Reactor` — unlike `Poll` — owns the connection
/// table and the callback dispatch loop itself rather than handing raw
/// readiness records back to the caller.
pub struct Reactor {
    selector: sys::Selector,
    waker: Arc<sys::Waker>,
    events: Events,
    listener: Option<ListenerSocket>,
    table: HashMap<RawDescriptor, PerConnState>,
    pending_closes: Vec<RawDescriptor>,
    stop_flag: Arc<AtomicBool>,
}

impl Reactor {
    /// Raises the process descriptor limit (best-effort, non-fatal on
    /// failure), creates the multiplexer, and allocates the initial
    /// 4096-entry event batch. Fails only if the multiplexer itself
    /// cannot be created.
    pub fn construct(max_fds_hint: u64) -> Result<Reactor, Error> {
        sys::raise_fd_limit(max_fds_hint);

        let selector = sys::Selector::new()
            .map_err(|err| Error::from_io(ErrorKind::InitFailed, "Reactor::construct", err))?;
        let waker = sys::Waker::new()
            .map_err(|err| Error::from_io(ErrorKind::InitFailed, "Reactor::construct", err))?;
        let waker = Arc::new(waker);

        selector
            .add(waker.raw(), Interest::READABLE)
            .map_err(|err| Error::from_io(ErrorKind::InitFailed, "Reactor::construct", err))?;

        Ok(Reactor {
            selector,
            waker,
            events: Events::with_capacity(INITIAL_EVENT_BATCH_CAPACITY),
            listener: None,
            table: HashMap::new(),
            pending_closes: Vec::new(),
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// A cloneable, thread- and signal-handler-safe stop handle. Obtain
    /// one before calling [`Reactor::run`] if another thread (or a
    /// signal handler) needs to shut the loop down.
    pub fn stopper(&self) -> Stopper {
        Stopper {
            flag: self.stop_flag.clone(),
            waker: self.waker.clone(),
        }
    }

    /// Registers the listener for edge-triggered read-readiness. At
    /// most one listener per reactor.
    pub fn register_listener(&mut self, listener: ListenerSocket) -> Result<(), Error> {
        self.selector
            .add(listener.raw_fd(), Interest::READABLE)
            .map_err(|err| Error::from_io(ErrorKind::RegisterFailed, "register_listener", err))?;
        trace!("registered listener fd={:?} for READ|ET", listener.raw_fd());
        self.listener = Some(listener);
        Ok(())
    }

    /// The endpoints and open/closed state of an open connection, keyed
    /// by its raw descriptor. Returns `None` once the connection has
    /// been erased from the table.
    pub fn connection(&self, fd: RawDescriptor) -> Option<&Connection> {
        self.table.get(&fd).map(|st| &st.conn)
    }

    /// Sets the stop flag directly, equivalent to `self.stopper().stop()`.
    /// Idempotent — calling it again after the loop has already exited
    /// is a no-op. Provided for the common case of stopping from inside
    /// a callback running on the I/O thread itself.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        let _ = self.waker.wake();
    }

    /// Appends `bytes` to `fd`'s output queue and arms the multiplexer
    /// for write-readiness. Safe to call only from the I/O thread
    /// (i.e., from inside a [`Handler`] callback). A no-op if `fd` is
    /// not an open connection.
    pub fn send(&mut self, fd: RawDescriptor, bytes: &[u8]) {
        let Some(st) = self.table.get_mut(&fd) else {
            return;
        };
        st.outq.push_back(ByteBuffer::from_bytes(bytes.to_vec()));
        if !st.want_write {
            st.want_write = true;
            match self.selector.modify(fd, Interest::READABLE | Interest::WRITABLE) {
                Ok(()) => trace!("rearmed {fd:?} for READ|WRITE|ET"),
                Err(err) => warn!("failed to rearm {fd:?} for write readiness: {err}"),
            }
        }
    }

    /// Marks `fd` for closure. Deferred: actual teardown happens on a
    /// later loop iteration, once any pending output has drained (or an
    /// error/hangup makes further flushing moot). Safe to call only
    /// from the I/O thread. Idempotent — closing an already-closed or
    /// already-pending-close connection is a silent no-op.
    pub fn close(&mut self, fd: RawDescriptor) {
        let Some(st) = self.table.get_mut(&fd) else {
            return;
        };
        st.want_close = true;
        self.pending_closes.push(fd);
        let _ = self.waker.wake();
    }

    /// Runs the event loop until [`Reactor::stop`]/[`Stopper::stop`] is
    /// called or a fatal multiplexer error occurs.
    pub fn run(&mut self, handler: &mut dyn Handler, idle_timeout_ms: u64) -> Result<(), Error> {
        handler.on_listen_success(self);
        let idle_timeout = Some(Duration::from_millis(idle_timeout_ms));

        while !self.stop_flag.load(Ordering::SeqCst) {
            handler.on_waiting_for_activity(self);

            match self.selector.select(self.events.sys_mut(), idle_timeout) {
                Ok(()) => {}
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    let err = Error::from_io(ErrorKind::FatalLoop, "Reactor::run", err);
                    error!("fatal multiplexer error, shutting down: {err}");
                    handler.on_exception(self, &err);
                    self.teardown(handler);
                    handler.on_shutdown_success(self);
                    return Err(err);
                }
            }

            if self.events.len() == self.events.capacity() {
                self.events.grow();
                debug!("event batch saturated; grew to {}", self.events.capacity());
            }

            self.drain_pending_closes(handler);

            let ready: Vec<Event> = self.events.iter().collect();
            for record in ready {
                let fd = record.fd();
                if fd == self.waker.raw() {
                    let _ = self.waker.drain();
                    continue;
                }
                if let Some(listener) = &self.listener {
                    if fd == listener.raw_fd() {
                        self.accept_loop(handler);
                        continue;
                    }
                }
                self.dispatch_one(fd, &record, handler);
            }

            if self.listener.is_some() {
                self.accept_loop(handler);
            }
        }

        self.teardown(handler);
        handler.on_shutdown_success(self);
        Ok(())
    }

    fn drain_pending_closes(&mut self, handler: &mut dyn Handler) {
        for fd in std::mem::take(&mut self.pending_closes) {
            let still_pending = self
                .table
                .get(&fd)
                .map(|st| st.want_close && !st.want_write)
                .unwrap_or(false);
            if still_pending {
                self.close_and_erase(fd, handler);
            }
        }
    }

    fn dispatch_one(&mut self, fd: RawDescriptor, record: &Event, handler: &mut dyn Handler) {
        if !self.table.contains_key(&fd) {
            return;
        }

        let outq_nonempty = self.table.get(&fd).map(|st| !st.outq.is_empty()).unwrap_or(false);
        if outq_nonempty {
            let flushed = self.write_flush(fd, handler);
            self.rearm_after_flush(fd, flushed);
        }

        if record.is_writable() {
            let flushed = self.write_flush(fd, handler);
            if flushed {
                self.rearm_after_flush(fd, true);
            }
        }

        if self.close_if_finished(fd, handler) {
            return;
        }

        if record.is_error() || record.is_hangup() {
            let want_write = self.table.get(&fd).map(|st| st.want_write).unwrap_or(false);
            if !want_write {
                self.close_and_erase(fd, handler);
                return;
            }
        }

        if record.is_readable() {
            self.read_drain(fd, handler);
        }
    }

    /// Rearms `fd` after a flush attempt: drops write-readiness once the
    /// queue is empty, arms it once the queue is not. Note the rearm
    /// mask on the "still pending" branch is `READ | WRITE | ET`, never
    /// `WRITE`-only — see the design notes on the write-arm mask.
    fn rearm_after_flush(&mut self, fd: RawDescriptor, flushed: bool) {
        let Some(st) = self.table.get_mut(&fd) else {
            return;
        };
        if flushed {
            if st.want_write {
                st.want_write = false;
                if let Err(err) = self.selector.modify(fd, Interest::READABLE) {
                    warn!("failed to rearm {fd:?} read-only: {err}");
                }
            }
        } else if !st.want_write {
            st.want_write = true;
            if let Err(err) = self.selector.modify(fd, Interest::READABLE | Interest::WRITABLE) {
                warn!("failed to rearm {fd:?} for write readiness: {err}");
            }
        }
    }

    /// Closes `fd` if a deferred close is pending and the write side has
    /// finished draining. Returns whether the connection was erased.
    fn close_if_finished(&mut self, fd: RawDescriptor, handler: &mut dyn Handler) -> bool {
        let ready = self
            .table
            .get(&fd)
            .map(|st| st.want_close && !st.want_write)
            .unwrap_or(false);
        if ready {
            self.close_and_erase(fd, handler);
        }
        ready
    }

    fn accept_loop(&mut self, handler: &mut dyn Handler) {
        loop {
            let accepted = match &self.listener {
                Some(listener) => listener.accept(),
                None => return,
            };
            match accepted {
                Ok((raw, remote)) => self.finish_accept(raw, remote, handler),
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return,
                Err(err) => {
                    let err = Error::from_io(ErrorKind::TransientAcceptFailure, "accept_loop", err);
                    warn!("accept loop bailed out early: {err}");
                    handler.on_exception(self, &err);
                    return;
                }
            }
        }
    }

    fn finish_accept(&mut self, raw: RawDescriptor, remote: Endpoint, handler: &mut dyn Handler) {
        let local = sys::local_addr(raw)
            .map(Endpoint::from_socket_addr)
            .unwrap_or_else(|_| remote.clone());

        if let Err(err) = self.selector.add(raw, Interest::READABLE) {
            sys::close_descriptor(raw);
            let err = Error::from_io(ErrorKind::RegisterFailed, "accept_loop", err);
            handler.on_exception(self, &err);
            return;
        }
        trace!("registered accepted connection fd={raw:?} for READ|ET");

        let descriptor = unsafe { Descriptor::from_raw(raw) };
        let conn = Connection::new(descriptor, local, remote);
        self.table.insert(
            raw,
            PerConnState {
                conn,
                outq: VecDeque::new(),
                want_write: false,
                want_close: false,
            },
        );
        debug!("accepted connection fd={raw:?}");
        handler.on_opened(self, raw);
    }

    /// Drains `fd` until the kernel reports "would block," delivering
    /// each non-empty chunk to [`Handler::on_message`]. Stops early if a
    /// close becomes pending partway through (e.g. the handler itself
    /// calls `close` from `on_message`).
    fn read_drain(&mut self, fd: RawDescriptor, handler: &mut dyn Handler) {
        let mut buf = [0u8; READ_DRAIN_BUFFER_SIZE];
        loop {
            let still_open = self.table.get(&fd).map(|st| !st.want_close).unwrap_or(false);
            if !still_open {
                return;
            }
            let recv_result = match self.table.get(&fd) {
                Some(st) => st.conn.recv(&mut buf),
                None => return,
            };
            match recv_result {
                Ok(0) => {
                    self.schedule_deferred_close(fd);
                    return;
                }
                Ok(n) => handler.on_message(self, fd, &buf[..n]),
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return,
                Err(err) => {
                    let err = Error::from_io(ErrorKind::ConnectionIOFailure, "read_drain", err);
                    handler.on_exception(self, &err);
                    self.schedule_deferred_close(fd);
                    return;
                }
            }
        }
    }

    /// Flushes `fd`'s output queue in FIFO order. Returns `true` only
    /// when the queue becomes empty.
    fn write_flush(&mut self, fd: RawDescriptor, handler: &mut dyn Handler) -> bool {
        loop {
            let Some(st) = self.table.get_mut(&fd) else {
                return true;
            };
            let Some(front) = st.outq.front_mut() else {
                return true;
            };
            if front.is_empty() {
                st.outq.pop_front();
                continue;
            }
            match st.conn.send(front.as_slice()) {
                Ok(sent) if sent == front.size() => {
                    st.outq.pop_front();
                    continue;
                }
                Ok(sent) => {
                    front.trim_front(sent);
                    return false;
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return false,
                Err(err) => {
                    let err = Error::from_io(ErrorKind::ConnectionIOFailure, "write_flush", err);
                    handler.on_exception(self, &err);
                    return false;
                }
            }
        }
    }

    fn schedule_deferred_close(&mut self, fd: RawDescriptor) {
        if let Some(st) = self.table.get_mut(&fd) {
            st.want_close = true;
        }
        self.pending_closes.push(fd);
    }

    fn close_and_erase(&mut self, fd: RawDescriptor, handler: &mut dyn Handler) {
        let Some(mut st) = self.table.remove(&fd) else {
            return;
        };
        if let Err(err) = self.selector.remove(fd) {
            trace!("selector.remove({fd:?}) failed, descriptor likely already gone: {err}");
        }
        st.conn.mark_closed();
        debug!("closing connection fd={fd:?}");
        handler.on_closed(self, fd);
        st.conn.close();
    }

    fn teardown(&mut self, handler: &mut dyn Handler) {
        let fds: Vec<RawDescriptor> = self.table.keys().copied().collect();
        for fd in fds {
            self.close_and_erase(fd, handler);
        }
        if let Some(mut listener) = self.listener.take() {
            let _ = self.selector.remove(listener.raw_fd());
            listener.close();
        }
    }
}
