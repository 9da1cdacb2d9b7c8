//! An `eventfd`-backed wakeup primitive.
//!
//! Grounded on the teacher crate's `src/sys/unix/waker/eventfd.rs`. Used
//! by the reactor as the redesigned alternative to the "sentinel close
//! event" bit hack flagged in §9 of the design notes: instead of
//! repurposing an unused epoll bit to mean "a close was requested",
//! `close()` records the request and this waker is armed so the next
//! `wait()` returns promptly rather than blocking for the full idle
//! timeout on an otherwise quiet connection.
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, RawFd};

#[derive(Debug)]
pub(crate) struct Waker {
    fd: File,
}

impl Waker {
    pub(crate) fn new() -> io::Result<Waker> {
        let flags = libc::EFD_CLOEXEC | libc::EFD_NONBLOCK;
        let fd = syscall!(eventfd(0, flags))?;
        Ok(Waker {
            fd: unsafe { File::from_raw_fd(fd) },
        })
    }

    #[allow(clippy::unused_io_amount)]
    pub(crate) fn wake(&self) -> io::Result<()> {
        let buf: [u8; 8] = 1u64.to_ne_bytes();
        match (&self.fd).write(&buf) {
            Ok(_) => Ok(()),
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                // The counter is about to overflow; drain it and retry.
                self.drain()?;
                self.wake()
            }
            Err(err) => Err(err),
        }
    }

    /// Resets the counter to 0. Called once per loop iteration after the
    /// waker fires, so a subsequent `wake()` from inside a callback is
    /// observed again on the next `wait()`.
    #[allow(clippy::unused_io_amount)]
    pub(crate) fn drain(&self) -> io::Result<()> {
        let mut buf: [u8; 8] = 0u64.to_ne_bytes();
        match (&self.fd).read(&mut buf) {
            Ok(_) => Ok(()),
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(err) => Err(err),
        }
    }
}

impl AsRawFd for Waker {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl Waker {
    pub(crate) fn raw(&self) -> RawFd {
        self.as_raw_fd()
    }
}
