use std::io;
use std::os::fd::RawFd;

/// Enables `SO_REUSEADDR` on a not-yet-bound socket.
pub(crate) fn set_reuseaddr(fd: RawFd) -> io::Result<()> {
    let optval: libc::c_int = 1;
    syscall!(setsockopt(
        fd,
        libc::SOL_SOCKET,
        libc::SO_REUSEADDR,
        &optval as *const libc::c_int as *const libc::c_void,
        std::mem::size_of::<libc::c_int>() as libc::socklen_t,
    ))
    .map(|_| ())
}

/// On Linux, `send`'s `MSG_NOSIGNAL` flag is the per-call form of "no
/// SIGPIPE semantics" named in §6.
fn no_sigpipe_flag() -> libc::c_int {
    libc::MSG_NOSIGNAL
}

/// Non-blocking `recv` into `buf`. Returns `Ok(0)` on peer shutdown,
/// `Err(WouldBlock)` when the socket has no more data buffered.
pub(crate) fn recv(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    let n = syscall!(recv(
        fd,
        buf.as_mut_ptr() as *mut libc::c_void,
        buf.len(),
        0,
    ))?;
    Ok(n as usize)
}

/// Non-blocking `send` with `MSG_NOSIGNAL` so a reset peer reports
/// `EPIPE` through the return value instead of raising `SIGPIPE`.
pub(crate) fn send(fd: RawFd, buf: &[u8]) -> io::Result<usize> {
    let n = syscall!(send(
        fd,
        buf.as_ptr() as *const libc::c_void,
        buf.len(),
        no_sigpipe_flag(),
    ))?;
    Ok(n as usize)
}

/// Closes a descriptor. Errors are not actionable by the caller (the
/// descriptor is gone either way) so they're discarded here rather than
/// threaded back through the close-and-erase path.
pub(crate) fn close_descriptor(fd: RawFd) {
    let _ = syscall!(close(fd));
}
