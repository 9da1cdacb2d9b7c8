use std::io;
use std::mem::{self, MaybeUninit};
use std::net::SocketAddr;
use std::os::fd::RawFd;

use super::net::{from_socket_addr, to_socket_addr};
use crate::sys::unix::set_reuseaddr;

pub(crate) const LISTEN_BACKLOG_SIZE: libc::c_int = libc::SOMAXCONN;

fn domain_for(addr: SocketAddr) -> libc::c_int {
    match addr {
        SocketAddr::V4(..) => libc::AF_INET,
        SocketAddr::V6(..) => libc::AF_INET6,
    }
}

/// Creates a non-blocking, close-on-exec TCP socket for `addr`'s family,
/// using `socket(2)` with `SOCK_NONBLOCK | SOCK_CLOEXEC` where available
/// (all Linux/Android targets this crate supports).
pub(crate) fn new_for_addr(addr: SocketAddr) -> io::Result<RawFd> {
    syscall!(socket(
        domain_for(addr),
        libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
        0,
    ))
}

pub(crate) fn bind(fd: RawFd, addr: SocketAddr) -> io::Result<()> {
    let (raw_addr, raw_addr_length) = from_socket_addr(&addr);
    syscall!(bind(fd, raw_addr, raw_addr_length)).map(|_| ())
}

/// `backlog <= 0` means "use the OS-defined maximum" (`SOMAXCONN`), per
/// the listener factory contract.
pub(crate) fn listen(fd: RawFd, backlog: i32) -> io::Result<()> {
    let backlog = if backlog <= 0 {
        LISTEN_BACKLOG_SIZE
    } else {
        backlog
    };
    syscall!(listen(fd, backlog)).map(|_| ())
}

/// Accepts one connection, atomically marking the new descriptor
/// non-blocking and close-on-exec via `accept4`. This is the "atomic
/// non-blocking+close-on-exec accept path" named in §6's platform notes.
pub(crate) fn accept(listener_fd: RawFd) -> io::Result<(RawFd, SocketAddr)> {
    let storage = MaybeUninit::<libc::sockaddr_storage>::zeroed();
    // SAFETY: a `sockaddr_storage` filled with zero bytes is a valid,
    // if meaningless, value; `accept4` fills in the real contents.
    let mut storage = unsafe { storage.assume_init() };
    let mut len = mem::size_of_val(&storage) as libc::socklen_t;

    let fd = syscall!(accept4(
        listener_fd,
        &mut storage as *mut libc::sockaddr_storage as *mut libc::sockaddr,
        &mut len,
        libc::SOCK_CLOEXEC | libc::SOCK_NONBLOCK,
    ))?;

    let addr = unsafe { to_socket_addr(&storage as *const libc::sockaddr_storage)? };
    Ok((fd, addr))
}

pub(crate) fn local_addr(fd: RawFd) -> io::Result<SocketAddr> {
    let storage = MaybeUninit::<libc::sockaddr_storage>::zeroed();
    let mut storage = unsafe { storage.assume_init() };
    let mut len = mem::size_of_val(&storage) as libc::socklen_t;
    syscall!(getsockname(
        fd,
        &mut storage as *mut libc::sockaddr_storage as *mut libc::sockaddr,
        &mut len,
    ))?;
    unsafe { to_socket_addr(&storage as *const libc::sockaddr_storage) }
}

pub(crate) fn set_nodelay(fd: RawFd, enable: bool) -> io::Result<()> {
    let optval: libc::c_int = enable as libc::c_int;
    syscall!(setsockopt(
        fd,
        libc::IPPROTO_TCP,
        libc::TCP_NODELAY,
        &optval as *const libc::c_int as *const libc::c_void,
        mem::size_of::<libc::c_int>() as libc::socklen_t,
    ))
    .map(|_| ())
}

pub(crate) fn bind_listener(addr: SocketAddr, backlog: i32) -> io::Result<RawFd> {
    let fd = new_for_addr(addr)?;
    if let Err(err) = set_reuseaddr(fd).and_then(|_| bind(fd, addr)).and_then(|_| listen(fd, backlog)) {
        let _ = syscall!(close(fd));
        return Err(err);
    }
    Ok(fd)
}
