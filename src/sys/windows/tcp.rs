use std::io;
use std::net::SocketAddr;
use std::os::windows::io::RawSocket;

use windows_sys::Win32::Networking::WinSock::{self, SOCKET, SOCKET_ERROR, SOCK_STREAM};

use super::net::{domain_for, from_socket_addr, to_socket_addr, zeroed_storage};
use super::socket::{self, set_nonblocking, set_reuseaddr};

fn check(ret: i32) -> io::Result<i32> {
    if ret == SOCKET_ERROR {
        Err(io::Error::from_raw_os_error(unsafe { WinSock::WSAGetLastError() }))
    } else {
        Ok(ret)
    }
}

pub(crate) fn new_for_addr(addr: SocketAddr) -> io::Result<RawSocket> {
    let sock = unsafe { WinSock::socket(domain_for(addr), SOCK_STREAM as i32, 0) };
    if sock == WinSock::INVALID_SOCKET {
        return Err(io::Error::from_raw_os_error(unsafe { WinSock::WSAGetLastError() }));
    }
    let sock = sock as RawSocket;
    if let Err(err) = set_nonblocking(sock) {
        socket::close(sock);
        return Err(err);
    }
    Ok(sock)
}

pub(crate) fn bind_listener(addr: SocketAddr, backlog: i32) -> io::Result<RawSocket> {
    let sock = new_for_addr(addr)?;
    let result: io::Result<()> = (|| {
        set_reuseaddr(sock)?;
        let (raw_addr, len) = from_socket_addr(&addr);
        check(unsafe { WinSock::bind(sock as SOCKET, raw_addr, len) })?;
        let backlog = if backlog <= 0 { WinSock::SOMAXCONN as i32 } else { backlog };
        check(unsafe { WinSock::listen(sock as SOCKET, backlog) })?;
        Ok(())
    })();
    if let Err(err) = result {
        socket::close(sock);
        return Err(err);
    }
    Ok(sock)
}

/// Windows has no `accept4`-equivalent atomic non-blocking accept; the
/// reactor performs a plain `accept` and then explicitly sets the
/// non-blocking flag on the new socket, treating the two-step sequence
/// as equivalent to the Linux path — exactly the fallback named in §6's
/// platform notes.
pub(crate) fn accept(listener: RawSocket) -> io::Result<(RawSocket, SocketAddr)> {
    let (mut storage, mut len) = zeroed_storage();
    let sock = unsafe {
        WinSock::accept(
            listener as SOCKET,
            &mut storage as *mut _ as *mut _,
            &mut len,
        )
    };
    if sock == WinSock::INVALID_SOCKET {
        return Err(io::Error::from_raw_os_error(unsafe { WinSock::WSAGetLastError() }));
    }
    let sock = sock as RawSocket;
    if let Err(err) = set_nonblocking(sock) {
        socket::close(sock);
        return Err(err);
    }
    let addr = unsafe { to_socket_addr(&storage) }?;
    Ok((sock, addr))
}

pub(crate) fn local_addr(sock: RawSocket) -> io::Result<SocketAddr> {
    let (mut storage, mut len) = zeroed_storage();
    check(unsafe { WinSock::getsockname(sock as SOCKET, &mut storage as *mut _ as *mut _, &mut len) })?;
    unsafe { to_socket_addr(&storage) }
}

pub(crate) use super::socket::set_nodelay;
