use std::io;
use std::os::windows::io::RawSocket;

use windows_sys::Win32::Networking::WinSock::{
    self, IPPROTO_TCP, SOCKET, SOCKET_ERROR, SOL_SOCKET, SO_REUSEADDR, TCP_NODELAY,
};

fn check(ret: i32) -> io::Result<i32> {
    if ret == SOCKET_ERROR {
        Err(io::Error::from_raw_os_error(unsafe { WinSock::WSAGetLastError() }))
    } else {
        Ok(ret)
    }
}

pub(crate) fn set_reuseaddr(sock: RawSocket) -> io::Result<()> {
    let optval: i32 = 1;
    check(unsafe {
        WinSock::setsockopt(
            sock as SOCKET,
            SOL_SOCKET as i32,
            SO_REUSEADDR as i32,
            &optval as *const i32 as *const u8,
            std::mem::size_of::<i32>() as i32,
        )
    })
    .map(|_| ())
}

pub(crate) fn set_nonblocking(sock: RawSocket) -> io::Result<()> {
    let mut mode: u32 = 1;
    let ret = unsafe { WinSock::ioctlsocket(sock as SOCKET, WinSock::FIONBIO, &mut mode) };
    check(ret).map(|_| ())
}

pub(crate) fn recv(sock: RawSocket, buf: &mut [u8]) -> io::Result<usize> {
    let n = check(unsafe {
        WinSock::recv(sock as SOCKET, buf.as_mut_ptr(), buf.len() as i32, 0)
    })?;
    Ok(n as usize)
}

pub(crate) fn send(sock: RawSocket, buf: &[u8]) -> io::Result<usize> {
    let n = check(unsafe {
        WinSock::send(sock as SOCKET, buf.as_ptr(), buf.len() as i32, 0)
    })?;
    Ok(n as usize)
}

pub(crate) fn set_nodelay(sock: RawSocket, enable: bool) -> io::Result<()> {
    let optval: i32 = enable as i32;
    check(unsafe {
        WinSock::setsockopt(
            sock as SOCKET,
            IPPROTO_TCP as i32,
            TCP_NODELAY as i32,
            &optval as *const i32 as *const u8,
            std::mem::size_of::<i32>() as i32,
        )
    })
    .map(|_| ())
}

pub(crate) fn close(sock: RawSocket) {
    unsafe {
        WinSock::closesocket(sock as SOCKET);
    }
}

/// Closes a descriptor. Errors are not actionable by the caller (the
/// socket is gone either way) so they're discarded here rather than
/// threaded back through the close-and-erase path.
pub(crate) fn close_descriptor(sock: RawSocket) {
    close(sock);
}
