use std::mem::{self, MaybeUninit};
use std::net::SocketAddr;

use windows_sys::Win32::Networking::WinSock::{AF_INET, AF_INET6, SOCKADDR, SOCKADDR_STORAGE};

pub(crate) fn domain_for(addr: SocketAddr) -> i32 {
    match addr {
        SocketAddr::V4(..) => AF_INET as i32,
        SocketAddr::V6(..) => AF_INET6 as i32,
    }
}

pub(crate) fn from_socket_addr(addr: &SocketAddr) -> (*const SOCKADDR, i32) {
    match addr {
        SocketAddr::V4(v4) => (
            v4 as *const _ as *const SOCKADDR,
            mem::size_of_val(v4) as i32,
        ),
        SocketAddr::V6(v6) => (
            v6 as *const _ as *const SOCKADDR,
            mem::size_of_val(v6) as i32,
        ),
    }
}

pub(crate) fn zeroed_storage() -> (SOCKADDR_STORAGE, i32) {
    let storage = unsafe { MaybeUninit::<SOCKADDR_STORAGE>::zeroed().assume_init() };
    (storage, mem::size_of::<SOCKADDR_STORAGE>() as i32)
}

/// `storage` must have been filled in by a prior `getsockname`/
/// `getpeername`/`accept` call.
pub(crate) unsafe fn to_socket_addr(storage: *const SOCKADDR_STORAGE) -> std::io::Result<SocketAddr> {
    match (*storage).ss_family as i32 {
        af if af == AF_INET as i32 => Ok(SocketAddr::V4(
            *(storage as *const std::net::SocketAddrV4),
        )),
        af if af == AF_INET6 as i32 => Ok(SocketAddr::V6(
            *(storage as *const std::net::SocketAddrV6),
        )),
        _ => Err(std::io::ErrorKind::InvalidInput.into()),
    }
}
