//! A loopback-socket-backed wakeup primitive.
//!
//! Windows has no `eventfd`; the standard self-pipe substitute on this
//! platform is a connected pair of loopback TCP sockets (no named pipe
//! gives the same "always one readable byte means wake up" semantics
//! that’s easy to drive through `wepoll`’s socket-only registration).
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::os::windows::io::{AsRawSocket, RawSocket};

use super::socket::set_nonblocking;

#[derive(Debug)]
pub(crate) struct Waker {
    writer: TcpStream,
    reader: TcpStream,
}

impl Waker {
    pub(crate) fn new() -> io::Result<Waker> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let writer = TcpStream::connect(addr)?;
        let (reader, _) = listener.accept()?;
        writer.set_nodelay(true)?;
        reader.set_nodelay(true)?;
        set_nonblocking(reader.as_raw_socket())?;
        set_nonblocking(writer.as_raw_socket())?;
        Ok(Waker { writer, reader })
    }

    pub(crate) fn wake(&self) -> io::Result<()> {
        match (&self.writer).write(&[1u8]) {
            Ok(_) => Ok(()),
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn drain(&self) -> io::Result<()> {
        let mut buf = [0u8; 64];
        loop {
            match (&self.reader).read(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(_) => continue,
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }
}

impl AsRawSocket for Waker {
    fn as_raw_socket(&self) -> RawSocket {
        self.reader.as_raw_socket()
    }
}

impl Waker {
    pub(crate) fn raw(&self) -> RawSocket {
        self.as_raw_socket()
    }
}
