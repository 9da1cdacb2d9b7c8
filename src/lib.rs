//! A single-threaded, edge-triggered TCP reactor.
//!
//! `edgeio` wraps a platform readiness multiplexer (`epoll` on
//! Linux/Android, `wepoll` on Windows) behind a small, callback-driven
//! API: bind a [`ListenerSocket`], register it with a [`Reactor`],
//! implement [`Handler`], and call [`Reactor::run`]. Everything runs on
//! the calling thread; the only operation safe to call from elsewhere is
//! [`Stopper::stop`].
//!
//! ```no_run
//! use edgeio::{Endpoint, Family, Handler, ListenerSocket, Reactor};
//!
//! struct Echo;
//!
//! impl Handler for Echo {
//!     fn on_message(&mut self, reactor: &mut Reactor, fd: edgeio::RawDescriptor, bytes: &[u8]) {
//!         reactor.send(fd, bytes);
//!     }
//! }
//!
//! # fn try_main() -> Result<(), edgeio::Error> {
//! let endpoint = Endpoint::new(Family::V4, "127.0.0.1", 9000)?;
//! let listener = ListenerSocket::bind(&endpoint, 1024)?;
//! let mut reactor = Reactor::construct(1024)?;
//! reactor.register_listener(listener)?;
//! reactor.run(&mut Echo, 1000)?;
//! # Ok(())
//! # }
//! ```

mod buffer;
mod connection;
mod descriptor;
mod endpoint;
mod error;
mod event;
mod handler;
mod listener;
mod reactor;
mod sys;

pub use buffer::ByteBuffer;
pub use connection::Connection;
pub use descriptor::RawDescriptor;
pub use endpoint::{Endpoint, Family};
pub use error::{Error, ErrorKind};
pub use event::{Event, Events, Interest};
pub use handler::Handler;
pub use listener::ListenerSocket;
pub use reactor::{Reactor, Stopper};
