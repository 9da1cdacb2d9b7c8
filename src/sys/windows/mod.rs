mod net;
mod rlimit;
mod selector;
mod socket;
mod tcp;
pub(crate) mod waker;

pub(crate) use rlimit::raise_fd_limit;
pub(crate) use selector::{Events, Selector};
pub(crate) use socket::{close_descriptor, recv, send, set_reuseaddr};
pub(crate) use tcp::{accept, bind_listener, local_addr, set_nodelay};
