//! Accept-storm and abnormal-teardown scenarios, kept in a separate
//! file from the steady-state echo/backpressure cases since both spin
//! up many short-lived client threads.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use edgeio::{Endpoint, Family, Handler, ListenerSocket, Reactor};

#[path = "support/mod.rs"]
mod support;

fn bind_reactor() -> (Reactor, Endpoint) {
    support::init();
    let endpoint = Endpoint::new(Family::V4, "127.0.0.1", 0).unwrap();
    let listener = ListenerSocket::bind(&endpoint, 1024).unwrap();
    let local = listener.local_endpoint().clone();
    let mut reactor = Reactor::construct(4096).unwrap();
    reactor.register_listener(listener).unwrap();
    (reactor, local)
}

#[test]
fn accept_storm_delivers_every_message() {
    const CLIENTS: usize = 200;

    struct Collector {
        opened: usize,
        closed: usize,
        messages: std::collections::HashMap<edgeio::RawDescriptor, Vec<u8>>,
        idle_ticks_since_progress: u32,
    }

    impl Handler for Collector {
        fn on_opened(&mut self, _reactor: &mut Reactor, fd: edgeio::RawDescriptor) {
            self.opened += 1;
            self.messages.insert(fd, Vec::new());
            self.idle_ticks_since_progress = 0;
        }

        fn on_message(&mut self, _reactor: &mut Reactor, fd: edgeio::RawDescriptor, bytes: &[u8]) {
            self.messages.entry(fd).or_default().extend_from_slice(bytes);
            self.idle_ticks_since_progress = 0;
        }

        fn on_closed(&mut self, reactor: &mut Reactor, _fd: edgeio::RawDescriptor) {
            self.closed += 1;
            self.idle_ticks_since_progress = 0;
            if self.closed == CLIENTS {
                reactor.stop();
            }
        }

        // Bounds the test: if a regression stops delivering closes, stop
        // after a few idle ticks with no progress instead of hanging the
        // suite forever.
        fn on_waiting_for_activity(&mut self, reactor: &mut Reactor) {
            self.idle_ticks_since_progress += 1;
            if self.idle_ticks_since_progress > 100 {
                reactor.stop();
            }
        }
    }

    let (mut reactor, local) = bind_reactor();

    let clients: Vec<_> = (0..CLIENTS)
        .map(|_| {
            thread::spawn(move || {
                let mut sock = TcpStream::connect((local.address(), local.port())).unwrap();
                sock.write_all(b"abcd").unwrap();
            })
        })
        .collect();

    let mut handler = Collector {
        opened: 0,
        closed: 0,
        messages: std::collections::HashMap::new(),
        idle_ticks_since_progress: 0,
    };

    reactor.run(&mut handler, 50).unwrap();

    for client in clients {
        client.join().unwrap();
    }

    assert_eq!(handler.opened, CLIENTS);
    assert_eq!(handler.closed, CLIENTS);
    for bytes in handler.messages.values() {
        assert_eq!(bytes.as_slice(), b"abcd");
    }
}

#[test]
fn abrupt_peer_reset_closes_exactly_once() {
    struct CountClose(Arc<Mutex<usize>>);

    impl Handler for CountClose {
        fn on_closed(&mut self, _reactor: &mut Reactor, _fd: edgeio::RawDescriptor) {
            *self.0.lock().unwrap() += 1;
        }
    }

    let (mut reactor, local) = bind_reactor();
    let stopper = reactor.stopper();
    let closes = Arc::new(Mutex::new(0usize));

    let client = thread::spawn(move || {
        let sock = TcpStream::connect((local.address(), local.port())).unwrap();
        set_linger_zero(&sock);
        drop(sock);
    });

    thread::spawn(move || {
        thread::sleep(Duration::from_secs(3));
        stopper.stop();
    });

    let mut handler = CountClose(closes.clone());
    let _ = reactor.run(&mut handler, 100);

    client.join().unwrap();
    assert_eq!(*closes.lock().unwrap(), 1);
}

fn set_linger_zero(sock: &TcpStream) {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let linger = libc::linger { l_onoff: 1, l_linger: 0 };
        unsafe {
            libc::setsockopt(
                sock.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_LINGER,
                &linger as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::linger>() as libc::socklen_t,
            );
        }
    }
    #[cfg(not(unix))]
    {
        let _ = sock;
    }
}
