//! End-to-end scenarios driven against real OS sockets: one client per
//! test, talking to a reactor running on the calling thread via
//! `Reactor::run`, stopped from a second thread once the exchange is
//! done. Mirrors the teacher crate's integration-test style (plain
//! `#[test]` functions, `std::net::TcpStream`, `thread::spawn`) rather
//! than mocking the multiplexer.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

use edgeio::{Endpoint, Family, Handler, ListenerSocket, Reactor, Stopper};

#[path = "support/mod.rs"]
mod support;

fn bind_reactor() -> (Reactor, Endpoint) {
    support::init();
    let endpoint = Endpoint::new(Family::V4, "127.0.0.1", 0).unwrap();
    let listener = ListenerSocket::bind(&endpoint, 128).unwrap();
    let local = listener.local_endpoint().clone();
    let mut reactor = Reactor::construct(1024).unwrap();
    reactor.register_listener(listener).unwrap();
    (reactor, local)
}

/// Stops the reactor from another thread once `done` fires, bounding
/// every test by a hard ceiling so a regression hangs instead of wedging
/// the whole suite.
fn stop_after(stopper: Stopper, done: std::sync::mpsc::Receiver<()>) {
    thread::spawn(move || {
        let _ = done.recv_timeout(Duration::from_secs(10));
        stopper.stop();
    });
}

#[test]
fn echo_round_trip() {
    struct Echo {
        opened: usize,
        closed: usize,
        done_tx: std::sync::mpsc::Sender<()>,
    }

    impl Handler for Echo {
        fn on_opened(&mut self, _reactor: &mut Reactor, _fd: edgeio::RawDescriptor) {
            self.opened += 1;
        }

        fn on_message(&mut self, reactor: &mut Reactor, fd: edgeio::RawDescriptor, bytes: &[u8]) {
            assert_eq!(bytes, b"ping\n");
            reactor.send(fd, bytes);
        }

        fn on_closed(&mut self, _reactor: &mut Reactor, _fd: edgeio::RawDescriptor) {
            self.closed += 1;
            let _ = self.done_tx.send(());
        }
    }

    let (mut reactor, local) = bind_reactor();
    let stopper = reactor.stopper();
    let (done_tx, done_rx) = channel();

    let client = thread::spawn(move || {
        let mut sock = TcpStream::connect((local.address(), local.port())).unwrap();
        sock.write_all(b"ping\n").unwrap();
        let mut buf = [0u8; 5];
        sock.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping\n");
    });

    stop_after(stopper, done_rx);
    let mut handler = Echo { opened: 0, closed: 0, done_tx };
    reactor.run(&mut handler, 100).unwrap();

    client.join().unwrap();
    assert_eq!(handler.opened, 1);
    assert_eq!(handler.closed, 1);
}

#[test]
fn backpressure_large_transfer() {
    const CHUNK: usize = 1024 * 1024;
    const CHUNKS: usize = 10;

    struct Sender {
        sent_all: bool,
    }

    impl Handler for Sender {
        fn on_opened(&mut self, reactor: &mut Reactor, fd: edgeio::RawDescriptor) {
            for i in 0..CHUNKS {
                reactor.send(fd, &vec![i as u8; CHUNK]);
            }
            self.sent_all = true;
        }
    }

    let (mut reactor, local) = bind_reactor();
    let stopper = reactor.stopper();

    let client = thread::spawn(move || {
        let mut sock = TcpStream::connect((local.address(), local.port())).unwrap();
        let mut total = Vec::with_capacity(CHUNK * CHUNKS);
        let mut buf = [0u8; 64 * 1024];
        while total.len() < CHUNK * CHUNKS {
            let n = sock.read(&mut buf).unwrap();
            assert!(n > 0, "peer closed early");
            total.extend_from_slice(&buf[..n]);
        }
        total
    });

    thread::spawn(move || {
        thread::sleep(Duration::from_secs(5));
        stopper.stop();
    });

    let mut handler = Sender { sent_all: false };
    let _ = reactor.run(&mut handler, 200);

    let received = client.join().unwrap();
    assert_eq!(received.len(), CHUNK * CHUNKS);
    for (i, chunk) in received.chunks(CHUNK).enumerate() {
        assert!(chunk.iter().all(|&b| b == i as u8));
    }
    assert!(handler.sent_all);
}

#[test]
fn deferred_close_flushes_pending_writes() {
    struct SendThenClose;

    impl Handler for SendThenClose {
        fn on_opened(&mut self, reactor: &mut Reactor, fd: edgeio::RawDescriptor) {
            reactor.send(fd, &vec![7u8; 64 * 1024]);
            reactor.close(fd);
        }
    }

    let (mut reactor, local) = bind_reactor();
    let stopper = reactor.stopper();

    let client = thread::spawn(move || {
        let mut sock = TcpStream::connect((local.address(), local.port())).unwrap();
        let mut total = Vec::new();
        sock.read_to_end(&mut total).unwrap();
        total
    });

    thread::spawn(move || {
        thread::sleep(Duration::from_secs(5));
        stopper.stop();
    });

    let mut handler = SendThenClose;
    let _ = reactor.run(&mut handler, 200);

    let received = client.join().unwrap();
    assert_eq!(received.len(), 64 * 1024);
    assert!(received.iter().all(|&b| b == 7));
}

#[test]
fn graceful_shutdown_stops_promptly() {
    struct Noop;
    impl Handler for Noop {}

    let (mut reactor, _local) = bind_reactor();
    let stopper = reactor.stopper();

    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        stopper.stop();
    });

    let started = std::time::Instant::now();
    let mut handler = Noop;
    reactor.run(&mut handler, 1000).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}
