use std::fmt;
use std::io;

/// The kind of failure reported by [`Error`].
///
/// Mirrors the taxonomy in the design notes: a handful of closed
/// categories rather than a generic catch-all, so embedders can match on
/// `kind()` without downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The readiness multiplexer could not be created. Raised from
    /// [`crate::Reactor::construct`]; fatal.
    InitFailed,
    /// Socket creation, bind, or listen failed in the listener factory.
    /// Fatal for that call; does not affect an already-running reactor.
    ListenerSetupFailed,
    /// Adding a descriptor to the multiplexer failed. The descriptor is
    /// closed and the reactor keeps running.
    RegisterFailed,
    /// Resource exhaustion on accept (`EMFILE`/`ENFILE` or platform
    /// equivalent). The accept loop breaks for this iteration and is
    /// retried on the next.
    TransientAcceptFailure,
    /// `send`/`recv` failed with a non-retryable error on an open
    /// connection. Deferred close is scheduled for that connection.
    ConnectionIOFailure,
    /// `recv` returned zero: the peer closed its write side. Not
    /// actually an error — included in the taxonomy for completeness,
    /// but `read_drain` never reports it through `on_exception`, since a
    /// graceful peer close is expected control flow rather than a
    /// failure.
    PeerClosed,
    /// The readiness `wait` call returned an unrecoverable error. The
    /// event loop exits after this is reported.
    FatalLoop,
    /// An [`crate::Endpoint`] was constructed with `port == 0`.
    InvalidPort,
    /// An [`crate::Endpoint`] was constructed with an unsupported address
    /// family.
    InvalidFamily,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InitFailed => "multiplexer initialization failed",
            ErrorKind::ListenerSetupFailed => "listener setup failed",
            ErrorKind::RegisterFailed => "failed to register descriptor",
            ErrorKind::TransientAcceptFailure => "transient accept failure",
            ErrorKind::ConnectionIOFailure => "connection I/O failure",
            ErrorKind::PeerClosed => "peer closed the connection",
            ErrorKind::FatalLoop => "fatal multiplexer error",
            ErrorKind::InvalidPort => "port out of range",
            ErrorKind::InvalidFamily => "unsupported address family",
        };
        f.write_str(s)
    }
}

/// A typed reactor error: a kind, the operation it happened during, and
/// (when the failure originated from a syscall) the OS error text.
///
/// This is a closed enum rather than a boxed `dyn Error`, matching the
/// teacher crate's own small hand-rolled error types instead of reaching
/// for `thiserror`/`anyhow` (neither is in the dependency stack this
/// crate builds on).
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    context: &'static str,
    os_error_text: Option<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, context: &'static str) -> Error {
        Error {
            kind,
            context,
            os_error_text: None,
        }
    }

    pub(crate) fn from_io(kind: ErrorKind, context: &'static str, err: io::Error) -> Error {
        Error {
            kind,
            context,
            os_error_text: Some(err.to_string()),
        }
    }

    /// The category of failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// What the reactor was doing when the failure occurred, e.g.
    /// `"register_listener"` or `"accept_loop"`.
    pub fn context(&self) -> &'static str {
        self.context
    }

    /// The underlying OS error text, if this failure was caused by a
    /// syscall.
    pub fn os_error_text(&self) -> Option<&str> {
        self.os_error_text.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.os_error_text {
            Some(text) => write!(f, "{} during {}: {}", self.kind, self.context, text),
            None => write!(f, "{} during {}", self.kind, self.context),
        }
    }
}

impl std::error::Error for Error {}

pub(crate) trait IoResultExt<T> {
    fn ctx(self, kind: ErrorKind, context: &'static str) -> Result<T, Error>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn ctx(self, kind: ErrorKind, context: &'static str) -> Result<T, Error> {
        self.map_err(|err| Error::from_io(kind, context, err))
    }
}
