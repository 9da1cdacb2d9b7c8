use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// Address family of an [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

/// A validated `(family, address, port)` triple.
///
/// Construction validates only the port range (`1..=65535`); the
/// textual address is taken as-is, exactly as the original design calls
/// for ("textual literal, no validation guaranteed; caller is
/// responsible"). [`Endpoint::to_socket_addr`] performs the actual
/// parse and is where a malformed address surfaces, as an `io::Error`
/// wrapped by the listener factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    family: Family,
    address: String,
    port: u16,
}

impl Endpoint {
    /// Builds an endpoint, validating the port is in `1..=65535`.
    pub fn new(family: Family, address: impl Into<String>, port: u32) -> Result<Endpoint, Error> {
        if port == 0 || port > u16::from(u16::MAX) as u32 {
            return Err(Error::new(ErrorKind::InvalidPort, "Endpoint::new"));
        }
        Ok(Endpoint {
            family,
            address: address.into(),
            port: port as u16,
        })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Materializes the kernel address structure equivalent, `SocketAddr`,
    /// appropriate to `family`'s length (`sockaddr_in` for IPv4,
    /// `sockaddr_in6` for IPv6).
    pub fn to_socket_addr(&self) -> Result<SocketAddr, Error> {
        match self.family {
            Family::V4 => {
                let ip = Ipv4Addr::from_str(&self.address)
                    .map_err(|_| Error::new(ErrorKind::InvalidFamily, "Endpoint::to_socket_addr"))?;
                Ok(SocketAddr::new(IpAddr::V4(ip), self.port))
            }
            Family::V6 => {
                let ip = Ipv6Addr::from_str(&self.address)
                    .map_err(|_| Error::new(ErrorKind::InvalidFamily, "Endpoint::to_socket_addr"))?;
                Ok(SocketAddr::new(IpAddr::V6(ip), self.port))
            }
        }
    }

    /// Decodes a `SocketAddr` back into an `Endpoint`. Together with
    /// [`to_socket_addr`](Endpoint::to_socket_addr) this is the round-trip
    /// law from the testable-properties section: encode then decode
    /// yields the same `(family, address, port)`.
    pub fn from_socket_addr(addr: SocketAddr) -> Endpoint {
        match addr {
            SocketAddr::V4(v4) => Endpoint {
                family: Family::V4,
                address: v4.ip().to_string(),
                port: v4.port(),
            },
            SocketAddr::V6(v6) => Endpoint {
                family: Family::V6,
                address: v6.ip().to_string(),
                port: v6.port(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_zero_is_rejected() {
        let err = Endpoint::new(Family::V4, "127.0.0.1", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPort);
    }

    #[test]
    fn port_65536_is_rejected() {
        let err = Endpoint::new(Family::V4, "127.0.0.1", 65536).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPort);
    }

    #[test]
    fn port_one_and_max_are_accepted() {
        assert!(Endpoint::new(Family::V4, "127.0.0.1", 1).is_ok());
        assert!(Endpoint::new(Family::V4, "127.0.0.1", 65535).is_ok());
    }

    #[test]
    fn round_trips_through_socket_addr() {
        let ep = Endpoint::new(Family::V4, "127.0.0.1", 18080).unwrap();
        let addr = ep.to_socket_addr().unwrap();
        let back = Endpoint::from_socket_addr(addr);
        assert_eq!(ep, back);
    }

    #[test]
    fn round_trips_v6() {
        let ep = Endpoint::new(Family::V6, "::1", 9000).unwrap();
        let addr = ep.to_socket_addr().unwrap();
        let back = Endpoint::from_socket_addr(addr);
        assert_eq!(ep, back);
    }
}
