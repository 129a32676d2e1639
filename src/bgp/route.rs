//! Route prefixes and the routes the controller advertises.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a route specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteSpecError {
    /// The address part is not an IPv4 or IPv6 address.
    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    /// The mask is not a number or exceeds the address width.
    #[error("invalid prefix length `{len}` (maximum {max})")]
    InvalidLength { len: String, max: u8 },

    /// Bits are set beyond the mask (e.g. `10.0.0.1/24`).
    #[error("host bits set in `{0}`")]
    HostBitsSet(String),

    /// Only `next-hop self` can be expressed on the command channel.
    #[error("next-hop must be self")]
    NextHopNotSelf,
}

/// An IP prefix in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix {
    addr: IpAddr,
    len: u8,
}

impl Prefix {
    /// Build a prefix, rejecting lengths wider than the address and host bits.
    pub fn new(addr: IpAddr, len: u8) -> Result<Self, RouteSpecError> {
        let max = max_len(&addr);
        if len > max {
            return Err(RouteSpecError::InvalidLength {
                len: len.to_string(),
                max,
            });
        }

        let host_bits_set = match addr {
            IpAddr::V4(v4) => {
                let mask = u32::MAX.checked_shl(u32::from(32 - len)).unwrap_or(0);
                u32::from(v4) & !mask != 0
            }
            IpAddr::V6(v6) => {
                let mask = u128::MAX.checked_shl(u32::from(128 - len)).unwrap_or(0);
                u128::from(v6) & !mask != 0
            }
        };
        if host_bits_set {
            return Err(RouteSpecError::HostBitsSet(format!("{}/{}", addr, len)));
        }

        Ok(Self { addr, len })
    }

    /// A host route (`/32` or `/128`) for a single address.
    pub fn host(addr: IpAddr) -> Self {
        Self {
            addr,
            len: max_len(&addr),
        }
    }

    pub fn length(&self) -> u8 {
        self.len
    }

    pub fn is_host(&self) -> bool {
        self.len == max_len(&self.addr)
    }
}

fn max_len(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl FromStr for Prefix {
    type Err = RouteSpecError;

    /// Parses `addr/len`; a bare address becomes a host route.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr_part, len_part) = match s.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s, None),
        };

        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| RouteSpecError::InvalidAddress(addr_part.to_string()))?;

        match len_part {
            None => Ok(Self::host(addr)),
            Some(len) => {
                let parsed = len.parse::<u8>().map_err(|_| RouteSpecError::InvalidLength {
                    len: len.to_string(),
                    max: max_len(&addr),
                })?;
                Self::new(addr, parsed)
            }
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

/// A route the controller may advertise.
///
/// Immutable once built. Each configured route gets its own debounce state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteSpec {
    prefix: Prefix,
    next_hop_self: bool,
}

impl RouteSpec {
    pub fn new(prefix: Prefix, next_hop_self: bool) -> Result<Self, RouteSpecError> {
        if !next_hop_self {
            return Err(RouteSpecError::NextHopNotSelf);
        }
        Ok(Self {
            prefix,
            next_hop_self,
        })
    }

    /// Parse a prefix string into a `next-hop self` route.
    pub fn parse(prefix: &str) -> Result<Self, RouteSpecError> {
        Self::new(prefix.parse()?, true)
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn next_hop_is_self(&self) -> bool {
        self.next_hop_self
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.prefix.fmt(f)
    }
}
