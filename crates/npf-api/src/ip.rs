// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Address and prefix types used by table entries.
//!
//! These are owned byte-array types with a stable layout rather than
//! the `core::net` types so the wire representation is under this
//! crate's control; parsing and display delegate to `core::net`.

use alloc::string::String;
use alloc::string::ToString;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::result;
use core::str::FromStr;
use serde::Deserialize;
use serde::Serialize;

/// An IPv4 or IPv6 address.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub enum IpAddr {
    Ip4(Ipv4Addr),
    Ip6(Ipv6Addr),
}

impl From<Ipv4Addr> for IpAddr {
    fn from(ip4: Ipv4Addr) -> Self {
        IpAddr::Ip4(ip4)
    }
}

impl From<Ipv6Addr> for IpAddr {
    fn from(ip6: Ipv6Addr) -> Self {
        IpAddr::Ip6(ip6)
    }
}

impl From<core::net::IpAddr> for IpAddr {
    fn from(ip: core::net::IpAddr) -> Self {
        match ip {
            core::net::IpAddr::V4(ip4) => Self::Ip4(ip4.into()),
            core::net::IpAddr::V6(ip6) => Self::Ip6(ip6.into()),
        }
    }
}

impl Display for IpAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IpAddr::Ip4(ip4) => write!(f, "{ip4}"),
            IpAddr::Ip6(ip6) => write!(f, "{ip6}"),
        }
    }
}

impl FromStr for IpAddr {
    type Err = String;

    fn from_str(val: &str) -> result::Result<Self, Self::Err> {
        if let Ok(ipv4) = val.parse::<Ipv4Addr>() {
            Ok(ipv4.into())
        } else {
            val.parse::<Ipv6Addr>()
                .map(IpAddr::Ip6)
                .map_err(|_| String::from("invalid IP address"))
        }
    }
}

/// An IPv4 address.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[repr(C)]
pub struct Ipv4Addr {
    inner: [u8; 4],
}

impl Ipv4Addr {
    pub const ANY_ADDR: Self = Self { inner: [0; 4] };

    /// Return the bytes of the address.
    pub fn bytes(&self) -> [u8; 4] {
        self.inner
    }

    pub const fn from_const(bytes: [u8; 4]) -> Self {
        Self { inner: bytes }
    }

    /// Return the address after applying the network mask.
    pub fn mask(mut self, mask: u8) -> Result<Self, String> {
        if mask > 32 {
            return Err(format!("bad IPv4 prefix length: {mask}"));
        }

        if mask == 0 {
            return Ok(Ipv4Addr::ANY_ADDR);
        }

        let mut n = u32::from_be_bytes(self.inner);
        let mut bits = i32::MIN;
        bits >>= mask - 1;
        n &= bits as u32;
        self.inner = n.to_be_bytes();
        Ok(self)
    }
}

impl From<[u8; 4]> for Ipv4Addr {
    fn from(bytes: [u8; 4]) -> Self {
        Self { inner: bytes }
    }
}

impl From<core::net::Ipv4Addr> for Ipv4Addr {
    fn from(ip4: core::net::Ipv4Addr) -> Self {
        Self { inner: ip4.octets() }
    }
}

impl From<Ipv4Addr> for core::net::Ipv4Addr {
    fn from(ip4: Ipv4Addr) -> Self {
        Self::from(ip4.inner)
    }
}

impl FromStr for Ipv4Addr {
    type Err = String;

    fn from_str(val: &str) -> result::Result<Self, Self::Err> {
        val.parse::<core::net::Ipv4Addr>()
            .map(Self::from)
            .map_err(|e| e.to_string())
    }
}

impl Display for Ipv4Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", core::net::Ipv4Addr::from(*self))
    }
}

// There's no reason to view an address as its raw array, so present it
// in a human-friendly manner.
impl Debug for Ipv4Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ipv4Addr {{ inner: {self} }}")
    }
}

/// An IPv6 address.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[repr(C)]
pub struct Ipv6Addr {
    inner: [u8; 16],
}

impl Ipv6Addr {
    pub const ANY_ADDR: Self = Self { inner: [0; 16] };

    /// Return the bytes of the address.
    pub fn bytes(&self) -> [u8; 16] {
        self.inner
    }

    pub const fn from_const(bytes: [u8; 16]) -> Self {
        Self { inner: bytes }
    }

    /// Return the address after applying the network mask.
    pub fn mask(mut self, mask: u8) -> Result<Self, String> {
        if mask > 128 {
            return Err(format!("bad IPv6 prefix length: {mask}"));
        }

        if mask == 0 {
            return Ok(Ipv6Addr::ANY_ADDR);
        }

        let mut n = u128::from_be_bytes(self.inner);
        let mut bits = i128::MIN;
        bits >>= mask - 1;
        n &= bits as u128;
        self.inner = n.to_be_bytes();
        Ok(self)
    }
}

impl From<[u8; 16]> for Ipv6Addr {
    fn from(bytes: [u8; 16]) -> Self {
        Self { inner: bytes }
    }
}

impl From<core::net::Ipv6Addr> for Ipv6Addr {
    fn from(ip6: core::net::Ipv6Addr) -> Self {
        Self { inner: ip6.octets() }
    }
}

impl From<Ipv6Addr> for core::net::Ipv6Addr {
    fn from(ip6: Ipv6Addr) -> Self {
        Self::from(ip6.inner)
    }
}

impl FromStr for Ipv6Addr {
    type Err = String;

    fn from_str(val: &str) -> result::Result<Self, Self::Err> {
        val.parse::<core::net::Ipv6Addr>()
            .map(Self::from)
            .map_err(|e| e.to_string())
    }
}

impl Display for Ipv6Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", core::net::Ipv6Addr::from(*self))
    }
}

impl Debug for Ipv6Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ipv6Addr {{ inner: {self} }}")
    }
}

/// An IPv4 or IPv6 CIDR.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum IpCidr {
    Ip4(Ipv4Cidr),
    Ip6(Ipv6Cidr),
}

impl IpCidr {
    /// A host entry: the full-length prefix for the address family.
    pub fn host(ip: IpAddr) -> Self {
        match ip {
            IpAddr::Ip4(ip4) => Self::Ip4(Ipv4Cidr { ip: ip4, prefix_len: 32 }),
            IpAddr::Ip6(ip6) => {
                Self::Ip6(Ipv6Cidr { ip: ip6, prefix_len: 128 })
            }
        }
    }

    pub fn ip(&self) -> IpAddr {
        match self {
            Self::Ip4(ip4) => IpAddr::Ip4(ip4.ip()),
            Self::Ip6(ip6) => IpAddr::Ip6(ip6.ip()),
        }
    }

    pub fn prefix_len(&self) -> u8 {
        match self {
            Self::Ip4(ip4) => ip4.prefix_len(),
            Self::Ip6(ip6) => ip6.prefix_len(),
        }
    }
}

impl From<Ipv4Cidr> for IpCidr {
    fn from(cidr: Ipv4Cidr) -> Self {
        IpCidr::Ip4(cidr)
    }
}

impl From<Ipv6Cidr> for IpCidr {
    fn from(cidr: Ipv6Cidr) -> Self {
        IpCidr::Ip6(cidr)
    }
}

impl Display for IpCidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ip4(ip4) => write!(f, "{ip4}"),
            Self::Ip6(ip6) => write!(f, "{ip6}"),
        }
    }
}

impl FromStr for IpCidr {
    type Err = String;

    /// Convert a string like "192.168.2.0/24" into an `IpCidr`.
    fn from_str(val: &str) -> result::Result<Self, Self::Err> {
        match val.parse::<Ipv4Cidr>() {
            Ok(ip4) => Ok(IpCidr::Ip4(ip4)),
            Err(_) => val
                .parse::<Ipv6Cidr>()
                .map(IpCidr::Ip6)
                .map_err(|_| String::from("invalid IP CIDR")),
        }
    }
}

/// An IPv4 CIDR. The address is stored masked to the prefix.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ipv4Cidr {
    ip: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    pub fn new_checked(ip: Ipv4Addr, prefix_len: u8) -> Result<Self, String> {
        let ip = ip.mask(prefix_len)?;
        Ok(Self { ip, prefix_len })
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl FromStr for Ipv4Cidr {
    type Err = String;

    fn from_str(val: &str) -> result::Result<Self, Self::Err> {
        let (ip_s, prefix_s) = match val.split_once('/') {
            Some(v) => v,
            None => return Err("no '/' found".to_string()),
        };

        let ip = match ip_s.parse() {
            Ok(v) => v,
            Err(e) => return Err(format!("bad IP: {e}")),
        };

        let prefix_len = match prefix_s.parse::<u8>() {
            Ok(v) => v,
            Err(e) => return Err(format!("bad prefix length: {e}")),
        };

        Ipv4Cidr::new_checked(ip, prefix_len)
    }
}

impl Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_len)
    }
}

/// An IPv6 CIDR. The address is stored masked to the prefix.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ipv6Cidr {
    ip: Ipv6Addr,
    prefix_len: u8,
}

impl Ipv6Cidr {
    pub fn new_checked(ip: Ipv6Addr, prefix_len: u8) -> Result<Self, String> {
        let ip = ip.mask(prefix_len)?;
        Ok(Self { ip, prefix_len })
    }

    pub fn ip(&self) -> Ipv6Addr {
        self.ip
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl FromStr for Ipv6Cidr {
    type Err = String;

    fn from_str(val: &str) -> result::Result<Self, Self::Err> {
        let (ip_s, prefix_s) = match val.split_once('/') {
            Some(v) => v,
            None => return Err("no '/' found".to_string()),
        };

        let ip = match ip_s.parse() {
            Ok(v) => v,
            Err(e) => return Err(format!("bad IP: {e}")),
        };

        let prefix_len = match prefix_s.parse::<u8>() {
            Ok(v) => v,
            Err(e) => return Err(format!("bad prefix length: {e}")),
        };

        Ipv6Cidr::new_checked(ip, prefix_len)
    }
}

impl Display for Ipv6Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_parse_masks_host_bits() {
        let cidr = "10.1.2.3/24".parse::<Ipv4Cidr>().unwrap();
        assert_eq!(cidr.ip(), "10.1.2.0".parse().unwrap());
        assert_eq!(cidr.prefix_len(), 24);
        assert_eq!(cidr.to_string(), "10.1.2.0/24");
    }

    #[test]
    fn cidr_parse_family_fallthrough() {
        let v4 = "192.168.0.0/16".parse::<IpCidr>().unwrap();
        assert!(matches!(v4, IpCidr::Ip4(_)));

        let v6 = "fd00::/8".parse::<IpCidr>().unwrap();
        assert!(matches!(v6, IpCidr::Ip6(_)));
        assert_eq!(v6.prefix_len(), 8);

        assert!("not-a-cidr".parse::<IpCidr>().is_err());
        assert!("10.0.0.0/33".parse::<IpCidr>().is_err());
        assert!("fd00::/129".parse::<IpCidr>().is_err());
    }

    #[test]
    fn host_entry_full_prefix() {
        let ip4: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(IpCidr::host(ip4).prefix_len(), 32);

        let ip6: IpAddr = "fd00::1".parse().unwrap();
        assert_eq!(IpCidr::host(ip6).prefix_len(), 128);
    }

    #[test]
    fn zero_mask_clears_address() {
        let ip = "255.255.255.255".parse::<Ipv4Addr>().unwrap();
        assert_eq!(ip.mask(0).unwrap(), Ipv4Addr::ANY_ADDR);
        assert!(ip.mask(33).is_err());
    }
}
