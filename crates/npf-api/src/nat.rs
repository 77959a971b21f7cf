// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire representation of NAT policies.
//!
//! The construction surface for these is not yet defined by the control
//! library (see `npf-conf`); the shapes and constants are fixed here so
//! the load payload and the script-facing constant table are complete.

use bitflags::bitflags;
use core::fmt;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;

bitflags! {
    /// NAT policy behavior bits. Values mirror the engine's kernel
    /// header.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
    pub struct NatFlags: u32 {
        /// Translate ports as well as addresses.
        const PORTS = 0x01;
        /// Draw translated ports from a port map.
        const PORTMAP = 0x02;
    }
}

/// Which path a policy translates.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[repr(u32)]
pub enum NatDirection {
    In = 1,
    Out = 2,
}

impl Display for NatDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NatDirection::In => write!(f, "in"),
            NatDirection::Out => write!(f, "out"),
        }
    }
}

/// Address family a policy is scoped to. Values are the engine host's
/// `AF_*` constants.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[repr(u32)]
pub enum AddressFamily {
    Inet = 2,
    Inet6 = 24,
}

/// One NAT policy as shipped to the engine.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NatPolicyDef {
    pub di: NatDirection,
    pub flags: NatFlags,
    pub family: AddressFamily,
}
