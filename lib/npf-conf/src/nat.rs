// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! NAT policies.
//!
//! The wire shape and the flag constants are fixed in `npf-api`, but
//! the creation contract (how a policy binds to translation addresses
//! and rules) is not settled. Construction refuses the call rather
//! than minting a policy that could never reach the engine correctly.

use crate::error::Error;
use npf_api::AddressFamily;
use npf_api::NatDirection;
use npf_api::NatFlags;
use npf_api::NatPolicyDef;

/// An address/port translation policy.
#[derive(Clone, Debug)]
pub struct NatPolicy {
    def: NatPolicyDef,
}

impl NatPolicy {
    /// Not implemented: the creation contract is undefined. Returns
    /// [`Error::NotImplemented`] unconditionally.
    pub fn new(
        _di: NatDirection,
        _flags: NatFlags,
        _family: AddressFamily,
    ) -> Result<Self, Error> {
        Err(Error::NotImplemented("nat.create"))
    }

    pub(crate) fn to_def(&self) -> NatPolicyDef {
        self.def.clone()
    }
}
