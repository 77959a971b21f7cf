// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire representation of rules and rule processors.

use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;
use serde::Deserialize;
use serde::Serialize;

bitflags! {
    /// Rule attribute bits. The values mirror the engine's kernel
    /// header; wire compatibility depends on them not being renumbered
    /// here.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
    pub struct RuleFlags: u32 {
        /// Matching packets pass; without it they are blocked.
        const PASS = 0x0001;
        /// The ruleset's fallback rule.
        const DEFAULT = 0x0002;
        /// Stop inspection at this rule.
        const FINAL = 0x0004;
        /// A match creates a tracked connection state.
        const STATEFUL = 0x0008;
        /// Blocked TCP packets answer with RST.
        const RETRST = 0x0010;
        /// Blocked packets answer with an ICMP unreachable.
        const RETICMP = 0x0020;
        /// Apply on the inbound path.
        const IN = 0x1000_0000;
        /// Apply on the outbound path.
        const OUT = 0x2000_0000;
    }
}

/// Insert a rule after every existing sibling instead of at a caller
/// chosen priority.
pub const NPF_PRI_NEXT: i32 = -1;

/// The language a compiled match program is expressed in. The program
/// itself is produced by a separate compiler and is opaque to the
/// control plane.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[repr(u32)]
pub enum MatchCodeKind {
    Ncode = 1,
    Bpf = 2,
}

/// A compiled match program attached to a rule.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchCode {
    pub kind: MatchCodeKind,
    pub code: Vec<u8>,
}

/// One rule as shipped to the engine. Sibling order within `subrules`
/// (and within [`crate::cmd::LoadConfigReq::rules`]) is the inspection
/// order: priority ascending, insertion order breaking ties.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RuleDef {
    pub name: Option<String>,
    pub attr: RuleFlags,
    /// Resolved interface index; 0 applies the rule to all interfaces.
    pub ifidx: u32,
    pub priority: i32,
    pub code: Option<MatchCode>,
    pub subrules: Vec<RuleDef>,
}

/// Longest accepted rule-processor name, terminator included.
pub const NPF_RPROC_NAME_LEN: usize = 32;

/// A named post-match processing step referenced by rules.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RprocDef {
    pub name: String,
}
