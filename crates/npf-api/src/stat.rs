// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine's cumulative counter set.
//!
//! `IOC_NPF_STATS` fills a contiguous `[u64; NPF_STAT_COUNT]` block in
//! the index order fixed by [`NpfStat`]. Reordering or renumbering the
//! variants is an ABI break gated by [`crate::API_VERSION`].

use serde::Deserialize;
use serde::Serialize;

/// Number of counters in the stats block.
pub const NPF_STAT_COUNT: usize = 21;

/// Index of each counter within the stats block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(usize)]
pub enum NpfStat {
    PassDefault = 0,
    PassRuleset = 1,
    PassState = 2,
    BlockDefault = 3,
    BlockRuleset = 4,
    StateCreate = 5,
    StateDestroy = 6,
    NatCreate = 7,
    NatDestroy = 8,
    NbufNoncontig = 9,
    NbufContigFail = 10,
    InvalidState = 11,
    InvalidStateTcp1 = 12,
    InvalidStateTcp2 = 13,
    InvalidStateTcp3 = 14,
    RaceNat = 15,
    RaceState = 16,
    Fragments = 17,
    Reassembly = 18,
    ReassemblyFail = 19,
    Error = 20,
}

impl NpfStat {
    /// Every counter, in block index order.
    pub const ALL: [NpfStat; NPF_STAT_COUNT] = [
        NpfStat::PassDefault,
        NpfStat::PassRuleset,
        NpfStat::PassState,
        NpfStat::BlockDefault,
        NpfStat::BlockRuleset,
        NpfStat::StateCreate,
        NpfStat::StateDestroy,
        NpfStat::NatCreate,
        NpfStat::NatDestroy,
        NpfStat::NbufNoncontig,
        NpfStat::NbufContigFail,
        NpfStat::InvalidState,
        NpfStat::InvalidStateTcp1,
        NpfStat::InvalidStateTcp2,
        NpfStat::InvalidStateTcp3,
        NpfStat::RaceNat,
        NpfStat::RaceState,
        NpfStat::Fragments,
        NpfStat::Reassembly,
        NpfStat::ReassemblyFail,
        NpfStat::Error,
    ];

    /// The counter's external name.
    pub fn name(self) -> &'static str {
        match self {
            NpfStat::PassDefault => "default-pass",
            NpfStat::PassRuleset => "ruleset-pass",
            NpfStat::PassState => "state-pass",
            NpfStat::BlockDefault => "default-block",
            NpfStat::BlockRuleset => "ruleset-block",
            NpfStat::StateCreate => "state-allocations",
            NpfStat::StateDestroy => "state-destructions",
            NpfStat::NatCreate => "nat-entry-allocations",
            NpfStat::NatDestroy => "nat-entry-destructions",
            NpfStat::NbufNoncontig => "noncontiguous-buffer-cases",
            NpfStat::NbufContigFail => "contiguous-alloc-failures",
            NpfStat::InvalidState => "invalid-state-total",
            NpfStat::InvalidStateTcp1 => "invalid-state-tcp-case-I",
            NpfStat::InvalidStateTcp2 => "invalid-state-tcp-case-II",
            NpfStat::InvalidStateTcp3 => "invalid-state-tcp-case-III",
            NpfStat::RaceNat => "nat-association-race",
            NpfStat::RaceState => "duplicate-state-race",
            NpfStat::Fragments => "fragments",
            NpfStat::Reassembly => "reassembled",
            NpfStat::ReassemblyFail => "failed-reassembly",
            NpfStat::Error => "unexpected-errors",
        }
    }
}

/// All counters at the instant of one read. Cumulative since the engine
/// was loaded.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct StatsSnapshot {
    block: [u64; NPF_STAT_COUNT],
}

impl StatsSnapshot {
    pub fn from_block(block: [u64; NPF_STAT_COUNT]) -> Self {
        Self { block }
    }

    pub fn get(&self, stat: NpfStat) -> u64 {
        self.block[stat as usize]
    }

    /// Counters in block order, paired with their index.
    pub fn iter(&self) -> impl Iterator<Item = (NpfStat, u64)> + '_ {
        NpfStat::ALL.iter().map(|&stat| (stat, self.get(stat)))
    }
}
