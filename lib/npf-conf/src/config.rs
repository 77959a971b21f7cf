// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The configuration aggregate and its submission protocol.

use crate::error::Error;
use crate::nat::NatPolicy;
use crate::rproc::RuleProc;
use crate::rule::Rule;
use crate::rule::RuleId;
use crate::rule::RuleTree;
use crate::table::Table;
use crate::table::TableStore;
use npf_api::LoadConfigReq;
use npf_api::MatchCodeKind;
use npf_ioctl::NpfHdl;

/// An editable bundle of rules, tables, rule processors, and NAT
/// policies, loaded into the engine as one atomic unit.
///
/// The control channel is opened on first need and cached; it closes
/// exactly once, when the configuration is destroyed. [`Config::destroy`]
/// is idempotent and also runs on drop, so release is deterministic
/// whether the host calls it or lets the value go out of scope.
///
/// No internal locking: one logical caller per configuration, which
/// the `&mut` receivers encode.
#[derive(Debug, Default)]
pub struct Config {
    rules: RuleTree,
    tables: TableStore,
    rprocs: Vec<RuleProc>,
    nat: Vec<NatPolicy>,
    channel: Option<NpfHdl>,
    released: bool,
}

impl Config {
    /// A new empty configuration. Never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Release everything the configuration owns and close the control
    /// channel if one was opened. Safe to call any number of times;
    /// calls after the first are no-ops.
    pub fn destroy(&mut self) {
        if self.released {
            return;
        }

        self.rules.clear();
        self.tables.clear();
        self.rprocs.clear();
        self.nat.clear();
        self.channel = None;
        self.released = true;
    }

    fn guard(&self) -> Result<(), Error> {
        if self.released {
            return Err(Error::ConfigDestroyed);
        }
        Ok(())
    }

    /// Transfer ownership of `rule` into the configuration, placed
    /// under `parent` (or as a root when absent). Siblings order by
    /// priority ascending; equal priorities keep insertion order.
    pub fn insert_rule(
        &mut self,
        parent: Option<RuleId>,
        rule: Rule,
        priority: i32,
    ) -> Result<RuleId, Error> {
        self.guard()?;
        self.rules.insert(parent, rule, priority)
    }

    /// Attach a compiled match program to an already-inserted rule.
    /// Takes effect at the next submit.
    pub fn set_rule_code(
        &mut self,
        id: RuleId,
        kind: MatchCodeKind,
        code: Vec<u8>,
    ) -> Result<(), Error> {
        self.guard()?;
        self.rules.set_code(id, kind, code)
    }

    /// Exact, case-sensitive lookup over all rules at any depth.
    /// `false` once the configuration is destroyed.
    pub fn rule_exists(&self, name: &str) -> bool {
        self.rules.exists(name)
    }

    /// Transfer ownership of `table` into the configuration. Reports
    /// its status immediately; a duplicate index is an engine-side
    /// conflict surfaced at load time, not here.
    pub fn insert_table(&mut self, table: Table) -> Result<(), Error> {
        self.guard()?;
        self.tables.insert(table);
        Ok(())
    }

    /// Lookup by table index. `false` once the configuration is
    /// destroyed.
    pub fn table_exists(&self, id: u32) -> bool {
        self.tables.exists(id)
    }

    /// Not implemented: rule-processor registration is undefined by
    /// the engine contract so far.
    pub fn insert_rproc(&mut self, _rproc: RuleProc) -> Result<(), Error> {
        self.guard()?;
        Err(Error::NotImplemented("rproc.insert"))
    }

    /// Not implemented: see [`Config::insert_rproc`].
    pub fn rproc_exists(&self, _name: &str) -> Result<bool, Error> {
        self.guard()?;
        Err(Error::NotImplemented("rproc.exists"))
    }

    /// Not implemented: NAT policy creation is undefined by the engine
    /// contract so far (see [`crate::nat::NatPolicy::new`]).
    pub fn insert_nat(&mut self, _nat: NatPolicy) -> Result<(), Error> {
        self.guard()?;
        Err(Error::NotImplemented("nat.insert"))
    }

    /// Placeholder for incremental single-rule update of the active
    /// configuration.
    pub fn update_rule(&mut self) -> Result<(), Error> {
        self.guard()?;
        Err(Error::NotImplemented("update_rule"))
    }

    /// The full load request this configuration would submit, in
    /// transmission order.
    pub fn payload(&self) -> Result<LoadConfigReq, Error> {
        self.guard()?;
        Ok(LoadConfigReq {
            rules: self.rules.to_defs(),
            tables: self.tables.to_defs(),
            rprocs: self.rprocs.iter().map(RuleProc::to_def).collect(),
            nat: self.nat.iter().map(NatPolicy::to_def).collect(),
        })
    }

    /// Atomically replace the engine's active configuration with this
    /// one. May be called any number of times; every call ships the
    /// full configuration, never an incremental patch.
    pub fn submit(&mut self) -> Result<(), Error> {
        let req = self.payload()?;
        self.channel()?.load_config(&req)?;
        Ok(())
    }

    /// Atomically replace the engine's active configuration with an
    /// empty one, through the same cached channel discipline as
    /// [`Config::submit`]. Idempotent at the engine.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.guard()?;
        self.channel()?.flush_config()?;
        Ok(())
    }

    /// The cached control channel, opened on first need. A failed open
    /// leaves the configuration without a channel; a later call tries
    /// again.
    fn channel(&mut self) -> Result<&NpfHdl, Error> {
        let hdl = match self.channel.take() {
            Some(hdl) => hdl,
            None => NpfHdl::open()?,
        };
        Ok(self.channel.insert(hdl))
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        self.destroy();
    }
}
