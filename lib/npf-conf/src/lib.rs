// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory firewall configuration and its atomic submission to the
//! NPF kernel engine.
//!
//! A [`Config`] aggregates a priority-ordered rule forest, an address
//! table store, a rule-processor registry, a NAT policy set, and at
//! most one cached channel to the control device. Rules, tables, and
//! rule processors are built free-standing and transfer ownership into
//! the configuration on insert; [`Config::submit`] then replaces the
//! engine's active configuration in one atomic load.
//!
//! ```no_run
//! use npf_conf::Config;
//! use npf_conf::Rule;
//! use npf_conf::api::RuleFlags;
//!
//! # fn main() -> Result<(), npf_conf::Error> {
//! let mut conf = Config::new();
//! let attrs = RuleFlags::PASS | RuleFlags::STATEFUL | RuleFlags::IN;
//! let rule = Rule::new(Some("allow-ssh"), attrs, None)?;
//! conf.insert_rule(None, rule, 0)?;
//! conf.submit()?;
//! # Ok(())
//! # }
//! ```

#![deny(unreachable_patterns)]
#![deny(unused_must_use)]

pub mod config;
pub mod error;
pub mod nat;
pub mod rproc;
pub mod rule;
pub mod table;

pub use config::Config;
pub use error::Error;
pub use nat::NatPolicy;
pub use rproc::RuleProc;
pub use rule::IF_WILDCARD;
pub use rule::Rule;
pub use rule::RuleId;
pub use table::Table;

pub use npf_api as api;
pub use npf_ioctl::NpfHdl;
pub use npf_ioctl::stats;
pub use npf_ioctl::stats_on;
