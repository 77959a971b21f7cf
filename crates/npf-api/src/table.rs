// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire representation of address tables.

use crate::ip::IpCidr;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Display;
use core::result;
use core::str::FromStr;
use serde::Deserialize;
use serde::Serialize;

/// Largest table index the engine accepts.
pub const NPF_MAX_TABLE_ID: u32 = 16;

/// The lookup structure the engine builds for a table. Entry order is
/// insignificant for either kind.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[repr(u32)]
pub enum TableKind {
    Hash = 1,
    Tree = 2,
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hash" => Ok(TableKind::Hash),
            "tree" => Ok(TableKind::Tree),
            _ => Err(format!("invalid table kind: {s} ('hash' or 'tree')")),
        }
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableKind::Hash => write!(f, "hash"),
            TableKind::Tree => write!(f, "tree"),
        }
    }
}

/// One address table as shipped to the engine. Index uniqueness across
/// a configuration is the engine's to enforce at load time.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TableDef {
    pub id: u32,
    pub name: Option<String>,
    pub kind: TableKind,
    pub entries: Vec<IpCidr>,
}
