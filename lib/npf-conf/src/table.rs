// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Free-standing address tables and the table store.

use crate::error::Error;
use npf_api::IpCidr;
use npf_api::NPF_MAX_TABLE_ID;
use npf_api::TableDef;
use npf_api::TableKind;

/// A set of address/prefix entries referenced by rule match programs.
///
/// Free-standing until inserted into a [`crate::Config`]. Entry order
/// is insignificant: the engine builds its own lookup structure from
/// the set.
#[derive(Clone, Debug)]
pub struct Table {
    id: u32,
    name: Option<String>,
    kind: TableKind,
    entries: Vec<IpCidr>,
}

impl Table {
    /// Build a table. The index must lie within
    /// `[0, NPF_MAX_TABLE_ID]`; uniqueness across a configuration is
    /// checked by the engine at load time, not here.
    pub fn new(
        name: Option<&str>,
        id: u32,
        kind: TableKind,
    ) -> Result<Self, Error> {
        if id > NPF_MAX_TABLE_ID {
            return Err(Error::TableIdOutOfRange(id));
        }

        Ok(Table {
            id,
            name: name.map(String::from),
            kind,
            entries: Vec::new(),
        })
    }

    /// Append an address/prefix entry.
    pub fn add_entry(&mut self, entry: IpCidr) {
        self.entries.push(entry);
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub(crate) fn to_def(&self) -> TableDef {
        TableDef {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            entries: self.entries.clone(),
        }
    }
}

/// Tables owned by a configuration.
#[derive(Debug, Default)]
pub(crate) struct TableStore {
    tables: Vec<Table>,
}

impl TableStore {
    pub(crate) fn insert(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub(crate) fn exists(&self, id: u32) -> bool {
        self.tables.iter().any(|t| t.id == id)
    }

    pub(crate) fn clear(&mut self) {
        self.tables.clear();
    }

    pub(crate) fn to_defs(&self) -> Vec<TableDef> {
        self.tables.iter().map(Table::to_def).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_boundary() {
        assert!(Table::new(None, NPF_MAX_TABLE_ID, TableKind::Hash).is_ok());

        let err = Table::new(None, NPF_MAX_TABLE_ID + 1, TableKind::Hash)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TableIdOutOfRange(id) if id == NPF_MAX_TABLE_ID + 1
        ));
    }

    #[test]
    fn entries_accumulate() {
        let mut table = Table::new(Some("blocklist"), 1, TableKind::Tree)
            .unwrap();
        table.add_entry("10.0.0.0/8".parse().unwrap());
        table.add_entry("fd00::/8".parse().unwrap());

        let def = table.to_def();
        assert_eq!(def.entries.len(), 2);
        assert_eq!(def.name.as_deref(), Some("blocklist"));
        assert_eq!(def.kind, TableKind::Tree);
    }
}
