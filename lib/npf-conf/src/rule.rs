// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Free-standing rules and the arena-backed rule forest.

use crate::error::Error;
use npf_api::MatchCode;
use npf_api::MatchCodeKind;
use npf_api::NPF_PRI_NEXT;
use npf_api::RuleDef;
use npf_api::RuleFlags;
use std::ffi::CString;

/// Interface token applying a rule to every interface.
pub const IF_WILDCARD: &str = "*";

/// A match-and-action rule.
///
/// Free-standing until inserted into a [`crate::Config`], which takes
/// ownership and hands back a [`RuleId`].
#[derive(Clone, Debug)]
pub struct Rule {
    name: Option<String>,
    flags: RuleFlags,
    ifidx: u32,
    code: Option<MatchCode>,
}

impl Rule {
    /// Build a rule.
    ///
    /// An `interface` of `None` or [`IF_WILDCARD`] selects every
    /// interface (index 0). A concrete name must resolve to a live
    /// interface.
    pub fn new(
        name: Option<&str>,
        flags: RuleFlags,
        interface: Option<&str>,
    ) -> Result<Self, Error> {
        let ifidx = match interface {
            None => 0,
            Some(tok) if tok == IF_WILDCARD => 0,
            Some(ifname) => resolve_ifname(ifname)?,
        };

        Ok(Rule {
            name: name.map(String::from),
            flags,
            ifidx,
            code: None,
        })
    }

    /// Attach a compiled match program. The contents are opaque here;
    /// whatever is attached when the owning configuration next submits
    /// is what ships.
    pub fn set_code(&mut self, kind: MatchCodeKind, code: Vec<u8>) {
        self.code = Some(MatchCode { kind, code });
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn flags(&self) -> RuleFlags {
        self.flags
    }

    /// The resolved interface index; 0 means every interface.
    pub fn ifidx(&self) -> u32 {
        self.ifidx
    }
}

/// Resolve a concrete interface name to its index.
///
/// Index 0 is reserved for the wildcard and never reaches this path,
/// so `if_nametoindex(3)` returning 0 always means the interface does
/// not exist.
fn resolve_ifname(name: &str) -> Result<u32, Error> {
    let cname = CString::new(name)
        .map_err(|_| Error::InvalidInterface(name.to_string()))?;

    let idx = unsafe { libc::if_nametoindex(cname.as_ptr()) };
    if idx == 0 {
        return Err(Error::InvalidInterface(name.to_string()));
    }

    Ok(idx)
}

/// Identifies a rule inside the configuration that owns it. Ids are
/// never reused for the life of the configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RuleId(pub(crate) usize);

#[derive(Debug)]
struct RuleNode {
    rule: Rule,
    priority: i32,
    children: Vec<RuleId>,
}

/// The rule forest. Nodes live in an arena addressed by [`RuleId`];
/// each sibling list is kept sorted by (priority ascending, insertion
/// order ascending).
#[derive(Debug, Default)]
pub(crate) struct RuleTree {
    nodes: Vec<RuleNode>,
    roots: Vec<RuleId>,
}

impl RuleTree {
    pub(crate) fn insert(
        &mut self,
        parent: Option<RuleId>,
        rule: Rule,
        priority: i32,
    ) -> Result<RuleId, Error> {
        if let Some(p) = parent {
            if p.0 >= self.nodes.len() {
                return Err(Error::ParentNotFound);
            }
        }

        let (priority, pos) = {
            let siblings: &[RuleId] = match parent {
                None => &self.roots,
                Some(p) => &self.nodes[p.0].children,
            };

            // NPF_PRI_NEXT adopts the last sibling's priority and then
            // loses the tiebreak to it, landing at the end of the list.
            let priority = if priority == NPF_PRI_NEXT {
                siblings
                    .last()
                    .map(|s| self.nodes[s.0].priority)
                    .unwrap_or(0)
            } else {
                priority
            };

            // First sibling sorting strictly later; equal priorities
            // keep insertion order.
            let pos = siblings
                .iter()
                .position(|s| self.nodes[s.0].priority > priority)
                .unwrap_or(siblings.len());

            (priority, pos)
        };

        let id = RuleId(self.nodes.len());
        self.nodes.push(RuleNode { rule, priority, children: Vec::new() });

        let siblings = match parent {
            None => &mut self.roots,
            Some(p) => &mut self.nodes[p.0].children,
        };
        siblings.insert(pos, id);

        Ok(id)
    }

    pub(crate) fn set_code(
        &mut self,
        id: RuleId,
        kind: MatchCodeKind,
        code: Vec<u8>,
    ) -> Result<(), Error> {
        let node = self.nodes.get_mut(id.0).ok_or(Error::RuleNotFound)?;
        node.rule.set_code(kind, code);
        Ok(())
    }

    /// Exact, case-sensitive name lookup over the whole forest.
    pub(crate) fn exists(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.rule.name.as_deref() == Some(name))
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// The forest in transmission order.
    pub(crate) fn to_defs(&self) -> Vec<RuleDef> {
        self.roots.iter().map(|&r| self.def_of(r)).collect()
    }

    fn def_of(&self, id: RuleId) -> RuleDef {
        let node = &self.nodes[id.0];
        RuleDef {
            name: node.rule.name.clone(),
            attr: node.rule.flags,
            ifidx: node.rule.ifidx,
            priority: node.priority,
            code: node.rule.code.clone(),
            subrules: node.children.iter().map(|&c| self.def_of(c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Rule {
        Rule::new(Some(name), RuleFlags::PASS, None).unwrap()
    }

    #[test]
    fn priority_orders_siblings() {
        let mut tree = RuleTree::default();
        tree.insert(None, named("low"), 10).unwrap();
        tree.insert(None, named("high"), 1).unwrap();
        tree.insert(None, named("mid"), 5).unwrap();

        let order: Vec<_> = tree
            .to_defs()
            .iter()
            .map(|d| d.name.clone().unwrap())
            .collect();
        assert_eq!(order, ["high", "mid", "low"]);
    }

    #[test]
    fn equal_priority_keeps_insertion_order() {
        let mut tree = RuleTree::default();
        tree.insert(None, named("r1"), 0).unwrap();
        tree.insert(None, named("r2"), 0).unwrap();
        tree.insert(None, named("r3"), 0).unwrap();

        let order: Vec<_> = tree
            .to_defs()
            .iter()
            .map(|d| d.name.clone().unwrap())
            .collect();
        assert_eq!(order, ["r1", "r2", "r3"]);
    }

    #[test]
    fn pri_next_lands_last() {
        let mut tree = RuleTree::default();
        tree.insert(None, named("a"), 7).unwrap();
        tree.insert(None, named("b"), 3).unwrap();
        tree.insert(None, named("tail"), NPF_PRI_NEXT).unwrap();

        let defs = tree.to_defs();
        let order: Vec<_> =
            defs.iter().map(|d| d.name.clone().unwrap()).collect();
        assert_eq!(order, ["b", "a", "tail"]);
        assert_eq!(defs[2].priority, 7);
    }

    #[test]
    fn pri_next_on_empty_list() {
        let mut tree = RuleTree::default();
        tree.insert(None, named("only"), NPF_PRI_NEXT).unwrap();
        assert_eq!(tree.to_defs()[0].priority, 0);
    }

    #[test]
    fn children_nest_under_parent() {
        let mut tree = RuleTree::default();
        let parent = tree.insert(None, named("group"), 0).unwrap();
        tree.insert(Some(parent), named("kid2"), 2).unwrap();
        tree.insert(Some(parent), named("kid1"), 1).unwrap();

        let defs = tree.to_defs();
        assert_eq!(defs.len(), 1);
        let kids: Vec<_> = defs[0]
            .subrules
            .iter()
            .map(|d| d.name.clone().unwrap())
            .collect();
        assert_eq!(kids, ["kid1", "kid2"]);
    }

    #[test]
    fn bogus_parent_rejected() {
        let mut tree = RuleTree::default();
        let err = tree.insert(Some(RuleId(4)), named("r"), 0).unwrap_err();
        assert!(matches!(err, Error::ParentNotFound));
    }

    #[test]
    fn exists_is_exact_and_deep() {
        let mut tree = RuleTree::default();
        let parent = tree.insert(None, named("outer"), 0).unwrap();
        tree.insert(Some(parent), named("inner"), 0).unwrap();

        assert!(tree.exists("outer"));
        assert!(tree.exists("inner"));
        assert!(!tree.exists("Inner"));
        assert!(!tree.exists("in"));
    }
}
