// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object-model scenarios that run without a packet filter device.
//! Round trips against a live engine are at the bottom, ignored by
//! default.

use npf_conf::Config;
use npf_conf::Error;
use npf_conf::NatPolicy;
use npf_conf::Rule;
use npf_conf::RuleProc;
use npf_conf::Table;
use npf_conf::api::AddressFamily;
use npf_conf::api::MatchCodeKind;
use npf_conf::api::NPF_MAX_TABLE_ID;
use npf_conf::api::NatDirection;
use npf_conf::api::NatFlags;
use npf_conf::api::RuleFlags;
use npf_conf::api::TableKind;

/// An interface name no host is expected to carry.
const NO_SUCH_IF: &str = "npf0nonesuch";

fn pass_rule(name: &str) -> Rule {
    Rule::new(Some(name), RuleFlags::PASS, None).unwrap()
}

#[test]
fn allow_ssh_scenario() {
    let mut conf = Config::new();

    let attrs = RuleFlags::PASS | RuleFlags::STATEFUL | RuleFlags::IN;
    let rule = Rule::new(Some("allow-ssh"), attrs, None).unwrap();
    assert_eq!(rule.ifidx(), 0);

    conf.insert_rule(None, rule, 0).unwrap();
    assert!(conf.rule_exists("allow-ssh"));
    assert!(!conf.rule_exists("deny-all"));

    let payload = conf.payload().unwrap();
    assert_eq!(payload.rules.len(), 1);
    assert_eq!(payload.rules[0].attr, attrs);
    assert_eq!(payload.rules[0].ifidx, 0);
    assert_eq!(payload.rules[0].priority, 0);
}

#[test]
fn wildcard_interface_is_index_zero() {
    let none = Rule::new(None, RuleFlags::PASS, None).unwrap();
    assert_eq!(none.ifidx(), 0);

    let star = Rule::new(None, RuleFlags::PASS, Some("*")).unwrap();
    assert_eq!(star.ifidx(), 0);
}

#[test]
fn unresolvable_interface_rejected() {
    let err = Rule::new(None, RuleFlags::PASS, Some(NO_SUCH_IF)).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInterface(name) if name == NO_SUCH_IF
    ));

    // Embedded NUL can never resolve either.
    let err = Rule::new(None, RuleFlags::PASS, Some("eth\0")).unwrap_err();
    assert!(matches!(err, Error::InvalidInterface(_)));
}

#[test]
fn equal_priority_wire_order_is_insertion_order() {
    let mut conf = Config::new();
    conf.insert_rule(None, pass_rule("r1"), 5).unwrap();
    conf.insert_rule(None, pass_rule("r2"), 5).unwrap();
    conf.insert_rule(None, pass_rule("first"), 1).unwrap();

    let names: Vec<_> = conf
        .payload()
        .unwrap()
        .rules
        .iter()
        .map(|r| r.name.clone().unwrap())
        .collect();
    assert_eq!(names, ["first", "r1", "r2"]);
}

#[test]
fn nested_rules_ship_under_parent() {
    let mut conf = Config::new();
    let group = conf.insert_rule(None, pass_rule("group"), 0).unwrap();
    conf.insert_rule(Some(group), pass_rule("kid"), 0).unwrap();

    assert!(conf.rule_exists("kid"));

    let payload = conf.payload().unwrap();
    assert_eq!(payload.rules.len(), 1);
    assert_eq!(payload.rules[0].subrules.len(), 1);
    assert_eq!(payload.rules[0].subrules[0].name.as_deref(), Some("kid"));
}

#[test]
fn match_code_attaches_before_and_after_insert() {
    let mut conf = Config::new();

    let mut rule = pass_rule("pre");
    rule.set_code(MatchCodeKind::Bpf, vec![0x06, 0, 0, 0]);
    conf.insert_rule(None, rule, 0).unwrap();

    let id = conf.insert_rule(None, pass_rule("post"), 1).unwrap();
    conf.set_rule_code(id, MatchCodeKind::Ncode, vec![0x01]).unwrap();

    let payload = conf.payload().unwrap();
    let pre = &payload.rules[0];
    let post = &payload.rules[1];
    assert_eq!(pre.code.as_ref().unwrap().kind, MatchCodeKind::Bpf);
    assert_eq!(post.code.as_ref().unwrap().kind, MatchCodeKind::Ncode);
    assert_eq!(post.code.as_ref().unwrap().code, vec![0x01]);
}

#[test]
fn table_insert_and_lookup() {
    let mut conf = Config::new();

    let mut table =
        Table::new(Some("blocklist"), 2, TableKind::Tree).unwrap();
    table.add_entry("192.0.2.0/24".parse().unwrap());
    conf.insert_table(table).unwrap();

    assert!(conf.table_exists(2));
    assert!(!conf.table_exists(3));

    let payload = conf.payload().unwrap();
    assert_eq!(payload.tables.len(), 1);
    assert_eq!(payload.tables[0].entries.len(), 1);
}

#[test]
fn table_index_boundary() {
    assert!(Table::new(None, NPF_MAX_TABLE_ID, TableKind::Hash).is_ok());
    assert!(matches!(
        Table::new(None, NPF_MAX_TABLE_ID + 1, TableKind::Hash),
        Err(Error::TableIdOutOfRange(_))
    ));
}

#[test]
fn destroy_is_idempotent_and_guards_reuse() {
    let mut conf = Config::new();
    conf.insert_rule(None, pass_rule("r"), 0).unwrap();

    conf.destroy();
    conf.destroy();

    assert!(!conf.rule_exists("r"));
    assert!(!conf.table_exists(0));

    let err = conf.insert_rule(None, pass_rule("late"), 0).unwrap_err();
    assert!(matches!(err, Error::ConfigDestroyed));

    let err = conf.submit().unwrap_err();
    assert!(matches!(err, Error::ConfigDestroyed));

    let err = conf.flush().unwrap_err();
    assert!(matches!(err, Error::ConfigDestroyed));

    let err = conf.payload().unwrap_err();
    assert!(matches!(err, Error::ConfigDestroyed));
}

#[test]
fn undefined_operations_refuse() {
    let mut conf = Config::new();

    let rproc = RuleProc::new("log").unwrap();
    assert!(matches!(
        conf.insert_rproc(rproc),
        Err(Error::NotImplemented("rproc.insert"))
    ));
    assert!(matches!(
        conf.rproc_exists("log"),
        Err(Error::NotImplemented("rproc.exists"))
    ));
    assert!(matches!(
        conf.update_rule(),
        Err(Error::NotImplemented("update_rule"))
    ));
    assert!(matches!(
        NatPolicy::new(NatDirection::In, NatFlags::PORTS, AddressFamily::Inet),
        Err(Error::NotImplemented("nat.create"))
    ));
}

#[test]
fn payload_serializes_for_the_wire() {
    let mut conf = Config::new();
    conf.insert_rule(None, pass_rule("r"), 0).unwrap();

    let mut table = Table::new(None, 0, TableKind::Hash).unwrap();
    table.add_entry("198.51.100.1/32".parse().unwrap());
    conf.insert_table(table).unwrap();

    let bytes = postcard::to_allocvec(&conf.payload().unwrap()).unwrap();
    assert!(!bytes.is_empty());
}

// ================================================================
// Round trips against a live engine. These need a kernel with the
// packet filter attached and enough privilege to open /dev/npf.
// ================================================================

#[test]
#[ignore = "requires /dev/npf"]
fn live_empty_submit_then_flush_idempotent() {
    let mut conf = Config::new();
    conf.submit().unwrap();
    conf.flush().unwrap();
    // Flushing an already-empty active configuration is a no-op at
    // the engine.
    conf.flush().unwrap();
}

#[test]
#[ignore = "requires /dev/npf"]
fn live_stats_closed_set() {
    use npf_conf::api::NPF_STAT_COUNT;

    let snap = npf_conf::stats().unwrap();
    assert_eq!(snap.iter().count(), NPF_STAT_COUNT);
}
