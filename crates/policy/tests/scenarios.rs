//! End-to-end match scenarios, one per row of the documented scenario table.

use policy::{from_document_str, Matcher, Reason};

fn ip(s: &str) -> std::net::IpAddr {
    s.parse().unwrap()
}

#[test]
fn scenario_1_allow_list_admits_matching_address() {
    let p = from_document_str(
        r#"
allowList: ["192.168.1.0/24"]
defaultAction: deny
"#,
    )
    .unwrap();
    let m = Matcher::new(p);
    let (admit, reason) = m.is_allowed(ip("192.168.1.100"));
    assert!(admit);
    assert!(matches!(reason, Reason::WhitelistRule { .. }));
}

#[test]
fn scenario_2_deny_wins_over_allow_for_overlapping_entry() {
    let p = from_document_str(
        r#"
allowList: ["192.168.1.0/24"]
denyList: ["192.168.1.50"]
defaultAction: deny
"#,
    )
    .unwrap();
    let m = Matcher::new(p);
    let (admit, reason) = m.is_allowed(ip("192.168.1.50"));
    assert!(!admit);
    assert!(matches!(reason, Reason::BlacklistRule { .. }));
}

#[test]
fn scenario_3_deny_wins_even_when_default_action_is_allow() {
    let p = from_document_str(
        r#"
mode: both
allowList: ["10.0.0.0/24"]
denyList: ["10.0.0.5"]
defaultAction: allow
"#,
    )
    .unwrap();
    let m = Matcher::new(p);
    let (admit, reason) = m.is_allowed(ip("10.0.0.5"));
    assert!(!admit);
    assert!(matches!(reason, Reason::BlacklistRule { .. }));
}

#[test]
fn scenario_4_blacklist_only_with_empty_lists_admits_by_default() {
    let p = from_document_str("mode: blacklist\n").unwrap();
    let m = Matcher::new(p);
    let (admit, reason) = m.is_allowed(ip("8.8.8.8"));
    assert!(admit);
    assert_eq!(reason, Reason::NotInBlacklist);
}

#[test]
fn scenario_5_unmatched_address_denied_when_allow_list_present() {
    let p = from_document_str(
        r#"
allowList: ["192.168.1.0/24"]
defaultAction: deny
"#,
    )
    .unwrap();
    let m = Matcher::new(p);
    let (admit, reason) = m.is_allowed(ip("172.16.0.1"));
    assert!(!admit);
    assert_eq!(reason, Reason::NotInWhitelist);
}

#[test]
fn scenario_6_ipv6_whitelist_match() {
    let p = from_document_str(
        r#"
mode: whitelist
allowList: ["fe80::/64"]
"#,
    )
    .unwrap();
    let m = Matcher::new(p);
    let (admit, reason) = m.is_allowed(ip("fe80::1"));
    assert!(admit);
    assert!(matches!(reason, Reason::WhitelistRule { .. }));
}

#[test]
fn boundary_bare_ipv4_equals_slash32() {
    let a = from_document_str("allowList: [\"10.0.0.100\"]\ndefaultAction: deny\n").unwrap();
    let b = from_document_str("allowList: [\"10.0.0.100/32\"]\ndefaultAction: deny\n").unwrap();
    assert_eq!(a.allow()[0].prefix, b.allow()[0].prefix);
}

#[test]
fn boundary_default_route_admits_every_ipv4() {
    let p = from_document_str("allowList: [\"0.0.0.0/0\"]\ndefaultAction: deny\n").unwrap();
    let m = Matcher::new(p);
    assert!(m.is_allowed(ip("1.2.3.4")).0);
    assert!(m.is_allowed(ip("255.255.255.255")).0);
}

#[test]
fn stats_total_always_equals_admitted_plus_denied() {
    let p = from_document_str(
        r#"
allowList: ["10.0.0.0/24"]
defaultAction: deny
"#,
    )
    .unwrap();
    let m = Matcher::new(p);
    for addr in ["10.0.0.5", "172.16.0.1", "10.0.0.200", "9.9.9.9"] {
        m.is_allowed(ip(addr));
    }
    let s = m.stats();
    assert_eq!(s.total, 4);
    assert_eq!(s.total, s.admitted + s.denied);
}
