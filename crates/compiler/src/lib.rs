//! Translates a validated [`policy::Policy`] into a totally-ordered list of
//! packet-filter rules for an external packet processor.
//!
//! Priority bands (lower number = higher priority, matching the external
//! processor's convention):
//!
//! | Band    | Range      | Population                                |
//! |---------|------------|--------------------------------------------|
//! | Deny    | 1..1000    | one entry per deny-set rule                |
//! | Allow   | 1001..2000 | one entry per allow-set rule               |
//! | Default | 9999       | catch-all over `0.0.0.0/0`, default action |

#![deny(unsafe_code)]
#![warn(missing_docs)]

use ipnet::IpNet;
use policy::{DefaultAction, Policy};
use serde::Serialize;

const DENY_BAND_START: u32 = 1;
const DENY_BAND_END: u32 = 1000;
const ALLOW_BAND_START: u32 = 1001;
const ALLOW_BAND_END: u32 = 2000;
const DEFAULT_PRIORITY: u32 = 9999;

/// A single compiled packet-filter rule.
///
/// Only the source prefix is meaningful: the policy domain is source-IP
/// only (see the crate's non-goals), so destination, protocol, and port
/// fields are left to the installer as wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketFilterRule {
    /// Source prefix this rule matches.
    pub source: IpNet,
    /// `true` to permit, `false` to deny.
    pub permit: bool,
    /// Installer-facing priority; lower evaluates first.
    pub priority: u32,
}

/// The compiler could not produce a rule list for the given policy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    /// A rule set has more entries than its priority band can hold. This
    /// should not happen given the 1000-rule combined cap enforced at
    /// policy construction, but is checked explicitly rather than assumed.
    #[error("{band} set has {count} rules, exceeding its priority band capacity")]
    RuleBudgetExceeded {
        /// Which band overflowed (`"deny"` or `"allow"`).
        band: &'static str,
        /// How many rules were in the offending set.
        count: usize,
    },
}

/// Compile a policy into its ordered packet-filter rule list.
///
/// Output order is fixed: all deny-band rules (ascending priority), then
/// all allow-band rules, then the single default-band rule. This ordering
/// is a contract the external installer relies on.
pub fn compile(policy: &Policy) -> Result<Vec<PacketFilterRule>, CompileError> {
    let deny_capacity = (DENY_BAND_END - DENY_BAND_START) as usize;
    if policy.deny().len() > deny_capacity {
        return Err(CompileError::RuleBudgetExceeded { band: "deny", count: policy.deny().len() });
    }
    let allow_capacity = (ALLOW_BAND_END - ALLOW_BAND_START) as usize;
    if policy.allow().len() > allow_capacity {
        return Err(CompileError::RuleBudgetExceeded {
            band: "allow",
            count: policy.allow().len(),
        });
    }

    let mut rules = Vec::with_capacity(policy.deny().len() + policy.allow().len() + 1);

    for (i, rule) in policy.deny().iter().enumerate() {
        rules.push(PacketFilterRule {
            source: rule.prefix,
            permit: false,
            priority: DENY_BAND_START + i as u32,
        });
    }
    for (i, rule) in policy.allow().iter().enumerate() {
        rules.push(PacketFilterRule {
            source: rule.prefix,
            permit: true,
            priority: ALLOW_BAND_START + i as u32,
        });
    }

    let default_permit = matches!(policy.default_action(), DefaultAction::Allow);
    rules.push(PacketFilterRule {
        source: "0.0.0.0/0".parse().expect("static default route parses"),
        permit: default_permit,
        priority: DEFAULT_PRIORITY,
    });

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy::{from_document_str, Mode, Policy};

    #[test]
    fn compiler_scenario_from_property_table() {
        let p = from_document_str(
            r#"
mode: both
defaultAction: deny
allowList: ["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"]
denyList: ["10.0.0.5", "10.0.1.5"]
"#,
        )
        .unwrap();
        let rules = compile(&p).unwrap();
        assert_eq!(rules.len(), 6);
        let priorities: Vec<u32> = rules.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 2, 1001, 1002, 1003, 9999]);
        assert!(!rules.last().unwrap().permit);
        assert_eq!(rules.last().unwrap().source, "0.0.0.0/0".parse().unwrap());
    }

    #[test]
    fn output_length_is_allow_plus_deny_plus_one() {
        let p = Policy::new(
            Some(Mode::BlacklistOnly),
            None,
            vec![],
            vec![ipfilter_core::CidrRule::parse("10.0.0.1").unwrap()],
        )
        .unwrap();
        assert_eq!(compile(&p).unwrap().len(), 2);
    }

    #[test]
    fn priorities_strictly_increase_within_each_band() {
        let allow: Vec<_> = (0..5)
            .map(|i| format!("10.0.{i}.0/24"))
            .collect();
        let yaml = serde_yaml::to_string(&serde_json::json!({
            "allowList": allow,
            "defaultAction": "deny",
        }))
        .unwrap();
        let p = from_document_str(&yaml).unwrap();
        let rules = compile(&p).unwrap();
        let allow_band: Vec<u32> =
            rules.iter().filter(|r| r.permit && r.priority != 9999).map(|r| r.priority).collect();
        for w in allow_band.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn default_rule_reflects_default_action() {
        let p = Policy::new(Some(Mode::BlacklistOnly), None, vec![], vec![]).unwrap();
        let rules = compile(&p).unwrap();
        assert!(rules[0].permit);
        assert_eq!(rules[0].priority, 9999);
    }
}
