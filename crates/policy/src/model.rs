//! The `Policy` data type: valid by construction.
//!
//! There is no code path that produces a `Policy` whose invariants do not
//! hold — [`Policy::new`] is the only constructor, and it performs every
//! check the rest of the crate would otherwise have to re-verify on every
//! use. Downstream components (the [`crate::matcher::Matcher`] in
//! particular) can therefore treat a `Policy` as infallible to apply.

use ipfilter_core::CidrRule;
use serde::{Deserialize, Serialize};

/// Maximum combined allow + deny rule count a single policy may hold.
pub const MAX_RULES: usize = 1000;

/// The filter mode selected by a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Only the allow set is meaningful; unmatched traffic is denied.
    #[serde(rename = "whitelist")]
    WhitelistOnly,
    /// Only the deny set is meaningful; unmatched traffic is allowed.
    #[serde(rename = "blacklist")]
    BlacklistOnly,
    /// Both sets are active; the default action must be given explicitly.
    #[serde(rename = "both")]
    Both,
}

/// The verdict applied when no rule in either set matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultAction {
    /// Admit the connection.
    Allow,
    /// Deny the connection.
    Deny,
}

/// A complete, validated access-control policy: allow set, deny set, mode,
/// and default action. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    mode: Mode,
    allow: Vec<CidrRule>,
    deny: Vec<CidrRule>,
    default_action: DefaultAction,
}

/// A `Policy` failed one or more of its construction invariants.
#[derive(Debug, Clone, thiserror::Error)]
#[error("policy validation failed with {} error(s): {}", .errors.len(), .errors.join("; "))]
pub struct PolicyInvariantError {
    /// One message per violated invariant; never empty.
    pub errors: Vec<String>,
}

impl Policy {
    /// Construct and validate a policy from its already-parsed rule sets.
    ///
    /// `requested_mode` and `requested_default_action` are the raw document
    /// fields; see module docs on [`crate::loader`] for how the two are
    /// reconciled when the caller has parsed a raw document. This
    /// constructor performs the final reconciliation and rejects
    /// contradictions rather than silently picking one field over the
    /// other.
    pub fn new(
        requested_mode: Option<Mode>,
        requested_default_action: Option<DefaultAction>,
        allow: Vec<CidrRule>,
        deny: Vec<CidrRule>,
    ) -> Result<Self, PolicyInvariantError> {
        log_allow_deny_overlaps(&allow, &deny);

        let mut errors = Vec::new();

        if allow.len() + deny.len() > MAX_RULES {
            errors.push(format!(
                "total rule count {} exceeds maximum of {MAX_RULES}",
                allow.len() + deny.len()
            ));
        }

        let resolved_mode = requested_mode.unwrap_or_else(|| {
            if !allow.is_empty() && !deny.is_empty() {
                Mode::Both
            } else if !deny.is_empty() {
                Mode::BlacklistOnly
            } else {
                Mode::WhitelistOnly
            }
        });

        let resolved_default_action = match (resolved_mode, requested_default_action) {
            (Mode::Both, None) => {
                errors.push(
                    "mode 'both' requires an explicit defaultAction".to_string(),
                );
                DefaultAction::Deny
            }
            (Mode::Both, Some(explicit)) => explicit,
            (Mode::WhitelistOnly, None) => DefaultAction::Deny,
            (Mode::WhitelistOnly, Some(DefaultAction::Deny)) => DefaultAction::Deny,
            (Mode::WhitelistOnly, Some(DefaultAction::Allow)) => {
                errors.push(
                    "mode 'whitelist' contradicts defaultAction 'allow'; whitelist mode always defaults to deny".to_string(),
                );
                DefaultAction::Deny
            }
            (Mode::BlacklistOnly, None) => DefaultAction::Allow,
            (Mode::BlacklistOnly, Some(DefaultAction::Allow)) => DefaultAction::Allow,
            (Mode::BlacklistOnly, Some(DefaultAction::Deny)) => {
                errors.push(
                    "mode 'blacklist' contradicts defaultAction 'deny'; blacklist mode always defaults to allow".to_string(),
                );
                DefaultAction::Allow
            }
        };

        if !errors.is_empty() {
            return Err(PolicyInvariantError { errors });
        }

        Ok(Self { mode: resolved_mode, allow, deny, default_action: resolved_default_action })
    }

    /// The resolved filter mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The allow-set rules, in document order.
    #[must_use]
    pub fn allow(&self) -> &[CidrRule] {
        &self.allow
    }

    /// The deny-set rules, in document order.
    #[must_use]
    pub fn deny(&self) -> &[CidrRule] {
        &self.deny
    }

    /// The resolved default action.
    #[must_use]
    pub fn default_action(&self) -> DefaultAction {
        self.default_action
    }
}

/// Log a warning for every allow/deny prefix pair that overlaps. Overlap is
/// not rejected — deny-wins match semantics make it unambiguous at match
/// time — but it usually signals a document authoring mistake worth an
/// operator's attention.
fn log_allow_deny_overlaps(allow: &[CidrRule], deny: &[CidrRule]) {
    for a in allow {
        for d in deny {
            if prefixes_overlap(&a.prefix, &d.prefix) {
                tracing::warn!(
                    allow = %a.prefix,
                    deny = %d.prefix,
                    "allow and deny rule prefixes overlap"
                );
            }
        }
    }
}

fn prefixes_overlap(a: &ipnet::IpNet, b: &ipnet::IpNet) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}
