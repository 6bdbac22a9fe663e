//! The `Reason` a match decision was made.
//!
//! The `Display` prefix of each variant is part of the observable contract:
//! downstream log consumers and the `PermissionDenied` error message match
//! on these exact prefixes. The suffix (a rule's description) is
//! informational only and may change.

use serde::Serialize;
use std::fmt;

/// Why a connection was admitted or denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Reason {
    /// Denied: matched a deny-set rule. Deny always wins.
    BlacklistRule {
        /// The matched rule, rendered for logs.
        rule: String,
    },
    /// Admitted: matched an allow-set rule.
    WhitelistRule {
        /// The matched rule, rendered for logs.
        rule: String,
    },
    /// Denied: the allow set is non-empty but the address matched none of it.
    NotInWhitelist,
    /// Denied: the allow set is empty and the mode defaults to deny.
    EmptyWhitelist,
    /// Admitted: the deny set did not match and the mode defaults to allow.
    NotInBlacklist,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlacklistRule { rule } => write!(f, "blacklist rule: {rule}"),
            Self::WhitelistRule { rule } => write!(f, "whitelist rule: {rule}"),
            Self::NotInWhitelist => write!(f, "not in whitelist"),
            Self::EmptyWhitelist => write!(f, "empty whitelist (default deny)"),
            Self::NotInBlacklist => write!(f, "not in blacklist (default allow)"),
        }
    }
}
