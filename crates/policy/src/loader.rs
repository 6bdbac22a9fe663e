//! Builds a validated [`Policy`] from the configured sources, in priority
//! order, collecting every validation failure before reporting (never
//! fail-fast on the first bad entry).

use crate::model::{DefaultAction, Mode, Policy, PolicyInvariantError};
use ipfilter_core::{CidrRule, EndpointConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The text-form policy document schema (inline or file).
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyDocument {
    #[serde(default, rename = "allowList")]
    allow_list: Vec<String>,
    #[serde(default, rename = "denyList")]
    deny_list: Vec<String>,
    #[serde(rename = "defaultAction", default)]
    default_action: Option<DefaultAction>,
    #[serde(default)]
    mode: Option<Mode>,
}

impl From<&Policy> for PolicyDocument {
    fn from(policy: &Policy) -> Self {
        Self {
            allow_list: policy.allow().iter().map(|r| r.prefix.to_string()).collect(),
            deny_list: policy.deny().iter().map(|r| r.prefix.to_string()).collect(),
            default_action: Some(policy.default_action()),
            mode: Some(policy.mode()),
        }
    }
}

/// Everything that can go wrong building a `Policy` from an external source.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Failed to read a policy file from disk.
    #[error("failed to read policy file {path}: {source}")]
    Io {
        /// The path that could not be read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document was not valid YAML, or violated the schema
    /// (`#[serde(deny_unknown_fields)]` rejects unrecognized keys).
    #[error("malformed policy document: {0}")]
    Malformed(#[from] serde_yaml::Error),
    /// One or more entries or fields failed validation. Aggregated, not
    /// fail-fast: every bad entry is reported in one error.
    #[error("policy validation failed with {} error(s): {}", .errors.len(), .errors.join("; "))]
    Validation {
        /// Total bad entries/fields found.
        count: usize,
        /// One message per bad entry or field, of the form
        /// `<listName>[<index>]: invalid IP '<value>' - <cause>`.
        errors: Vec<String>,
    },
}

impl From<PolicyInvariantError> for PolicyError {
    fn from(e: PolicyInvariantError) -> Self {
        Self::Validation { count: e.errors.len(), errors: e.errors }
    }
}

/// Load the policy from whichever source is configured, in priority order:
/// inline document, then file path, then the legacy `IPFILTER_*` surface,
/// then the compiled-in empty/deny-all default.
pub fn load(cfg: &EndpointConfig) -> Result<Policy, PolicyError> {
    if let Some(inline) = &cfg.ip_policy_inline {
        return from_document_str(inline);
    }
    if let Some(path) = &cfg.ip_policy_config_path {
        return from_path(path);
    }
    if cfg.legacy_mode.is_some()
        || cfg.legacy_whitelist.is_some()
        || cfg.legacy_blacklist.is_some()
    {
        return from_legacy_env(cfg);
    }
    Ok(default_policy())
}

/// The compiled-in default: empty allow/deny, `WhitelistOnly` — which
/// denies everything under the standard match algorithm.
#[must_use]
pub fn default_policy() -> Policy {
    Policy::new(Some(Mode::WhitelistOnly), None, Vec::new(), Vec::new())
        .expect("the compiled-in default policy is always valid")
}

/// Parse and validate a policy document's text content directly (used by
/// both the inline-env source and by tests).
pub fn from_document_str(text: &str) -> Result<Policy, PolicyError> {
    let doc: PolicyDocument = serde_yaml::from_str(text)?;
    build_policy(doc)
}

/// Parse and validate a policy document from a file on disk.
pub fn from_path(path: impl AsRef<Path>) -> Result<Policy, PolicyError> {
    let path_ref = path.as_ref();
    let text = fs::read_to_string(path_ref)
        .map_err(|source| PolicyError::Io { path: path_ref.display().to_string(), source })?;
    from_document_str(&text)
}

/// Render a `Policy` back into the same YAML document schema
/// [`from_document_str`] parses, so that `from_document_str(&to_document_string(p)?)`
/// round-trips to an equivalent policy. Per-rule descriptions are not part
/// of the document schema and are not carried through.
pub fn to_document_string(policy: &Policy) -> Result<String, PolicyError> {
    let doc = PolicyDocument::from(policy);
    Ok(serde_yaml::to_string(&doc)?)
}

fn build_policy(doc: PolicyDocument) -> Result<Policy, PolicyError> {
    let mut errors = Vec::new();
    let allow = parse_rule_list("allowList", &doc.allow_list, &mut errors);
    let deny = parse_rule_list("denyList", &doc.deny_list, &mut errors);

    if !errors.is_empty() {
        return Err(PolicyError::Validation { count: errors.len(), errors });
    }

    Ok(Policy::new(doc.mode, doc.default_action, allow, deny)?)
}

fn parse_rule_list(list_name: &str, entries: &[String], errors: &mut Vec<String>) -> Vec<CidrRule> {
    let mut rules = Vec::with_capacity(entries.len());
    for (idx, raw) in entries.iter().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        match CidrRule::parse(trimmed) {
            Ok(rule) => rules.push(rule),
            Err(e) => errors.push(format!("{list_name}[{idx}]: invalid IP '{}' - {}", e.value, e.cause)),
        }
    }
    rules
}

/// Load from the legacy `IPFILTER_MODE` / `IPFILTER_WHITELIST` /
/// `IPFILTER_BLACKLIST` surface. Each list value is either a
/// comma-separated literal or, when it begins with `/` or `./`, a path to a
/// file holding the same kind of list (one entry per line).
fn from_legacy_env(cfg: &EndpointConfig) -> Result<Policy, PolicyError> {
    let mut errors = Vec::new();

    let mode = match cfg.legacy_mode.as_deref() {
        Some("whitelist") => Some(Mode::WhitelistOnly),
        Some("blacklist") => Some(Mode::BlacklistOnly),
        Some("both") => Some(Mode::Both),
        Some(other) => {
            errors.push(format!("IPFILTER_MODE: unrecognized mode '{other}'"));
            None
        }
        None => None,
    };

    let allow = resolve_legacy_list("IPFILTER_WHITELIST", cfg.legacy_whitelist.as_deref(), &mut errors)?;
    let deny = resolve_legacy_list("IPFILTER_BLACKLIST", cfg.legacy_blacklist.as_deref(), &mut errors)?;

    let allow_rules = parse_rule_list("IPFILTER_WHITELIST", &allow, &mut errors);
    let deny_rules = parse_rule_list("IPFILTER_BLACKLIST", &deny, &mut errors);

    if !errors.is_empty() {
        return Err(PolicyError::Validation { count: errors.len(), errors });
    }

    Ok(Policy::new(mode, None, allow_rules, deny_rules)?)
}

fn resolve_legacy_list(
    var_name: &str,
    value: Option<&str>,
    errors: &mut Vec<String>,
) -> Result<Vec<String>, PolicyError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    if value.starts_with('/') || value.starts_with("./") {
        match fs::read_to_string(value) {
            Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
            Err(source) => {
                errors.push(format!("{var_name}: failed to read list file '{value}': {source}"));
                Ok(Vec::new())
            }
        }
    } else {
        Ok(value.split(',').map(str::to_string).collect())
    }
}
