//! CIDR rule parsing and normalization.
//!
//! A bare IP address (no `/prefix`) is normalized to a host route: `/32` for
//! IPv4, `/128` for IPv6. IPv4-mapped IPv6 addresses are deliberately **not**
//! unwrapped to IPv4 — they are matched against IPv6 rules as-is.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A single CIDR rule: a network prefix plus an optional free-form
/// description used only for logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidrRule {
    /// The network prefix this rule matches.
    pub prefix: IpNet,
    /// Optional human-readable description, informational only.
    #[serde(default)]
    pub description: Option<String>,
}

/// A CIDR rule string failed to parse.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid IP '{value}' - {cause}")]
pub struct CidrParseError {
    /// The offending input string.
    pub value: String,
    /// Human-readable parse failure cause.
    pub cause: String,
}

impl CidrRule {
    /// Parse a rule entry, which is either a CIDR (`10.0.0.0/8`) or a bare IP
    /// (`10.0.0.1`, normalized to `/32` or `/128`).
    pub fn parse(raw: &str) -> Result<Self, CidrParseError> {
        let trimmed = raw.trim();
        if let Ok(net) = IpNet::from_str(trimmed) {
            return Ok(Self { prefix: net, description: None });
        }
        match IpAddr::from_str(trimmed) {
            Ok(ip) => {
                let net = IpNet::new(ip, host_bits(ip)).expect("host prefix length is always valid");
                Ok(Self { prefix: net, description: None })
            }
            Err(e) => Err(CidrParseError { value: trimmed.to_string(), cause: e.to_string() }),
        }
    }

    /// Parse a rule entry, attaching a description for log output.
    pub fn parse_with_description(
        raw: &str,
        description: impl Into<String>,
    ) -> Result<Self, CidrParseError> {
        let mut rule = Self::parse(raw)?;
        rule.description = Some(description.into());
        Ok(rule)
    }

    /// Returns whether this rule's prefix contains the given address.
    /// IPv4-mapped IPv6 addresses are matched as IPv6, with no family
    /// conversion.
    #[must_use]
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.prefix.contains(&ip)
    }
}

fn host_bits(ip: IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl fmt::Display for CidrRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) if !desc.is_empty() => write!(f, "{} ({desc})", self.prefix),
            _ => write!(f, "{}", self.prefix),
        }
    }
}
