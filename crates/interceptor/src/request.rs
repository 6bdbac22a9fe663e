//! The control-plane request shape this endpoint admits, and source-IP
//! extraction from it.

use crate::error::AdmissionError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The IP-context block of a connection's context: an ordered list of
/// source IP strings, each optionally CIDR-suffixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpContext {
    /// Source IP addresses, as the mesh connection descriptor encodes them.
    #[serde(default)]
    pub src_ip_addrs: Vec<String>,
}

/// A connection's nested context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionContext {
    /// The IP-context block, if present.
    #[serde(default)]
    pub ip_context: Option<IpContext>,
}

/// The connection object carried by an admission request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connection {
    /// Connection identifier.
    #[serde(default)]
    pub id: String,
    /// The connection's context, if present.
    #[serde(default)]
    pub context: Option<ConnectionContext>,
}

/// A request to admit (or re-admit) a connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionRequest {
    /// The connection being requested, if present.
    #[serde(default)]
    pub connection: Option<Connection>,
}

/// Extract the source IP from a connection request, per the fixed
/// extraction order: connection, then context, then IP context, then the
/// first source address, with the CIDR suffix (if any) stripped to obtain
/// the host IP.
pub fn extract_source_ip(req: &ConnectionRequest) -> Result<IpAddr, AdmissionError> {
    let connection = req
        .connection
        .as_ref()
        .ok_or_else(|| AdmissionError::InvalidArgument("missing connection".to_string()))?;
    let context = connection
        .context
        .as_ref()
        .ok_or_else(|| AdmissionError::InvalidArgument("missing context".to_string()))?;
    let ip_context = context
        .ip_context
        .as_ref()
        .ok_or_else(|| AdmissionError::InvalidArgument("missing IP context".to_string()))?;
    let first = ip_context
        .src_ip_addrs
        .first()
        .ok_or_else(|| AdmissionError::InvalidArgument("missing source IP".to_string()))?;
    let host = first.split('/').next().unwrap_or(first);
    host.parse::<IpAddr>()
        .map_err(|_| AdmissionError::InvalidArgument("invalid source IP".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(addrs: Vec<&str>) -> ConnectionRequest {
        ConnectionRequest {
            connection: Some(Connection {
                id: "c1".into(),
                context: Some(ConnectionContext {
                    ip_context: Some(IpContext {
                        src_ip_addrs: addrs.into_iter().map(str::to_string).collect(),
                    }),
                }),
            }),
        }
    }

    #[test]
    fn extracts_bare_ip() {
        let ip = extract_source_ip(&request_with(vec!["10.0.0.5"])).unwrap();
        assert_eq!(ip, "10.0.0.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn strips_cidr_suffix() {
        let ip = extract_source_ip(&request_with(vec!["10.0.0.5/32"])).unwrap();
        assert_eq!(ip, "10.0.0.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn missing_connection_is_invalid_argument() {
        let req = ConnectionRequest { connection: None };
        let err = extract_source_ip(&req).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidArgument(m) if m == "missing connection"));
    }

    #[test]
    fn missing_context_is_invalid_argument() {
        let req = ConnectionRequest {
            connection: Some(Connection { id: "c".into(), context: None }),
        };
        let err = extract_source_ip(&req).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidArgument(m) if m == "missing context"));
    }

    #[test]
    fn missing_ip_context_is_invalid_argument() {
        let req = ConnectionRequest {
            connection: Some(Connection {
                id: "c".into(),
                context: Some(ConnectionContext { ip_context: None }),
            }),
        };
        let err = extract_source_ip(&req).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidArgument(m) if m == "missing IP context"));
    }

    #[test]
    fn empty_src_ip_addrs_is_invalid_argument() {
        let err = extract_source_ip(&request_with(vec![])).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidArgument(m) if m == "missing source IP"));
    }

    #[test]
    fn unparseable_ip_is_invalid_argument() {
        let err = extract_source_ip(&request_with(vec!["not-an-ip"])).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidArgument(m) if m == "invalid source IP"));
    }
}
