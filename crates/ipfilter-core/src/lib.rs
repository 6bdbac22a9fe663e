//! Core primitives shared across the IP filter crates: CIDR rule parsing,
//! monotonic timing for decision latency, and the endpoint configuration
//! surface read from the process environment.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cidr;
pub mod config;
pub mod time;

pub use cidr::CidrRule;
pub use config::EndpointConfig;
