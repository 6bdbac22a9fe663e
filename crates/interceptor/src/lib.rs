//! The admission middleware: extracts a connection's source IP, consults
//! the policy matcher, and either denies with a typed error or forwards
//! the request through the rest of the admission chain.
//!
//! The Interceptor sits after any data-plane cross-connect setup and
//! before the mechanism-specific translation, so a denial occurs before
//! any forwarding state is committed downstream. See [`Interceptor`] for
//! the per-request algorithm and [`chain`] for how it composes with
//! whatever mechanism-specific elements come after it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod adapters;
pub mod chain;
pub mod error;
mod interceptor;
pub mod request;

pub use chain::{Chain, ChainElement, Next};
pub use error::AdmissionError;
pub use interceptor::Interceptor;
pub use request::{extract_source_ip, Connection, ConnectionContext, ConnectionRequest, IpContext};
