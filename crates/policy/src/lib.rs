//! IP allow/deny policy model, loader, and hot-reloadable matcher.
//!
//! Match semantics (see [`Matcher::is_allowed`]): the deny set is always
//! consulted first and always wins; only once nothing in the deny set
//! matches is the allow set consulted; only once neither set matches does
//! the mode-dependent default action apply. A non-empty allow set implies a
//! positive-enumeration intent, so it defaults to deny on its own even when
//! the deny set is empty.
//!
//! Hot reload (see [`Matcher::reload`]) publishes a new, already-validated
//! `Policy` behind a single atomic pointer swap — no lock is taken on the
//! request path, and a failed reload leaves the previous policy in force
//! because validation happens before a `Policy` value can exist at all.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod loader;
mod matcher;
mod model;
mod reason;

pub use loader::{default_policy, from_document_str, from_path, load, to_document_string, PolicyError};
pub use matcher::{Matcher, StatsSnapshot};
pub use model::{DefaultAction, Mode, Policy, PolicyInvariantError, MAX_RULES};
pub use reason::Reason;
