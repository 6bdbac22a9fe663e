//! Workspace root.
//!
//! This crate has no runtime code of its own — it exists to host the
//! `tests/` directory, which exercises the full pipeline (load → match →
//! compile → intercept) across the workspace's crate boundaries. Each
//! stage's own behavior is covered in depth by its owning crate's tests.

#![deny(unsafe_code)]
