//! Workspace root package.
//!
//! Exists only to attach repository-wide tooling (git hooks via cargo-husky).
//! All functionality lives in the `crates/` members.
