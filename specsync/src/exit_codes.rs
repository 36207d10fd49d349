//! Stable exit codes for specsync CLI commands.

/// Workflow completed, or the preflight guards passed.
pub const OK: i32 = 0;
/// Invalid configuration or a failed external command.
pub const INVALID: i32 = 1;
/// A precondition failed: missing source directory or dirty checkout.
pub const PRECONDITION: i32 = 2;
/// The copy produced no diff; there was nothing to commit.
pub const NO_CHANGES: i32 = 3;
