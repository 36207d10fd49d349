//! Side-effecting operations for the sync workflow.

pub mod env;
pub mod fs_tree;
pub mod git;
