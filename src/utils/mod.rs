//! Utility modules shared across the crate.
pub mod cli;
pub mod md5;
pub mod pagination;
