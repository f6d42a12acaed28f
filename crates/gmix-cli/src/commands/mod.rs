//! CLI command implementations.

pub mod config;
pub mod fit;
pub mod init;
