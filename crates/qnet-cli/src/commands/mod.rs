//! CLI command implementations.

pub mod common;
pub mod demo;
pub mod qkd;
pub mod serve;
pub mod version;
