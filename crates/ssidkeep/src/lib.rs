//! ssidkeep CLI internals, shared between the binary and its tests.

pub mod commands;
pub mod config;
pub mod select;
