//! Command-line interface support for the `lloyd` binary.

pub mod commands;
