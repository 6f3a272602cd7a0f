//! Configuration validation commands.

pub mod config;
