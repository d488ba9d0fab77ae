//! Photo booth strips: capture a few filtered camera frames and compose them
//! into a single bordered, captioned PNG.

pub mod backend;
pub mod config;
