//! speechwire command-line tool
//!
//! Offline front end for the codec and Ogg crates: encodes PCM files into the
//! length-prefixed frame streams speech services accept, decodes them back,
//! and writes Ogg Opus files for upload.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::{Cli, Commands};
pub use commands::Summary;
pub use config::Config;
