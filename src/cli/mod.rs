//! Command-line front end over snapshot files.

pub mod commands;
