// src/lib.rs

//! Define a command once as a typed parameter schema plus a `run` function,
//! then expose it through command line flags, HTML forms and bash completion.

pub mod cli;
pub mod commands;
pub mod constants;
pub mod core;
pub mod interface;
pub mod models;
pub mod system;
