// src/core/mod.rs

pub mod command;
pub mod config_loader;
pub mod error;
pub mod parameters;
pub mod paths;
