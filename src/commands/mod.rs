// src/commands/mod.rs

//! Built-in commands shipped with the driver.

pub mod bash_completion;
pub mod serve_html;
