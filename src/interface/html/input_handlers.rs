// src/interface/html/input_handlers.rs

//! HTML input handlers. Form fields arrive as text, so the command line
//! conversions apply unchanged.

pub use crate::interface::cli::input_handlers::{string_list_handler, string_to_bool};
