// src/system/mod.rs

pub mod server;
