// src/validation/mod.rs

pub mod command;

pub use command::validate_command;
