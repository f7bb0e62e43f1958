// src/lib.rs

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod memory;
pub mod model;
pub mod pacing;
pub mod protocol;
pub mod render;
pub mod validation;
