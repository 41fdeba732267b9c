// src/config/mod.rs
// Configuration and shared constants

pub mod env;
pub mod file;

pub use env::{ConfigIssue, ConfigValidation, EnvConfig};
pub use file::OfficeConfig;
