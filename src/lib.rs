// src/lib.rs
// office-mcp - session and dispatch layer for office document automation

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod address;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod session;
pub mod state;
pub mod tools;
pub use error::{OfficeError, Result};
