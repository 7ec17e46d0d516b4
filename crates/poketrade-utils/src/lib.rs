//! Shared utilities for poketrade
//!
//! This crate provides common functionality used across the poketrade workspace,
//! including logging setup and environment-backed configuration helpers.

pub mod config;
pub mod logging;

pub use config::{env_flag, env_var, mask_secret};
pub use logging::{init_tracing, init_tracing_with};
