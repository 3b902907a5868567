//! Shared utilities for tradex
//!
//! This crate provides common functionality used across the tradex workspace:
//! tracing setup and typed access to environment overrides.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_flag, env_parse, env_var};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
