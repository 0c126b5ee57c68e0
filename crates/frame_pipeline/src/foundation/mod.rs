//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the pipeline:
//! - Math types and transforms
//! - Frame timing
//! - Logging setup

pub mod math;
pub mod time;
pub mod logging;
