//! Type definitions for armctl configuration

mod runtime_config;

pub use runtime_config::*;
