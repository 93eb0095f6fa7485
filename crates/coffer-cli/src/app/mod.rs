//! Application-level utilities for the Coffer CLI.
//!
//! This module provides:
//! - The per-invocation context (flags plus lazily loaded config)
//! - Path resolution for config files and typed paths
//! - Password prompts

mod context;
mod password;
mod resolver;

pub use context::AppContext;
pub use password::{read_new_password, read_password};
pub use resolver::{resolve_config_path, resolve_user_path};
