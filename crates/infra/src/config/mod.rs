//! Configuration sources
//!
//! `MEETBOOK_*` environment variables win over a config file, which wins over
//! built-in defaults. See [`loader::load`].

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
