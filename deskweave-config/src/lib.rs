//! Configuration system for deskweave.
//!
//! This crate provides configuration loading, saving, and default values for
//! containers and their backends:
//!
//! - [`Config`]: the on-disk YAML configuration
//! - [`Glue42Features`]: which Glue42 APIs to initialize on connect
//! - Path helpers for the config file and the layout store

mod config;
mod persistence;

pub use config::{Config, Glue42Features};
pub use persistence::{config_dir, config_path, default_layouts_path};
