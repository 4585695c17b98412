//! Config Module
//!
//! Centralized configuration for ship assembly and block properties.

pub mod ship_config;

pub use ship_config::{CannonConfig, ConfigError, ShipConfig};
