//! Configuration management for dclean.
//!
//! Scan, classification and deletion preferences ([`settings::Config`]) are
//! stored as a TOML file and loaded at startup.

pub mod settings;
