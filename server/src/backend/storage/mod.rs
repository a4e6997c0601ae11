//! # Storage Module
//!
//! Data persistence for the backend. Templates and the pending template
//! selection live as YAML files in the configured data directory.
//!
//! - **traits**: storage interfaces used by the domain services
//! - **yaml**: file-backed implementation

pub mod traits;
pub mod yaml;

pub use traits::TemplateStorage;
pub use yaml::{TemplateRepository, YamlConnection};
