//! Configuration for modman.
//!
//! A single TOML file (`~/.config/modman/modman.toml` by default) names the
//! directories modman works in and the identity whose subscriptions are
//! installed.

pub mod parser;
pub mod schema;
pub mod store;

pub use parser::{parse_modman_toml, parse_modman_toml_str, to_toml};
pub use schema::ModmanConfig;
pub use store::ConfigStore;
