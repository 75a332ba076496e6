//! Shared foundation types used across every JN crate: configuration
//! values, the `${NAME}` environment-expansion rule, NDJSON record
//! conventions, plugin metadata, and on-disk profile descriptors.

pub mod config;
pub mod env;
pub mod error;
pub mod ndjson;
pub mod plugin_meta;
pub mod profile;
pub mod value;

pub use config::Config;
pub use error::{CoreError, ErrorKind};
pub use plugin_meta::{Mode, PluginMeta, Role};
pub use profile::{ComponentDescriptor, ProfileDescriptor, ProfileError, ProfileMeta, Scope};
pub use value::ConfigValue;
