#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod alias;
pub mod asset_paths;
pub mod config;
pub mod error;
pub mod publish;
pub mod registrar;
pub mod script;
pub mod serializer;

pub use alias::{AliasMap, AliasResolver};
pub use asset_paths::normalize_app_file;
pub use config::{AppConfig, AssetSettings, BootstrapConfig};
pub use error::{BootstrapError, BootstrapResult, ConfigurationError, PublishError};
pub use publish::{AssetManager, DirectoryPublisher};
pub use registrar::BootstrapRegistrar;
pub use script::{ClientScript, ScriptAttributes, ScriptPosition, ScriptRegistry};
