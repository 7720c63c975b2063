//! Application and publishing configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::alias::AliasMap;
use crate::publish::{AssetManager, DEFAULT_EXCLUDE_FILES};

/// Configuration file looked up by [`BootstrapConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "bootstrap.config.json";

/// YAML alternatives tried when the JSON file is absent.
const YAML_CONFIG_FILES: [&str; 2] = ["bootstrap.config.yaml", "bootstrap.config.yml"];

/// Default alias of the directory holding the client application.
pub const DEFAULT_APP_DIRECTORY_ALIAS: &str = "application.scripts.backbone";

/// Default module name under which options are exposed.
pub const DEFAULT_OPTIONS_MODULE_NAME: &str = "options";

/// Default prefix of the registry keys.
pub const DEFAULT_NAMESPACE: &str = "Backbone:App";

/// Everything a page render needs to bootstrap the client application.
///
/// Both naming conventions are accepted when deserializing, e.g. `require` and
/// `loaderConfig`, or `scriptPrefix` and `namespace`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
  /// Bootstrap script name; `MyApp`, `/MyApp` and `MyApp.js` are equivalent.
  #[serde(alias = "appFile")]
  pub app: String,
  /// Options exposed to the client as a named module.
  pub options: Map<String, Value>,
  /// Module loader configuration passed to `require.config()`. Skipped when empty.
  #[serde(rename = "require", alias = "loaderConfig")]
  pub loader_config: Map<String, Value>,
  /// Loader script URL. Defaults to `require.js` inside the published directory.
  #[serde(rename = "requireJsUrl", alias = "loaderUrl")]
  pub loader_url: Option<String>,
  /// Name of the synthetic options module.
  pub options_module_name: String,
  /// Alias of the local directory holding the client application.
  #[serde(rename = "appPath", alias = "appDirectoryAlias")]
  pub app_directory_alias: String,
  /// Prefix for the `{namespace}:options` and `{namespace}:require` registry keys.
  #[serde(alias = "scriptPrefix")]
  pub namespace: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      app: String::new(),
      options: Map::new(),
      loader_config: Map::new(),
      loader_url: None,
      options_module_name: DEFAULT_OPTIONS_MODULE_NAME.into(),
      app_directory_alias: DEFAULT_APP_DIRECTORY_ALIAS.into(),
      namespace: DEFAULT_NAMESPACE.into(),
    }
  }
}

impl AppConfig {
  /// Configuration for the bootstrap file `app` with every other value defaulted.
  pub fn new(app: impl Into<String>) -> Self {
    Self {
      app: app.into(),
      ..Self::default()
    }
  }

  /// Set the bootstrap file name.
  pub fn with_app(mut self, app: impl Into<String>) -> Self {
    self.app = app.into();
    self
  }

  /// Set the options exposed to the client.
  pub fn with_options(mut self, options: Map<String, Value>) -> Self {
    self.options = options;
    self
  }

  /// Set the module loader configuration.
  pub fn with_loader_config(mut self, loader_config: Map<String, Value>) -> Self {
    self.loader_config = loader_config;
    self
  }

  /// Override the loader script URL.
  pub fn with_loader_url(mut self, url: impl Into<String>) -> Self {
    self.loader_url = Some(url.into());
    self
  }

  /// Set the options module name.
  pub fn with_options_module_name(mut self, name: impl Into<String>) -> Self {
    self.options_module_name = name.into();
    self
  }

  /// Set the application directory alias.
  pub fn with_app_directory_alias(mut self, alias: impl Into<String>) -> Self {
    self.app_directory_alias = alias.into();
    self
  }

  /// Set the registry key prefix.
  pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
    self.namespace = namespace.into();
    self
  }

  /// Registry key of the options module script.
  pub fn options_key(&self) -> String {
    format!("{}:options", self.namespace)
  }

  /// Registry key of the loader configuration script.
  pub fn loader_config_key(&self) -> String {
    format!("{}:require", self.namespace)
  }
}

/// Settings for the filesystem publisher.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetSettings {
  /// Web-servable directory published assets are written to.
  pub base_path: String,
  /// Public URL of `base_path`.
  pub base_url: String,
  /// Re-mirror on every publish.
  pub force_copy: bool,
  /// Publish directories as symbolic links.
  pub link_assets: bool,
  /// Fold the newest modification time of the source into its hashed directory name.
  pub hash_by_mtime: bool,
  /// Names skipped while copying.
  pub exclude_files: Vec<String>,
}

impl Default for AssetSettings {
  fn default() -> Self {
    Self {
      base_path: "assets".into(),
      base_url: "/assets".into(),
      force_copy: false,
      link_assets: false,
      hash_by_mtime: false,
      exclude_files: DEFAULT_EXCLUDE_FILES.iter().map(|name| name.to_string()).collect(),
    }
  }
}

/// Configuration file contents: the application config plus publishing and alias settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
  /// Application configuration, read from the top level of the file.
  #[serde(flatten)]
  pub app: AppConfig,
  /// Root aliases mapped to directories.
  pub aliases: BTreeMap<String, String>,
  /// Publisher settings.
  pub assets: AssetSettings,
}

impl BootstrapConfig {
  /// Load the configuration file from `dir`, falling back to defaults when none exists.
  pub fn discover(dir: &Path) -> Result<Self> {
    let candidates = std::iter::once(DEFAULT_CONFIG_FILE).chain(YAML_CONFIG_FILES);
    for name in candidates {
      let path = dir.join(name);
      if path.is_file() {
        return Self::from_path(&path);
      }
    }
    Ok(Self::default())
  }

  /// Read configuration from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
      serde_yaml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    } else {
      serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
  }

  /// Alias table with relative directories resolved against `root`.
  ///
  /// `application` points at `root` unless the file overrides it.
  pub fn alias_map(&self, root: &Path) -> AliasMap {
    let mut aliases = AliasMap::with_application_root(root);
    for (name, dir) in &self.aliases {
      aliases.set_root(name.as_str(), resolve_against(root, dir));
    }
    aliases
  }

  /// Filesystem publisher described by the `assets` section, relative to `root`.
  pub fn asset_manager(&self, root: &Path) -> AssetManager {
    AssetManager::new(
      resolve_against(root, &self.assets.base_path),
      self.assets.base_url.clone(),
    )
    .with_force_copy(self.assets.force_copy)
    .with_link_assets(self.assets.link_assets)
    .with_hash_by_mtime(self.assets.hash_by_mtime)
    .with_exclude_files(self.assets.exclude_files.iter().cloned())
  }
}

fn resolve_against(root: &Path, value: &str) -> PathBuf {
  let path = Path::new(value);
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    root.join(path)
  }
}
