//! Registers the scripts that bootstrap the client application on a page.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::alias::AliasResolver;
use crate::asset_paths::{join_url, normalize_app_file};
use crate::config::AppConfig;
use crate::error::{BootstrapResult, ConfigurationError};
use crate::publish::DirectoryPublisher;
use crate::script::{ScriptAttributes, ScriptPosition, ScriptRegistry};
use crate::serializer::encode_config;

/// Attribute the module loader reads to find the application entry point.
pub const BOOTSTRAP_ATTRIBUTE: &str = "data-main";

/// Loader file name assumed inside the published directory when no URL is configured.
pub const DEFAULT_LOADER_FILE: &str = "require.js";

/// Publishes the application directory and registers its bootstrap scripts.
///
/// `init` publishes once; `start` may then be called for every page render with that
/// render's [`AppConfig`].
pub struct BootstrapRegistrar<P> {
  publisher: P,
  app_directory: PathBuf,
  app_directory_alias: String,
}

struct AppReference {
  loader_url: String,
  attributes: ScriptAttributes,
}

impl<P: DirectoryPublisher> BootstrapRegistrar<P> {
  /// Create a registrar for an already resolved application directory without publishing it.
  pub fn new(publisher: P, app_directory: impl Into<PathBuf>) -> Self {
    let app_directory = app_directory.into();
    Self {
      app_directory_alias: app_directory.display().to_string(),
      publisher,
      app_directory,
    }
  }

  /// Resolve `config.app_directory_alias` and publish the directory it names.
  pub fn init<A>(config: &AppConfig, aliases: &A, publisher: P) -> BootstrapResult<Self>
  where
    A: AliasResolver + ?Sized,
  {
    let app_directory = aliases.resolve(&config.app_directory_alias).ok_or_else(|| {
      ConfigurationError::UnknownAlias {
        alias: config.app_directory_alias.clone(),
      }
    })?;

    let registrar = Self {
      publisher,
      app_directory,
      app_directory_alias: config.app_directory_alias.clone(),
    };
    registrar.publish_app_directory()?;
    Ok(registrar)
  }

  /// Local directory holding the client application.
  pub fn app_directory(&self) -> &Path {
    &self.app_directory
  }

  /// Publisher used for the application directory.
  pub fn publisher(&self) -> &P {
    &self.publisher
  }

  /// Publish every file in the application directory, returning its public URL.
  pub fn publish_app_directory(&self) -> BootstrapResult<String> {
    Ok(self.publisher.publish(&self.app_directory)?)
  }

  /// Public URL of the published application directory.
  pub fn published_url(&self) -> BootstrapResult<String> {
    self.publisher.published_url(&self.app_directory).ok_or_else(|| {
      ConfigurationError::Unpublished {
        path: self.app_directory.clone(),
      }
      .into()
    })
  }

  /// Register the loader configuration, the options module and the bootstrap reference.
  ///
  /// Every value is encoded before the first registration, so a failure leaves `registry`
  /// untouched. Both inline keys are dropped and registered again in order, so the loader
  /// configuration precedes the options module even when an earlier call in the same render
  /// had none. Calling this again with the same configuration produces the same keys and
  /// content.
  pub fn start<R>(&self, config: &AppConfig, registry: &mut R) -> BootstrapResult<()>
  where
    R: ScriptRegistry + ?Sized,
  {
    self.require_app_file(&config.app)?;

    let loader_script = if config.loader_config.is_empty() {
      None
    } else {
      let encoded = encode_config("module loader configuration", &config.loader_config)?;
      Some(format!("require.config({encoded});"))
    };

    let options = encode_config("options", &config.options)?;
    let module_name = encode_config("options module name", &config.options_module_name)?;
    let options_script = format!("define({module_name},[],function(){{return {options};}});");

    let reference = self.app_reference(config, &config.app)?;

    let loader_key = config.loader_config_key();
    let options_key = config.options_key();
    registry.remove_inline(&loader_key);
    registry.remove_inline(&options_key);

    if let Some(code) = loader_script {
      registry.register_inline(&loader_key, &code, ScriptPosition::Head);
    }
    registry.register_inline(&options_key, &options_script, ScriptPosition::Head);
    registry.register_file(&reference.loader_url, ScriptPosition::Head, &reference.attributes);

    info!(
      app = %config.app,
      loader = %reference.loader_url,
      "registered client application"
    );
    Ok(())
  }

  /// Register only the loader script reference whose bootstrap attribute points at `main`.
  pub fn register_app<R>(&self, config: &AppConfig, main: &str, registry: &mut R) -> BootstrapResult<()>
  where
    R: ScriptRegistry + ?Sized,
  {
    self.require_app_file(main)?;
    let reference = self.app_reference(config, main)?;
    registry.register_file(&reference.loader_url, ScriptPosition::Head, &reference.attributes);
    Ok(())
  }

  fn require_app_file(&self, app: &str) -> Result<(), ConfigurationError> {
    if app.trim().is_empty() {
      return Err(ConfigurationError::MissingAppFile {
        app_directory_alias: self.app_directory_alias.clone(),
      });
    }
    Ok(())
  }

  fn app_reference(&self, config: &AppConfig, main: &str) -> BootstrapResult<AppReference> {
    let base_url = self.published_url()?;
    let base_url = base_url.trim_end_matches('/');

    let loader_url = match config.loader_url.as_deref().map(str::trim) {
      Some(url) if !url.is_empty() => url.to_string(),
      _ => join_url(base_url, DEFAULT_LOADER_FILE),
    };

    let data_main = format!("{base_url}{}", normalize_app_file(main.trim()));
    debug!(%data_main, "resolved bootstrap file");

    let mut attributes = ScriptAttributes::new();
    attributes.insert(BOOTSTRAP_ATTRIBUTE.to_string(), data_main);
    Ok(AppReference {
      loader_url,
      attributes,
    })
  }
}
