//! Command-line entry point: publish the client application and emit its bootstrap scripts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spa_bootstrap::script::inject_scripts_into_file;
use spa_bootstrap::{
  AssetManager, BootstrapConfig, BootstrapRegistrar, ClientScript, ScriptPosition,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Publish a single-page application and register the scripts that bootstrap it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
  /// Config file (default: bootstrap.config.json/.yaml in the current directory)
  #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
  config: Option<PathBuf>,

  /// Override the bootstrap file name from the config
  #[arg(long, global = true)]
  app: Option<String>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Publish the application directory and print its public URL
  Publish,

  /// Print the script tags for a page render
  Render {
    /// Only print scripts registered at this position
    #[arg(short, long)]
    position: Option<ScriptPosition>,
  },

  /// Insert the script tags into an HTML document
  Inject {
    /// HTML file to patch
    #[arg(value_hint = clap::ValueHint::FilePath)]
    html: PathBuf,

    /// Write the result here instead of overwriting the input
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let (config, root) = configure(&cli)?;
  debug!(root = %root.display(), "loaded configuration");

  let aliases = config.alias_map(&root);
  let registrar = BootstrapRegistrar::init(&config.app, &aliases, config.asset_manager(&root))
    .context("failed to publish the application directory")?;

  match cli.command {
    Commands::Publish => {
      println!("{}", registrar.published_url()?);
    }
    Commands::Render { position } => {
      let scripts = render_scripts(&registrar, &config)?;
      let html = match position {
        Some(position) => scripts.render(position),
        None => [
          scripts.render(ScriptPosition::Head),
          scripts.render(ScriptPosition::Begin),
          scripts.render_body_end(),
        ]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n"),
      };
      println!("{html}");
    }
    Commands::Inject { html, output } => {
      let scripts = render_scripts(&registrar, &config)?;
      inject_scripts_into_file(&html, output.as_deref(), &scripts)?;
    }
  }

  Ok(())
}

fn init_tracing(verbose: bool) {
  let default_filter = if verbose {
    "spa_bootstrap=debug"
  } else {
    "spa_bootstrap=info"
  };
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

/// Load the configuration named on the command line and apply the `--app` override.
fn configure(cli: &Cli) -> Result<(BootstrapConfig, PathBuf)> {
  let (mut config, root) = load_config(cli.config.as_deref())?;
  if let Some(app) = &cli.app {
    config.app.app = app.clone();
  }
  Ok((config, root))
}

fn load_config(path: Option<&Path>) -> Result<(BootstrapConfig, PathBuf)> {
  match path {
    Some(path) => {
      let config = BootstrapConfig::from_path(path)?;
      let root = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
      Ok((config, root))
    }
    None => {
      let root = std::env::current_dir().context("failed to determine current directory")?;
      Ok((BootstrapConfig::discover(&root)?, root))
    }
  }
}

fn render_scripts(
  registrar: &BootstrapRegistrar<AssetManager>,
  config: &BootstrapConfig,
) -> Result<ClientScript> {
  let mut scripts = ClientScript::new();
  registrar
    .start(&config.app, &mut scripts)
    .context("failed to register application scripts")?;
  Ok(scripts)
}
