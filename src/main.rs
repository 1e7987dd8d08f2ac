//! Bootsmith CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use bootsmith::{
    app, builtin_services, scaffold, ConfigLoader, Extension, Kernel, QueueDashboard,
    StorageBrowser, TemplateService,
};

/// Bootsmith CLI.
#[derive(Parser)]
#[command(name = "bootsmith")]
#[command(about = "Opinionated service kernel")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "bootsmith.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot the kernel and serve (default)
    Run {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write the default config file and scaffold the application tree
    Init,

    /// Template management commands
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List embedded templates
    List,

    /// Install a template at its conventional path
    Install {
        /// Template name (see `template list`)
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Init) => init(&cli.config),
        Some(Commands::Template { action }) => template(&cli.config, action),
        Some(Commands::Run { host, port }) => run(&cli.config, host, port).await,
        None => run(&cli.config, None, None).await,
    }
}

async fn run(config_path: &PathBuf, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = ConfigLoader::load_or_init(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let extensions: Vec<Arc<dyn Extension>> = vec![
        Arc::new(QueueDashboard::default()),
        Arc::new(StorageBrowser::default()),
    ];
    let mut kernel = Kernel::new(config.clone())
        .with_builtin_services(builtin_services(&config, app::artifacts()))
        .with_extensions(extensions);

    kernel.boot().await.context("kernel boot failed")?;
    info!("Bootsmith is up; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await.context("signal handler")?;
    info!("Shutting down");
    kernel.shutdown();
    Ok(())
}

fn init(config_path: &PathBuf) -> anyhow::Result<()> {
    ConfigLoader::ensure_default_file(config_path)
        .with_context(|| format!("writing {}", config_path.display()))?;
    let config = ConfigLoader::load(config_path)?;
    let created = scaffold::ensure_layout(&config.app_root())?;
    println!(
        "Initialized {} ({} directories created)",
        config_path.display(),
        created.len()
    );
    Ok(())
}

fn template(config_path: &PathBuf, action: TemplateAction) -> anyhow::Result<()> {
    let config = ConfigLoader::load_or_init(config_path)?;
    let templates = TemplateService::new(config.app_root());
    match action {
        TemplateAction::List => {
            for name in templates.template_names() {
                println!("{name}");
            }
        }
        TemplateAction::Install { name } => {
            let dest = templates.install_template(&name)?;
            println!("Installed {} at {}", name, dest.display());
        }
    }
    Ok(())
}
