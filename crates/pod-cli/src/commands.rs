use anyhow::Context;
use colored::Colorize;
use pod_server::{PodServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

/// The configuration file (or defaults) with command-line overrides applied.
pub fn resolve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(root) = &args.root {
        config.root_path = root.clone();
    }
    config.validate()?;
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    println!(
        "{} Serving {} from {} on {}",
        "✓".green().bold(),
        config.base_url.bold(),
        config.root_path.display(),
        config.bind_addr.to_string().cyan()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(PodServer::new(config).serve())?;
    Ok(())
}

fn cmd_check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    match ServerConfig::load(&args.file) {
        Ok(config) => {
            println!("{} {} is valid", "✓".green().bold(), args.file.display());
            println!("  Bind: {}", config.bind_addr.to_string().cyan());
            println!("  Base URL: {}", config.base_url.bold());
            println!("  Root: {}", config.root_path.display());
            println!("  Default RDF type: {}", config.default_rdf_type.yellow());
            Ok(())
        }
        Err(err) => {
            println!("{} {}: {}", "✗".red().bold(), args.file.display(), err);
            Err(err.into())
        }
    }
}
