use clap::Parser;
use fluxfit::{
    cli::{Cli, Commands},
    config,
    handlers::{ApplyOptions, ResolveOptions, handle_apply, handle_resolve},
};
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> fluxfit::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    let project_path = match &cli.command {
        Commands::Resolve { path, .. } | Commands::Apply { path, .. } => path.clone(),
    };
    let config = config::load_config(Some(&project_path), cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve {
            path,
            cluster_folder,
            format,
        } => handle_resolve(
            ResolveOptions {
                path,
                cluster_folder,
                format,
            },
            &config,
        ),
        Commands::Apply {
            path,
            recommendations,
            cluster_folder,
            dry_run,
            format,
        } => handle_apply(
            ApplyOptions {
                path,
                recommendations,
                cluster_folder,
                dry_run,
                format,
            },
            &config,
        ),
    }
}
