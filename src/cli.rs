use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fluxfit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Right-size Kubernetes workloads declared in a Flux GitOps repository")]
#[command(long_about = "Resolves a Flux cluster repository (Kustomizations, Flux Kustomizations, HelmReleases and their sources) into a flat manifest inventory, then applies optimizer CPU/memory recommendations to the Deployments that declare them, rewriting only the files that change.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a cluster repository and list every manifest it declares
    Resolve {
        /// Path to the working tree
        #[arg(value_name = "ROOT")]
        path: PathBuf,

        /// Cluster folder relative to ROOT (searched for gotk-sync.yaml if omitted)
        #[arg(long, value_name = "DIR")]
        cluster_folder: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Apply optimizer recommendations to the repository's Deployments
    Apply {
        /// Path to the working tree
        #[arg(value_name = "ROOT")]
        path: PathBuf,

        /// Optimizer JSON output
        #[arg(short, long, value_name = "FILE")]
        recommendations: PathBuf,

        /// Cluster folder relative to ROOT (searched for gotk-sync.yaml if omitted)
        #[arg(long, value_name = "DIR")]
        cluster_folder: Option<PathBuf>,

        /// Report the files that would change without writing them
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
