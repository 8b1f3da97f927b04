//! CLI entry point for the `lloyd` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use lloyd_kmeans::cli::commands;
use lloyd_kmeans::types::{
    load_config, resolve_config_path, ClusterConfig, EmptyClusterPolicy, InitStrategy,
    ResetPolicy,
};
use lloyd_kmeans::KmError;

#[derive(Parser)]
#[command(name = "lloyd", about = "Parallel k-means clustering of 2-D points")]
struct Cli {
    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster the points in a file
    Run {
        /// Path to the x,y point file
        file: PathBuf,
        /// TOML config file (defaults to $LLOYD_CONFIG, then ./lloyd.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of clusters
        #[arg(long, short = 'k')]
        clusters: Option<usize>,
        /// Number of rounds
        #[arg(long, short = 'n')]
        iterations: Option<usize>,
        /// Seed for initial centroid sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Initializer: random, evenly-spaced
        #[arg(long)]
        init: Option<String>,
        /// Empty-cluster policy: retain, resample
        #[arg(long)]
        empty_cluster: Option<String>,
        /// Reset policy: until-final-round, until-cluster-count
        #[arg(long)]
        reset: Option<String>,
        /// Worker threads (default: all cores)
        #[arg(long)]
        threads: Option<usize>,
        /// Print this many labelled points after the run
        #[arg(long, default_value = "0")]
        sample: usize,
    },
    /// Display information about a point file
    Inspect {
        /// Path to the x,y point file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.format == "json";

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let result = match cli.command {
        Commands::Run {
            file,
            config,
            clusters,
            iterations,
            seed,
            init,
            empty_cluster,
            reset,
            threads,
            sample,
        } => {
            let mut cfg = match resolve_config_path(config.as_deref()) {
                Some(path) => match load_config(&path) {
                    Ok(cfg) => cfg,
                    Err(e) => exit_with(&e),
                },
                None => ClusterConfig::default(),
            };
            if let Some(k) = clusters {
                cfg.clusters = k;
            }
            if let Some(n) = iterations {
                cfg.iterations = n;
            }
            if seed.is_some() {
                cfg.seed = seed;
            }
            if let Some(name) = init {
                cfg.init = parse_or_exit(&name, "initializer", InitStrategy::from_name);
            }
            if let Some(name) = empty_cluster {
                cfg.empty_cluster =
                    parse_or_exit(&name, "empty-cluster policy", EmptyClusterPolicy::from_name);
            }
            if let Some(name) = reset {
                cfg.reset = parse_or_exit(&name, "reset policy", ResetPolicy::from_name);
            }
            if threads.is_some() {
                cfg.threads = threads;
            }
            commands::cmd_run(&file, cfg, json, sample)
        }
        Commands::Inspect { file } => commands::cmd_inspect(&file, json),
    };

    if let Err(e) = result {
        exit_with(&e);
    }
}

fn parse_or_exit<T>(name: &str, what: &str, parse: impl Fn(&str) -> Option<T>) -> T {
    match parse(name) {
        Some(value) => value,
        None => {
            eprintln!("Invalid {}: {}", what, name);
            process::exit(3);
        }
    }
}

fn exit_with(e: &KmError) -> ! {
    eprintln!("Error: {}", e);
    let code = match e {
        KmError::Io(_) => 1,
        KmError::MalformedInput { .. } => 2,
        KmError::InvalidConfig(_) | KmError::ConfigParse(_) => 3,
        KmError::TooFewPoints { .. }
        | KmError::NonFinitePoint(_)
        | KmError::CoordinateOutOfRange(_) => 4,
        _ => 5,
    };
    process::exit(code);
}
