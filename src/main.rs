//! lazit CLI
//!
//! Entry point for the `lazit` command-line tool.

use clap::{Parser, Subcommand};
use lazit::compile::{SassCompiler, DEFAULT_SASS_BIN, SASS_BIN_ENV};
use lazit::config::BundledDefaults;
use lazit::layout::BASE_PATH_ENV;
use lazit::{Pipeline, PipelineConfig, PipelineError, ProjectLayout};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lazit")]
#[command(about = "Generate and compile utility stylesheets from design tokens", version)]
struct Cli {
    /// Package base directory (default: ./node_modules/lazit-css if present, else .)
    #[arg(long, global = true, env = BASE_PATH_ENV)]
    base: Option<PathBuf>,

    /// User configuration file (default: ./lazit.conf.json)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// sass executable
    #[arg(long, global = true, env = SASS_BIN_ENV, default_value = DEFAULT_SASS_BIN)]
    sass_bin: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the stylesheet sources and compile them (default)
    Build,

    /// Generate the stylesheet sources without compiling
    Generate,

    /// Print the effective configuration as JSON
    Config,

    /// Write the default configuration to lazit.conf.json
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: cannot determine working directory: {}", e);
            process::exit(1);
        }
    };
    let layout = ProjectLayout::detect(&cwd, cli.base.as_deref());
    let mut config = PipelineConfig::new(layout);
    config.user_config = cli.config;

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => run_pipeline(config, &cli.sass_bin),
        Commands::Generate => {
            config.generate_only = true;
            run_pipeline(config, &cli.sass_bin);
        }
        Commands::Config => run_config(config, &cli.sass_bin),
        Commands::Init { force } => run_init(config, force),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("LAZIT_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn fail(error: PipelineError) -> ! {
    eprintln!("Error: {}", error);
    process::exit(error.exit_code());
}

fn run_pipeline(config: PipelineConfig, sass_bin: &Path) {
    let compiler = SassCompiler::new(sass_bin);
    let pipeline = Pipeline::new(config, &compiler);

    match pipeline.run() {
        Ok(summary) => {
            println!("{}", summary.human_summary());
        }
        Err(e) => fail(e),
    }
}

fn run_config(config: PipelineConfig, sass_bin: &Path) {
    let compiler = SassCompiler::new(sass_bin);
    let pipeline = Pipeline::new(config, &compiler);

    let effective = match pipeline.resolve() {
        Ok(effective) => effective,
        Err(e) => fail(e),
    };

    match effective.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to serialize configuration: {}", e);
            process::exit(1);
        }
    }

    // Printed even when invalid so the merged tree can be inspected
    if let Err(e) = effective.typed() {
        fail(e.into());
    }
}

fn run_init(config: PipelineConfig, force: bool) {
    let path = config.user_config_path();

    if path.exists() && !force {
        eprintln!(
            "Error: {} already exists (use --force to overwrite)",
            path.display()
        );
        process::exit(1);
    }

    if let Err(e) = lazit::emit::atomic_write(&path, BundledDefaults.as_str().as_bytes()) {
        eprintln!("Error: failed to write {}: {}", path.display(), e);
        process::exit(1);
    }

    println!("Wrote {}", path.display());
}
