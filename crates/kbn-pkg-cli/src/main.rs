mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{
    EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_REPO_ERROR, MANIFEST_ERROR_PREFIX, REPO_ERROR_PREFIX,
};
use kbn_manifest::{PackageType, RepoContext};
use std::path::PathBuf;
use std::process::ExitCode;

pub(crate) const BIN_NAME: &str = "kbn-pkg";

#[derive(Debug, Parser)]
#[command(
    name = "kbn-pkg",
    version,
    about = "Validate and inspect Kibana package manifests"
)]
struct Cli {
    /// Repository root that relative paths and discovery start from.
    #[arg(long, default_value = ".", global = true)]
    repo_root: PathBuf,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate one or more kibana.jsonc files (or package directories).
    Validate {
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// List every package in the repository.
    List {
        /// Only show packages of this type.
        #[arg(long = "type", value_parser = commands::parse_package_type)]
        package_type: Option<PackageType>,
        /// Only show plugin packages.
        #[arg(long, default_value_t = false)]
        plugins: bool,
    },
    /// Show one package by package id or plugin id.
    Inspect { id: String },
    /// Check the whole repository: manifests, id uniqueness, plugin graph.
    Check,
    /// List the transitive plugin dependencies of a plugin.
    Deps { plugin_id: String },
    /// List the role names defined in a role-resource .yml file.
    Roles { file: PathBuf },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("KBN_PKG_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let ctx = || RepoContext::discover(&cli.repo_root);

    let result = match &cli.command {
        Commands::Validate { manifests } => commands::validate::run(&ctx(), manifests, json_output),
        Commands::List {
            package_type,
            plugins,
        } => commands::list::run(&ctx(), *package_type, *plugins, json_output),
        Commands::Inspect { id } => commands::inspect::run(&ctx(), id, json_output),
        Commands::Check => commands::check::run(&ctx(), json_output),
        Commands::Deps { plugin_id } => commands::deps::run(&ctx(), plugin_id, json_output),
        Commands::Roles { file } => commands::roles::run(&ctx(), file, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(*shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with(MANIFEST_ERROR_PREFIX) {
                EXIT_MANIFEST_ERROR
            } else if msg.starts_with(REPO_ERROR_PREFIX) {
                EXIT_REPO_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
