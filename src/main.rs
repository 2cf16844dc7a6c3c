//! assetpack CLI - build and inspect unitypackage archives

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use assetpack::ops::{build, list, plan, ListEntry};
use assetpack::Config;

#[derive(Parser)]
#[command(name = "assetpack")]
#[command(about = "reproducible unitypackage builder")]
#[command(version)]
struct Cli {
    /// more log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// pack the asset root into a unitypackage
    Build {
        /// package file to create
        output: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// show what would be packed, without writing anything
    Plan {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// list the entries of an existing package
    List {
        /// package file to read
        package: PathBuf,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// config file (toml)
    #[arg(short, long, env = "ASSETPACK_CONFIG")]
    config: Option<PathBuf>,

    /// asset root directory (overrides the config file)
    #[arg(short, long, required_unless_present = "config")]
    root: Option<PathBuf>,

    /// mount prefix inside the consumer project, e.g. Assets/MyTool/Editor
    #[arg(short, long, required_unless_present = "config")]
    prefix: Option<String>,

    /// gzip level 0-9 (overrides the config file)
    #[arg(short, long)]
    level: Option<u32>,
}

impl SourceArgs {
    /// resolve the config once: file first, then command line overrides
    fn resolve(self) -> assetpack::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(
                self.root.clone().unwrap_or_default(),
                self.prefix.clone().unwrap_or_default(),
            ),
        };
        if let Some(root) = self.root {
            config.asset_root = root;
        }
        if let Some(prefix) = self.prefix {
            config.mount_prefix = prefix;
        }
        if let Some(level) = self.level {
            config.compression_level = level;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> assetpack::Result<()> {
    match command {
        Commands::Build { output, source } => {
            let config = source.resolve()?;
            let report = build(&config, &output)?;
            println!("created {} ({} entries)", output.display(), report.entries);
        }

        Commands::Plan { source } => {
            let config = source.resolve()?;
            let plan = plan(&config)?;

            for entry in &plan.entries {
                println!("{}", ListEntry::from(entry));
            }
            if !plan.skipped.is_empty() {
                println!("\nskipped (no .meta): {}", plan.skipped.len());
                for path in &plan.skipped {
                    println!("  {}", path.display());
                }
            }
        }

        Commands::List { package } => {
            for entry in list(&package)? {
                println!("{}", entry);
            }
        }
    }

    Ok(())
}
