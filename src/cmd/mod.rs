mod generate;
mod generators;
mod schema;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relgen")]
#[command(version)]
#[command(
    about = "Generate large, referentially consistent relational datasets as CSV files",
    long_about = None
)]
pub struct Cli {
    /// Verbose diagnostics on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that writes tables
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output directory for the CSV files
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Multiply every table's row count (e.g. 0.01 for a 1% dataset)
    #[arg(short, long)]
    pub scale: Option<f64>,

    /// Only write specific tables (comma-separated); dependencies are still generated
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Rows formatted per write batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Compress output files with gzip (<name>.csv.gz)
    #[arg(long)]
    pub gzip: bool,

    /// Show effective row counts without generating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Show progress while writing
    #[arg(short, long)]
    pub progress: bool,

    /// Print run statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the tables described by a YAML schema file
    Generate {
        /// YAML schema file
        schema: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate the built-in companies/people/products/orders dataset
    Demo {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the available value generators
    Generators,

    /// Print the JSON Schema of the YAML file or of the --json output
    Schema {
        /// Schema name (config or stats); prints all when omitted
        name: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Install the stderr tracing subscriber
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "relgen=debug" } else { "relgen=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate { schema, output } => generate::run_schema(schema, output),
        Commands::Demo { output } => generate::run_demo(output),
        Commands::Generators => {
            generators::run();
            Ok(())
        }
        Commands::Schema { name } => schema::run(name),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "relgen", &mut io::stdout());
            Ok(())
        }
    }
}
