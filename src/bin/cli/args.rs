//! CLI Argument Structures

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use envinline::AbsentVariables;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Inline build-time environment variables into serverless function sources
#[derive(Parser)]
#[command(name = "envinline")]
#[command(version = VERSION)]
#[command(about = "Inline build-time environment variables into function sources")]
#[command(long_about = "
Rewrite process.env.NAME reads in function sources into string literals
holding the value each variable has while the build runs.

Common Usage:

  # Rewrite every function listed in the functions directory
  envinline run --functions-src netlify/functions

  # Also rewrite every helper file under the functions directory
  envinline run --functions-src netlify/functions --inline-all

  # Only inline selected variables
  envinline run --functions-src netlify/functions --include API_KEY,NODE_ENV

  # Show which files a run would rewrite
  envinline discover --functions-src netlify/functions --inline-all
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover function files and inline environment variables
    Run(RunArgs),

    /// List the files a run would rewrite, without touching them
    Discover(InlineArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// List supported source kinds and their extensions
    #[command(name = "list-languages")]
    ListLanguages,
}

/// Options shared by every command that builds an inliner configuration
#[derive(Args, Debug, Clone, Default)]
pub struct InlineArgs {
    /// Configuration file (defaults to .envinline.yml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Functions source directory
    #[arg(long, env = "FUNCTIONS_SRC")]
    pub functions_src: Option<PathBuf>,

    /// JSON manifest of function descriptors, used instead of listing the functions directory
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Also rewrite every file under the functions directory
    #[arg(long)]
    pub inline_all: bool,

    /// Variables eligible for inlining (comma separated, repeatable)
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Variables never inlined (comma separated, repeatable)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Maximum number of files rewritten concurrently
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Skip files not yet started once a rewrite fails
    #[arg(long)]
    pub cancel_on_failure: bool,

    /// How references to unset variables are rendered
    #[arg(long, value_enum)]
    pub absent_variables: Option<AbsentVariablesArg>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub inline: InlineArgs,

    /// Lifecycle hook being dispatched; the run is a no-op unless it matches the configured hook
    #[arg(long)]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AbsentVariablesArg {
    /// Keep the live process.env lookup
    Keep,
    /// Replace the lookup with undefined
    Undefined,
}

impl From<AbsentVariablesArg> for AbsentVariables {
    fn from(arg: AbsentVariablesArg) -> Self {
        match arg {
            AbsentVariablesArg::Keep => AbsentVariables::Keep,
            AbsentVariablesArg::Undefined => AbsentVariables::Undefined,
        }
    }
}
