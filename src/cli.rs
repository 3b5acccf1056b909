use clap::{Parser, Subcommand};
use scriptcheck::output::OutputFormat;
use scriptcheck::reader::PipelineType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scriptcheck",
    version,
    about = "Shellcheck the scripts embedded in CI pipeline files"
)]
pub struct Cli {
    /// Log extraction details to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Custom config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Pipeline dialect of the input files
    #[arg(long = "type", short = 't', global = true, value_enum)]
    pub pipeline: Option<PipelineType>,

    /// Merge all input files into one pipeline before extraction
    #[arg(long, global = true)]
    pub merge: bool,

    /// Fail when no script is found
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the scripts of pipeline files with shellcheck
    Check {
        /// Pipeline files, directories or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Shell for scripts without a directive or shebang
        #[arg(long, short)]
        shell: Option<String>,

        /// Output format
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Write output to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Extra shellcheck flags, with or without the leading `--`
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        flags: Vec<String>,
    },

    /// Write the scripts of pipeline files to a directory
    Extract {
        /// Pipeline files, directories or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Shell for scripts without a directive or shebang
        #[arg(long, short)]
        shell: Option<String>,

        /// Output directory
        #[arg(long, short, default_value = "scripts")]
        output: PathBuf,
    },

    /// Check whether shellcheck is available
    CheckTools,
}
