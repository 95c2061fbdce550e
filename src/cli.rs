use crate::pairing::PairingOptions;
use crate::record::Format;
use clap::builder::styling::AnsiColor;
use clap::builder::{Styles, TypedValueParser};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 matepair version ";
const AFTER_STRING: &str = indoc::indoc! {"

       ──────────────────────────────────
       combine paired-end read files into one matched R1/R2 pair"};

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Combine sets of paired reads into a single pair of files, keeping only reads whose ID is
    /// present in both the R1 and R2 files
    #[command(arg_required_else_help = true)]
    Pair {
        #[command(flatten)]
        inputs: InputArgs,

        /// file into which the combined R1 reads are written
        #[arg(long = "out-1")]
        out_1: PathBuf,

        /// file into which the combined R2 reads are written
        #[arg(long = "out-2")]
        out_2: PathBuf,

        /// report the number of remaining pairs whenever it is a multiple of this value
        #[arg(
            long,
            default_value_t = crate::matcher::PROGRESS_INTERVAL,
            value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize)
        )]
        progress_interval: usize,

        /// also write a JSON summary of the run to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Report the read IDs in each set of files and how many are shared, without writing reads.
    /// The summary is printed to standard output as JSON.
    #[command(arg_required_else_help = true)]
    Scan {
        #[command(flatten)]
        inputs: InputArgs,

        /// also write the JSON summary to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// read 1 files to be combined
    #[arg(short = '1', long = "in-1", num_args = 1.., required = true)]
    pub in_1: Vec<PathBuf>,

    /// read 2 files to be combined. these must be in the same order as --in-1:
    /// the n-th R2 file is paired with the n-th R1 file
    #[arg(short = '2', long = "in-2", num_args = 1.., required = true, verbatim_doc_comment)]
    pub in_2: Vec<PathBuf>,

    /// normalize IDs for pairs by stripping a trailing /x, e.g. `read7/1` becomes `read7`
    #[arg(short, long)]
    pub normalize_ids: bool,

    /// format of the input files. the outputs are written in the same format
    #[arg(long, value_enum, default_value = "auto")]
    pub format: FormatArg,
}

/// Input format selection, with automatic detection from the first file.
#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum FormatArg {
    /// detect from the first character of the first non-empty file
    Auto,
    Fastq,
    Fasta,
}

impl InputArgs {
    pub fn into_options(self, progress_interval: usize) -> PairingOptions {
        PairingOptions {
            forward: self.in_1,
            reverse: self.in_2,
            normalize_ids: self.normalize_ids,
            format: match self.format {
                FormatArg::Auto => None,
                FormatArg::Fastq => Some(Format::Fastq),
                FormatArg::Fasta => Some(Format::Fasta),
            },
            progress_interval,
        }
    }
}
