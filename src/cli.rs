use crate::format::FormatArg;
use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Args, Parser, Subcommand};

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🏷  seqrenamer version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   anonymise or shorten the ids of fasta, csv/tsv and gff3 files,
   keeping a map file to restore them later";

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
    /// Replace ids with short generated ones, writing the mapping to a map file
    #[command(arg_required_else_help = true)]
    Encode {
        #[command(flatten)]
        input: InputArgs,

        /// the number of characters after the prefix of each new id.
        /// ids grow longer once every id of this length has been used.
        #[arg(short, long, default_value_t = 5)]
        length: usize,

        /// the prefix of every new id
        #[arg(short, long, default_value = "SR")]
        prefix: String,

        /// give identical sequences a single id and only write the first of them (fasta only)
        #[arg(short, long, action)]
        deduplicate: bool,

        /// characters to strip from the end of each sequence, e.g. `*` for protein stop codons
        /// (fasta only)
        #[arg(short, long)]
        strip: Option<String>,

        /// convert sequences to uppercase (fasta only)
        #[arg(short = 'U', long, action)]
        upper: bool,

        /// the map file to write
        #[arg(short, long)]
        map: String,
    },

    /// Restore the original ids of an encoded file using its map file
    #[command(arg_required_else_help = true)]
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// the map file written by `encode`
        #[arg(short, long)]
        map: String,
    },
}

/// Options shared by both subcommands.
#[derive(Args)]
pub struct InputArgs {
    /// the input format. `auto` uses the extension of the first input file
    #[arg(short, long, value_enum, default_value = "auto")]
    pub format: FormatArg,

    /// which field holds the ids:
    ///   fasta:   `id` (default) or `description`
    ///   gff3:    `id` (default), `name`, `seqid` or `parent`
    ///   csv/tsv: a 0-based column index, e.g. `2` or `column:2` (default 0)
    #[arg(short, long, verbatim_doc_comment, allow_negative_numbers = true)]
    pub column: Option<String>,

    /// treat the first row of csv/tsv input as a header. it is written once and never renamed
    #[arg(short = 'H', long, action)]
    pub header: bool,

    /// lines starting with this marker are dropped. defaults to `;` for fasta and `#` for
    /// csv/tsv. an empty marker keeps every line
    #[arg(short = 'C', long)]
    pub comment: Option<String>,

    /// the number of records between each flush of the output
    #[arg(long, default_value_t = 10000)]
    pub chunk_size: usize,

    /// the output file, standard output if not given
    #[arg(short, long)]
    pub output: Option<String>,

    /// the input files, read one after the other. `-` is standard input
    #[arg(required = true)]
    pub infiles: Vec<String>,
}
