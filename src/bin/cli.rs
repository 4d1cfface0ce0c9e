//! Binary entry point for the quarry command-line interface.
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use nu_ansi_term::Color::Red;
use tracing_subscriber::EnvFilter;

use quarry::cli::{self, FilesOptions, OutputFormat};
use quarry::storage::FileSort;

#[derive(Parser, Debug)]
#[command(
    name = "quarry",
    version,
    about = "Tag-based file catalogue with a boolean query language",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "QUARRY_DB",
        value_name = "PATH",
        help = "Path to the catalogue database"
    )]
    database: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new catalogue
    Init,

    /// Apply tags to a file
    Tag {
        /// File to tag
        file: PathBuf,
        /// Taggings to apply, as TAG or TAG=VALUE
        #[arg(required = true, value_name = "TAG[=VALUE]")]
        taggings: Vec<String>,
    },

    /// Remove tags from a file
    Untag {
        /// File to untag
        file: PathBuf,
        /// Taggings to remove, as TAG or TAG=VALUE
        #[arg(required = true, value_name = "TAG[=VALUE]")]
        taggings: Vec<String>,
    },

    /// List files matching a query
    Files(FilesCmd),

    /// List tags, or the tags on a file
    Tags {
        /// File to inspect; all tags are listed when omitted
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = FormatArg::Text, help = "Output format")]
        format: FormatArg,
    },

    /// List values, or the values in use with a tag
    Values {
        /// Tag to inspect; all values are listed when omitted
        tag: Option<String>,
    },

    /// Manage tag implications
    Imply(ImplyCmd),
}

#[derive(Args, Debug)]
struct FilesCmd {
    /// Query terms; all files are listed when omitted
    #[arg(value_name = "QUERY")]
    query: Vec<String>,

    #[arg(short, long, help = "List only items that are directories")]
    directory: bool,

    #[arg(short, long, help = "List only items that are files")]
    file: bool,

    #[arg(
        short = '0',
        long,
        help = "Delimit files with a NUL character rather than newline"
    )]
    print0: bool,

    #[arg(short, long, help = "List the number of files rather than their names")]
    count: bool,

    #[arg(short, long, value_name = "PATH", help = "List only items under PATH")]
    path: Option<PathBuf>,

    #[arg(short, long, help = "List only explicitly tagged files")]
    explicit: bool,

    #[arg(short, long, help = "Ignore the case of tag and value names")]
    ignore_case: bool,

    #[arg(short, long, value_enum, help = "Sort output")]
    sort: Option<SortArg>,

    #[arg(long, value_enum, default_value_t = FormatArg::Text, help = "Output format")]
    format: FormatArg,
}

#[derive(Args, Debug)]
struct ImplyCmd {
    /// Source and implied taggings, as TAG or TAG=VALUE; the stored
    /// implications are listed when omitted
    #[arg(value_name = "TAG[=VALUE]")]
    taggings: Vec<String>,

    #[arg(short, long, help = "Delete the implication instead of adding it")]
    delete: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    None,
    Id,
    Name,
    Time,
    Size,
}

impl From<SortArg> for FileSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::None => FileSort::None,
            SortArg::Id => FileSort::Id,
            SortArg::Name => FileSort::Name,
            SortArg::Time => FileSort::Time,
            SortArg::Size => FileSort::Size,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli) {
        eprintln!("{}", Red.paint(format!("error: {error}")));
        process::exit(1);
    }
}

fn run(cli: Cli) -> quarry::Result<()> {
    let database = cli.database;

    match cli.command {
        Command::Init => cli::init(database),
        Command::Tag { file, taggings } => cli::tag_file(database, &file, &taggings),
        Command::Untag { file, taggings } => cli::untag_file(database, &file, &taggings),
        Command::Files(cmd) => {
            let options = FilesOptions {
                path: cmd.path,
                explicit_only: cmd.explicit,
                ignore_case: cmd.ignore_case,
                sort: cmd.sort.map(FileSort::from),
                directories_only: cmd.directory,
                files_only: cmd.file,
                count: cmd.count,
                print0: cmd.print0,
                format: cmd.format.into(),
            };
            cli::files(database, &cmd.query.join(" "), &options)
        }
        Command::Tags { file, format } => cli::tags(database, file.as_deref(), format.into()),
        Command::Values { tag } => cli::values(database, tag.as_deref()),
        Command::Imply(cmd) => match (cmd.taggings.as_slice(), cmd.delete) {
            ([], false) => cli::imply_list(database),
            ([source, implied], false) => cli::imply_add(database, source, implied),
            ([source, implied], true) => cli::imply_delete(database, source, implied),
            ([], true) => Err(quarry::Error::InvalidArgument(
                "--delete requires a source and an implied tagging".into(),
            )),
            _ => Err(quarry::Error::InvalidArgument(
                "imply takes a source and an implied tagging".into(),
            )),
        },
    }
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "quarry=info",
        _ => "quarry=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
