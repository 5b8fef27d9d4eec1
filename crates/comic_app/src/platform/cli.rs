use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "cbz2epub",
    version,
    about = "Repair CBZ comic archives and convert them to EPUB with Calibre"
)]
pub struct Cli {
    /// Comic archives to convert, in volume order
    #[arg(required = true)]
    pub archives: Vec<PathBuf>,

    /// Folder receiving the EPUB files and the session log
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Author written into every EPUB
    #[arg(long)]
    pub author: Option<String>,

    /// Series name; also used to number the output files
    #[arg(long)]
    pub series: Option<String>,

    /// Converter executable to use instead of ebook-convert
    #[arg(long)]
    pub converter: Option<PathBuf>,

    /// Configuration file (RON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log to the terminal
    #[arg(long)]
    pub no_log_file: bool,

    /// Use --write-report true or --write-report false to override
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub write_report: bool,
}
