use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "decorator-search")]
#[command(about = "Search Java methods by their annotations, interactively or with --eval")]
pub struct Cli {
    /// Folder to scan for .java files
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// File or directory name to skip (exact match, repeatable)
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Do not print the help banner
    #[arg(short, long)]
    pub quiet: bool,

    /// Evaluate a statement and exit instead of starting the shell (repeatable)
    #[arg(short, long, value_name = "EXPR")]
    pub eval: Vec<String>,

    /// Parser threads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Keep annotations with unsupported arguments, with an empty value
    #[arg(long)]
    pub keep_unsupported: bool,

    #[arg(long)]
    pub no_color: bool,

    /// Separator width for pretty output
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
