use anyhow::{Context, Result};
use clap::Parser;
use decorator_search::cli::{Cli, LogLevel};
use decorator_search::config::SearchConfig;
use decorator_search::ingest::{Ingest, Ingestor, SourceError};
use decorator_search::java::JavaParser;
use decorator_search::normalize::Normalizer;
use decorator_search::session::{Flow, Session};
use std::io::{self, IsTerminal, Write};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let config = SearchConfig::from_cli(&cli)?;
    if let Some(jobs) = config.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to start parser threads")?;
    }
    colored::control::set_override(config.pretty.color);

    let start = Instant::now();
    let ingestor = Ingestor::new(JavaParser, Normalizer::new(config.policy));
    let ingest = ingestor.ingest_tree(&config.root, &config.ignore)?;
    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "ingest finished");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report(&mut out, &ingest).context("Failed to write to stdout")?;

    let mut session = Session::new(ingest.results, config.pretty, out);
    if !cli.quiet {
        session.help().context("Failed to write to stdout")?;
    }

    if !cli.eval.is_empty() {
        for statement in &cli.eval {
            let flow = session
                .execute(statement)
                .with_context(|| format!("Failed to evaluate: {statement}"))?;
            if flow == Flow::Quit {
                break;
            }
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    session
        .run(stdin.lock(), prompt)
        .context("Failed to run the query shell")?;
    Ok(())
}

fn report<W: Write>(out: &mut W, ingest: &Ingest) -> io::Result<()> {
    for failure in &ingest.failures {
        let reason = match failure {
            SourceError::Read { source, .. } => source.to_string(),
            SourceError::Syntax { source, .. } => source.to_string(),
        };
        writeln!(out, "[!] Parse FAILED: {} ({reason})", failure.path())?;
    }
    writeln!(
        out,
        "Loaded {} functions from {} files ({} failed)",
        ingest.results.len(),
        ingest.files,
        ingest.failures.len()
    )
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
