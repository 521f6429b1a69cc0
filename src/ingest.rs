//! Bulk ingestion: walk a tree, parse every source file, normalize every class.
//!
//! Each file is its own error boundary. A file that cannot be read or parsed
//! contributes no records and is reported in [`Ingest::failures`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use thiserror::Error;

use crate::java::JavaParser;
use crate::normalize::Normalizer;
use crate::query::ResultSet;
use crate::record::FunctionRecord;
use crate::scan::scan_sources;
use crate::syntax::{SourceParser, SyntaxError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Syntax {
        path: String,
        #[source]
        source: SyntaxError,
    },
}

impl SourceError {
    pub fn path(&self) -> &str {
        match self {
            SourceError::Read { path, .. } | SourceError::Syntax { path, .. } => path,
        }
    }
}

#[derive(Debug, Default)]
pub struct Ingest {
    pub results: ResultSet,
    pub files: usize,
    pub failures: Vec<SourceError>,
}

#[derive(Debug, Clone, Default)]
pub struct Ingestor<P = JavaParser> {
    parser: P,
    normalizer: Normalizer,
}

impl<P: SourceParser> Ingestor<P> {
    pub fn new(parser: P, normalizer: Normalizer) -> Self {
        Self { parser, normalizer }
    }

    /// Records for one file's text; `path` is copied into every record.
    pub fn ingest_source(&self, path: &str, source: &str) -> Result<Vec<FunctionRecord>, SyntaxError> {
        let classes = self.parser.parse(source)?;
        Ok(classes
            .iter()
            .flat_map(|class| self.normalizer.normalize_class(path, class))
            .collect())
    }

    pub fn ingest_file(&self, path: &Path) -> Result<Vec<FunctionRecord>, SourceError> {
        let display = path.to_string_lossy().to_string();
        let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
            path: display.clone(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes);

        self.ingest_source(&display, &source)
            .map_err(|source| SourceError::Syntax {
                path: display,
                source,
            })
    }

    /// Parses `files` in parallel; records keep the order of `files`.
    pub fn ingest_files(&self, files: &[PathBuf]) -> Ingest {
        let outcomes: Vec<Result<Vec<FunctionRecord>, SourceError>> =
            files.par_iter().map(|path| self.ingest_file(path)).collect();

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(found) => records.extend(found),
                Err(err) => {
                    tracing::debug!(path = err.path(), "file skipped: {err}");
                    failures.push(err);
                }
            }
        }

        tracing::info!(
            files = files.len(),
            functions = records.len(),
            failed = failures.len(),
            "ingest complete"
        );

        Ingest {
            results: ResultSet::from_records(records),
            files: files.len(),
            failures,
        }
    }

    pub fn ingest_tree(&self, root: &Path, ignore: &BTreeSet<String>) -> Result<Ingest> {
        let files = scan_sources(root, ignore)?;
        tracing::debug!(root = %root.display(), files = files.len(), "scanned source tree");
        Ok(self.ingest_files(&files))
    }
}
