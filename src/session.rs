//! Interactive query session layered over a [`ResultSet`].
//!
//! The full ingest is bound to `ds`; `_` always holds the last result and
//! `let` adds further names. The session only evaluates statements from
//! [`crate::expr`]; it never reaches into the core beyond its public API.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::expr::{ExprError, Pipeline, Source, Statement, Terminal, parse_statement};
use crate::pretty::PrettyOptions;
use crate::query::ResultSet;

pub const HELP: &str = r#"
[Java Decorator Search]

Schema:
=======

Function:   {"path": "a/b/C.java", "class_name": "C", "function": "run", "line": 12, "decorators": [...]}
Decorator:  {"name": "RolesAllowed", "value": "admin,user"}

Usage:
======

Start from `ds` (every method found) and chain calls:

  any(<filter>)     keep functions where at least one decorator matches
  all(<filter>)     keep functions where every decorator matches (negative searches)
  find(<filter>)    filter on the whole function: path, class, function, line,
                    and name/value meaning "some decorator"

  by_name(s)  by_exact_name(s)  by_value(s)  by_exact_value(s)  by_name_and_value(n, v)

Filters: key op value, combined with and / or / not and parentheses.
  keys: name value | path class function line
  ops:  =  !=  ~ (contains)  !~  and < <= > >= for line

Finish a pipeline with .pretty(), .json() or .count(); otherwise the number of
matches is printed. `_` is the last result, `let name = ...` keeps one around.

Examples:
=========

>> ds.any(name ~ auth).pretty()
>> ds.any(name ~ Auth and value ~ admin).pretty()
>> ds.any(name ~ Auth).all(not name ~ Test).pretty()
>> let open = ds.all(not name ~ Auth)
>> open.find(path ~ controller and line > 100).json()
"#;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W: Write> {
    root: ResultSet,
    last: ResultSet,
    bindings: BTreeMap<String, ResultSet>,
    pretty: PrettyOptions,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(root: ResultSet, pretty: PrettyOptions, out: W) -> Self {
        Self {
            last: root.clone(),
            root,
            bindings: BTreeMap::new(),
            pretty,
            out,
        }
    }

    pub fn last(&self) -> &ResultSet {
        &self.last
    }

    pub fn binding(&self, name: &str) -> Option<&ResultSet> {
        self.bindings.get(name)
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn help(&mut self) -> io::Result<()> {
        writeln!(self.out, "{HELP}")
    }

    /// Evaluate one line. Blank lines and `#` comments are ignored.
    pub fn execute(&mut self, line: &str) -> Result<Flow, SessionError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        match parse_statement(line)? {
            Statement::Help => self.help()?,
            Statement::Quit => return Ok(Flow::Quit),
            Statement::Let { name, pipeline } => {
                let result = self.evaluate(&pipeline)?;
                if pipeline.terminal.is_none() {
                    writeln!(self.out, "{name}: {}", describe(&result))?;
                }
                self.bindings.insert(name, result);
            }
            Statement::Run(pipeline) => {
                let result = self.evaluate(&pipeline)?;
                if pipeline.terminal.is_none() {
                    writeln!(self.out, "{}", describe(&result))?;
                }
            }
        }

        Ok(Flow::Continue)
    }

    fn evaluate(&mut self, pipeline: &Pipeline) -> Result<ResultSet, SessionError> {
        let result = pipeline.apply(self.resolve(&pipeline.source)?);
        match pipeline.terminal {
            Some(Terminal::Pretty) => result.pretty(&mut self.out, &self.pretty)?,
            Some(Terminal::Json) => {
                serde_json::to_writer_pretty(&mut self.out, &result)?;
                writeln!(self.out)?;
            }
            Some(Terminal::Count) => writeln!(self.out, "{}", result.len())?,
            None => {}
        }
        self.last = result.clone();
        Ok(result)
    }

    fn resolve(&self, source: &Source) -> Result<&ResultSet, ExprError> {
        match source {
            Source::Root => Ok(&self.root),
            Source::Last => Ok(&self.last),
            Source::Binding(name) => self
                .bindings
                .get(name)
                .ok_or_else(|| ExprError::UnknownSource(name.clone())),
        }
    }

    /// Read-eval-print until EOF or `quit`. Statement errors are printed and
    /// the loop continues; only I/O failures end it early.
    pub fn run<R: BufRead>(&mut self, input: R, prompt: bool) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(self.out, ">> ")?;
                self.out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            match self.execute(&line?) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(SessionError::Io(err)) => return Err(err),
                Err(err) => writeln!(self.out, "[!] {err}")?,
            }
            self.out.flush()?;
        }
        if prompt {
            writeln!(self.out)?;
        }
        Ok(())
    }
}

fn describe(results: &ResultSet) -> String {
    match results.len() {
        1 => "1 function".to_string(),
        n => format!("{n} functions"),
    }
}
