//! Query language used by the interactive shell and `--eval`.
//!
//! A statement is a pipeline of query calls applied to a named result set:
//!
//! ```text
//! ds.any(name ~ Auth).all(not name ~ Test).pretty()
//! let admin = ds.by_name_and_value("Roles", "admin")
//! admin.find(path ~ "web/" and line > 100).count()
//! ```
//!
//! ## Grammar
//!
//! ```text
//! <stmt>       := "let" ident "=" <pipeline> | <pipeline>
//! <pipeline>   := [ident] ("." ident "(" [<arg> ("," <arg>)*] ")")*
//! <arg>        := quoted | <filter> | word
//! <filter>     := <and> ("or" <and>)*
//! <and>        := <term> ("and" <term>)*
//! <term>       := ["not"] <factor>
//! <factor>     := <condition> | "(" <filter> ")"
//! <condition>  := key op value
//! ```
//!
//! Keys are `name` and `value` (decorator fields) plus `path`, `class`,
//! `function` and `line` (record fields, `find` only). Operators are `=`,
//! `!=`, `~` (contains), `!~`, and `<`, `<=`, `>`, `>=` for `line`.
//! Quoted values have no escapes.

use thiserror::Error;
use winnow::ModalResult;
use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

use crate::query::ResultSet;
use crate::record::{Decorator, FunctionRecord};

/// Name the full ingest is bound to.
pub const ROOT_SOURCE: &str = "ds";
/// Name of the most recent pipeline result.
pub const LAST_SOURCE: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("invalid statement '{input}': unexpected input at column {column}")]
    Syntax { input: String, column: usize },

    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    #[error("{method}() expects {expected}")]
    Arguments {
        method: String,
        expected: &'static str,
    },

    #[error("unknown key '{0}' (expected name, value, path, class, function or line)")]
    UnknownKey(String),

    #[error("key '{key}' cannot be used in {method}(); only name and value apply to a single decorator")]
    KeyScope { key: String, method: String },

    #[error("operator '{op}' does not apply to key '{key}'")]
    Operator { key: String, op: &'static str },

    #[error("'{value}' is not a line number")]
    NotANumber { value: String },

    #[error("{0}() must be the last call in a pipeline")]
    TerminalNotLast(String),

    #[error("'{0}' cannot be rebound")]
    Reserved(String),

    #[error("unknown result set '{0}'")]
    UnknownSource(String),
}

// ============================================================================
// Boolean filter trees
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr<T> {
    And(Vec<BoolExpr<T>>),
    Or(Vec<BoolExpr<T>>),
    Not(Box<BoolExpr<T>>),
    Leaf(T),
}

impl<T> BoolExpr<T> {
    pub fn eval<F>(&self, test: &F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        match self {
            BoolExpr::And(exprs) => exprs.iter().all(|e| e.eval(test)),
            BoolExpr::Or(exprs) => exprs.iter().any(|e| e.eval(test)),
            BoolExpr::Not(expr) => !expr.eval(test),
            BoolExpr::Leaf(leaf) => test(leaf),
        }
    }

    pub fn try_map<U, E, F>(&self, f: &F) -> Result<BoolExpr<U>, E>
    where
        F: Fn(&T) -> Result<U, E>,
    {
        Ok(match self {
            BoolExpr::And(exprs) => {
                BoolExpr::And(exprs.iter().map(|e| e.try_map(f)).collect::<Result<_, _>>()?)
            }
            BoolExpr::Or(exprs) => {
                BoolExpr::Or(exprs.iter().map(|e| e.try_map(f)).collect::<Result<_, _>>()?)
            }
            BoolExpr::Not(expr) => BoolExpr::Not(Box::new(expr.try_map(f)?)),
            BoolExpr::Leaf(leaf) => BoolExpr::Leaf(f(leaf)?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Name,
    Value,
    Path,
    Class,
    Function,
    Line,
}

impl Key {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Key::Name),
            "value" => Some(Key::Value),
            "path" => Some(Key::Path),
            "class" | "class_name" => Some(Key::Class),
            "function" => Some(Key::Function),
            "line" => Some(Key::Line),
            _ => None,
        }
    }

    pub fn is_decorator_key(self) -> bool {
        matches!(self, Key::Name | Key::Value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Contains,
    NotContains,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Contains => "~",
            Op::NotContains => "!~",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }

    fn is_ordering(self) -> bool {
        matches!(self, Op::Lt | Op::Le | Op::Gt | Op::Ge)
    }

    fn is_substring(self) -> bool {
        matches!(self, Op::Contains | Op::NotContains)
    }
}

/// A condition as written, before its key is checked against a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCondition {
    pub key: String,
    pub op: Op,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Inside `any()` / `all()`: one decorator at a time.
    Decorator,
    /// Inside `find()`: the whole record.
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    key: Key,
    op: Op,
    value: String,
    line: usize,
}

impl Condition {
    fn compile(raw: &RawCondition, scope: Scope, method: &str) -> Result<Self, ExprError> {
        let key = Key::parse(&raw.key).ok_or_else(|| ExprError::UnknownKey(raw.key.clone()))?;
        if scope == Scope::Decorator && !key.is_decorator_key() {
            return Err(ExprError::KeyScope {
                key: raw.key.clone(),
                method: method.to_string(),
            });
        }

        let misapplied = if key == Key::Line {
            raw.op.is_substring()
        } else {
            raw.op.is_ordering()
        };
        if misapplied {
            return Err(ExprError::Operator {
                key: raw.key.clone(),
                op: raw.op.symbol(),
            });
        }

        let line = if key == Key::Line {
            raw.value
                .parse::<usize>()
                .map_err(|_| ExprError::NotANumber {
                    value: raw.value.clone(),
                })?
        } else {
            0
        };

        Ok(Condition {
            key,
            op: raw.op,
            value: raw.value.clone(),
            line,
        })
    }

    fn test_text(&self, text: &str) -> bool {
        match self.op {
            Op::Eq => text == self.value,
            Op::Ne => text != self.value,
            Op::Contains => text.contains(&self.value),
            Op::NotContains => !text.contains(&self.value),
            Op::Lt | Op::Le | Op::Gt | Op::Ge => false,
        }
    }

    fn test_line(&self, line: usize) -> bool {
        match self.op {
            Op::Eq => line == self.line,
            Op::Ne => line != self.line,
            Op::Lt => line < self.line,
            Op::Le => line <= self.line,
            Op::Gt => line > self.line,
            Op::Ge => line >= self.line,
            Op::Contains | Op::NotContains => false,
        }
    }

    pub fn matches_decorator(&self, decorator: &Decorator) -> bool {
        match self.key {
            Key::Name => self.test_text(&decorator.name),
            Key::Value => self.test_text(&decorator.value),
            _ => false,
        }
    }

    /// Record fields test the record; `name`/`value` hold if any decorator matches.
    pub fn matches_record(&self, record: &FunctionRecord) -> bool {
        match self.key {
            Key::Name | Key::Value => record.decorators.iter().any(|d| self.matches_decorator(d)),
            Key::Path => self.test_text(&record.path),
            Key::Class => self.test_text(&record.class_name),
            Key::Function => self.test_text(&record.function),
            Key::Line => self.test_line(record.line),
        }
    }
}

pub type Filter = BoolExpr<Condition>;

impl BoolExpr<RawCondition> {
    pub fn compile(&self, scope: Scope, method: &str) -> Result<Filter, ExprError> {
        self.try_map(&|raw: &RawCondition| Condition::compile(raw, scope, method))
    }
}

impl Filter {
    pub fn matches_decorator(&self, decorator: &Decorator) -> bool {
        self.eval(&|c: &Condition| c.matches_decorator(decorator))
    }

    pub fn matches_record(&self, record: &FunctionRecord) -> bool {
        self.eval(&|c: &Condition| c.matches_record(record))
    }
}

// ============================================================================
// Pipelines and statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Find(Filter),
    Any(Filter),
    All(Filter),
    ByName(String),
    ByExactName(String),
    ByValue(String),
    ByExactValue(String),
    ByNameAndValue(String, String),
}

impl Step {
    pub fn apply(&self, results: &ResultSet) -> ResultSet {
        match self {
            Step::Find(filter) => results.find(|r| filter.matches_record(r)),
            Step::Any(filter) => results.any_decorator_matches(|d| filter.matches_decorator(d)),
            Step::All(filter) => results.all_decorators_match(|d| filter.matches_decorator(d)),
            Step::ByName(name) => results.by_name(name),
            Step::ByExactName(name) => results.by_exact_name(name),
            Step::ByValue(value) => results.by_value(value),
            Step::ByExactValue(value) => results.by_exact_value(value),
            Step::ByNameAndValue(name, value) => results.by_name_and_value(name, value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Pretty,
    Json,
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Root,
    Last,
    Binding(String),
}

impl Source {
    fn from_name(name: Option<&str>) -> Self {
        match name {
            None | Some(ROOT_SOURCE) => Source::Root,
            Some(LAST_SOURCE) => Source::Last,
            Some(other) => Source::Binding(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub source: Source,
    pub steps: Vec<Step>,
    pub terminal: Option<Terminal>,
}

impl Pipeline {
    pub fn apply(&self, input: &ResultSet) -> ResultSet {
        self.steps
            .iter()
            .fold(input.clone(), |acc, step| step.apply(&acc))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Help,
    Quit,
    Let { name: String, pipeline: Pipeline },
    Run(Pipeline),
}

/// Parse one shell statement.
pub fn parse_statement(input: &str) -> Result<Statement, ExprError> {
    let trimmed = input.trim();
    match trimmed {
        "help" | "?" => return Ok(Statement::Help),
        "quit" | "exit" => return Ok(Statement::Quit),
        _ => {}
    }

    let raw = statement.parse(trimmed).map_err(|e| ExprError::Syntax {
        input: trimmed.to_string(),
        column: e.offset() + 1,
    })?;

    match raw {
        RawStatement::Let { name, pipeline } => {
            if name == ROOT_SOURCE || name == LAST_SOURCE {
                return Err(ExprError::Reserved(name));
            }
            Ok(Statement::Let {
                name,
                pipeline: compile_pipeline(pipeline)?,
            })
        }
        RawStatement::Run(pipeline) => Ok(Statement::Run(compile_pipeline(pipeline)?)),
    }
}

/// Parse a bare filter such as `name ~ Auth and not value = ""`.
pub fn parse_filter(input: &str, scope: Scope) -> Result<Filter, ExprError> {
    let trimmed = input.trim();
    let raw = delimited(ws, filter, ws)
        .parse(trimmed)
        .map_err(|e| ExprError::Syntax {
            input: trimmed.to_string(),
            column: e.offset() + 1,
        })?;
    let method = match scope {
        Scope::Decorator => "any",
        Scope::Record => "find",
    };
    raw.compile(scope, method)
}

fn compile_pipeline(raw: RawPipeline) -> Result<Pipeline, ExprError> {
    let mut steps = Vec::new();
    let mut terminal = None;

    for call in raw.calls {
        if let Some(previous) = terminal {
            return Err(ExprError::TerminalNotLast(terminal_name(previous).to_string()));
        }
        match compile_call(call)? {
            Compiled::Step(step) => steps.push(step),
            Compiled::Terminal(t) => terminal = Some(t),
        }
    }

    Ok(Pipeline {
        source: Source::from_name(raw.source.as_deref()),
        steps,
        terminal,
    })
}

fn terminal_name(terminal: Terminal) -> &'static str {
    match terminal {
        Terminal::Pretty => "pretty",
        Terminal::Json => "json",
        Terminal::Count => "count",
    }
}

enum Compiled {
    Step(Step),
    Terminal(Terminal),
}

fn compile_call(call: Call) -> Result<Compiled, ExprError> {
    let method = call.name.as_str();
    let filters: Vec<_> = call.args.iter().map(Arg::filter).collect();
    let texts: Vec<_> = call.args.iter().map(Arg::text).collect();
    let step = match (method, filters.as_slice(), texts.as_slice()) {
        ("find", [Some(f)], _) => Step::Find(f.compile(Scope::Record, method)?),
        ("any", [Some(f)], _) => Step::Any(f.compile(Scope::Decorator, method)?),
        ("all", [Some(f)], _) => Step::All(f.compile(Scope::Decorator, method)?),
        ("by_name", _, [s]) => Step::ByName(s.to_string()),
        ("by_exact_name", _, [s]) => Step::ByExactName(s.to_string()),
        ("by_value", _, [s]) => Step::ByValue(s.to_string()),
        ("by_exact_value", _, [s]) => Step::ByExactValue(s.to_string()),
        ("by_name_and_value", _, [n, v]) => {
            Step::ByNameAndValue(n.to_string(), v.to_string())
        }
        ("pretty", [], _) => return Ok(Compiled::Terminal(Terminal::Pretty)),
        ("json", [], _) => return Ok(Compiled::Terminal(Terminal::Json)),
        ("count", [], _) => return Ok(Compiled::Terminal(Terminal::Count)),
        (name, _, _) => {
            let expected = match name {
                "find" | "any" | "all" => "one filter, e.g. name ~ Auth",
                "by_name" | "by_exact_name" | "by_value" | "by_exact_value" => "one string",
                "by_name_and_value" => "two strings",
                "pretty" | "json" | "count" => "no arguments",
                _ => return Err(ExprError::UnknownMethod(name.to_string())),
            };
            return Err(ExprError::Arguments {
                method: name.to_string(),
                expected,
            });
        }
    };
    Ok(Compiled::Step(step))
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum RawStatement {
    Let { name: String, pipeline: RawPipeline },
    Run(RawPipeline),
}

#[derive(Debug, Clone, PartialEq)]
struct RawPipeline {
    source: Option<String>,
    calls: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq)]
struct Call {
    name: String,
    args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Text(String),
    /// The parsed filter plus the text it was parsed from.
    Filter(BoolExpr<RawCondition>, String),
}

impl Arg {
    /// String arguments may be written bare, so `by_value(id=1)` is the
    /// string `id=1` even though it also parses as a filter.
    fn text(&self) -> &str {
        match self {
            Arg::Text(text) => text,
            Arg::Filter(_, taken) => taken,
        }
    }

    fn filter(&self) -> Option<&BoolExpr<RawCondition>> {
        match self {
            Arg::Filter(filter, _) => Some(filter),
            Arg::Text(_) => None,
        }
    }
}

fn ws(input: &mut &str) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

fn ws1(input: &mut &str) -> ModalResult<()> {
    multispace1.void().parse_next(input)
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn statement(input: &mut &str) -> ModalResult<RawStatement> {
    alt((let_statement, pipeline.map(RawStatement::Run))).parse_next(input)
}

fn let_statement(input: &mut &str) -> ModalResult<RawStatement> {
    ("let", ws1).void().parse_next(input)?;
    let name = identifier(input)?;
    (ws, '=', ws).void().parse_next(input)?;
    let pipeline = pipeline(input)?;
    Ok(RawStatement::Let {
        name: name.to_string(),
        pipeline,
    })
}

fn pipeline(input: &mut &str) -> ModalResult<RawPipeline> {
    ws(input)?;
    let source = opt(identifier).parse_next(input)?;
    let calls: Vec<Call> = repeat(0.., preceded((ws, '.', ws), call)).parse_next(input)?;
    ws(input)?;
    Ok(RawPipeline {
        source: source.map(str::to_string),
        calls,
    })
}

fn call(input: &mut &str) -> ModalResult<Call> {
    let name = identifier(input)?;
    let args: Vec<Arg> = delimited(
        (ws, '(', ws),
        separated(0.., argument, (ws, ',', ws)),
        (ws, ')'),
    )
    .parse_next(input)?;
    Ok(Call {
        name: name.to_string(),
        args,
    })
}

fn argument(input: &mut &str) -> ModalResult<Arg> {
    alt((
        quoted.map(Arg::Text),
        filter
            .with_taken()
            .map(|(f, taken): (_, &str)| Arg::Filter(f, taken.to_string())),
        bare_word.map(Arg::Text),
    ))
    .parse_next(input)
}

/// Lowest precedence: `or`.
fn filter(input: &mut &str) -> ModalResult<BoolExpr<RawCondition>> {
    let first = and_filter(input)?;
    let rest: Vec<BoolExpr<RawCondition>> =
        repeat(0.., preceded((ws, or_keyword, ws), and_filter)).parse_next(input)?;

    if rest.is_empty() {
        Ok(first)
    } else {
        let mut all = vec![first];
        all.extend(rest);
        Ok(BoolExpr::Or(all))
    }
}

fn and_filter(input: &mut &str) -> ModalResult<BoolExpr<RawCondition>> {
    let first = term(input)?;
    let rest: Vec<BoolExpr<RawCondition>> =
        repeat(0.., preceded((ws, and_keyword, ws), term)).parse_next(input)?;

    if rest.is_empty() {
        Ok(first)
    } else {
        let mut all = vec![first];
        all.extend(rest);
        Ok(BoolExpr::And(all))
    }
}

fn term(input: &mut &str) -> ModalResult<BoolExpr<RawCondition>> {
    ws(input)?;
    let negated = opt((not_keyword, ws)).parse_next(input)?.is_some();
    let factor = factor(input)?;

    if negated {
        Ok(BoolExpr::Not(Box::new(factor)))
    } else {
        Ok(factor)
    }
}

fn factor(input: &mut &str) -> ModalResult<BoolExpr<RawCondition>> {
    ws(input)?;
    alt((
        delimited(('(', ws), filter, (ws, ')')),
        condition.map(BoolExpr::Leaf),
    ))
    .parse_next(input)
}

fn condition(input: &mut &str) -> ModalResult<RawCondition> {
    let key = identifier(input)?;
    ws(input)?;
    let op = operator(input)?;
    ws(input)?;
    let value = alt((quoted, bare_word)).parse_next(input)?;
    Ok(RawCondition {
        key: key.to_string(),
        op,
        value,
    })
}

fn operator(input: &mut &str) -> ModalResult<Op> {
    alt((
        "!=".value(Op::Ne),
        "!~".value(Op::NotContains),
        ">=".value(Op::Ge),
        "<=".value(Op::Le),
        "==".value(Op::Eq),
        "=".value(Op::Eq),
        "~".value(Op::Contains),
        ">".value(Op::Gt),
        "<".value(Op::Lt),
    ))
    .parse_next(input)
}

fn quoted(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('"', take_till(0.., |c: char| c == '"'), '"'),
        delimited('\'', take_till(0.., |c: char| c == '\''), '\''),
    ))
    .map(|s: &str| s.to_string())
    .parse_next(input)
}

fn bare_word(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '(' | ')' | ',' | '"' | '\'')
    })
    .map(|s: &str| s.to_string())
    .parse_next(input)
}

fn keyword(input: &mut &str, expected: &str) -> ModalResult<()> {
    let checkpoint = *input;
    let word: &str = take_while(1.., |c: char| c.is_alphabetic()).parse_next(input)?;

    if word == expected {
        Ok(())
    } else {
        *input = checkpoint;
        Err(ErrMode::from_input(input))
    }
}

fn and_keyword(input: &mut &str) -> ModalResult<()> {
    keyword(input, "and")
}

fn or_keyword(input: &mut &str) -> ModalResult<()> {
    keyword(input, "or")
}

fn not_keyword(input: &mut &str) -> ModalResult<()> {
    let checkpoint = *input;
    keyword(input, "not")?;
    // `not` must stand alone so keys like `nothing` still parse
    if input.is_empty() || input.starts_with(char::is_whitespace) || input.starts_with('(') {
        Ok(())
    } else {
        *input = checkpoint;
        Err(ErrMode::from_input(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> Pipeline {
        match parse_statement(input).unwrap() {
            Statement::Run(p) => p,
            other => panic!("expected a pipeline, got {other:?}"),
        }
    }

    fn record(function: &str, line: usize, decorators: &[(&str, &str)]) -> FunctionRecord {
        FunctionRecord {
            path: format!("web/{function}.java"),
            class_name: "Api".to_string(),
            function: function.to_string(),
            line,
            decorators: decorators
                .iter()
                .map(|(n, v)| Decorator::new(*n, *v))
                .collect(),
        }
    }

    fn sample() -> ResultSet {
        ResultSet::from_records(vec![
            record("get", 10, &[("GET", ""), ("Auth", "")]),
            record("post", 20, &[("POST", ""), ("RolesAllowed", "admin")]),
            record("test", 30, &[("AuthTest", ""), ("Test", "")]),
            record("bare", 40, &[]),
        ])
    }

    fn names(rs: &ResultSet) -> Vec<&str> {
        rs.iter().map(|r| r.function.as_str()).collect()
    }

    #[test]
    fn parse_simple_pipeline() {
        let p = run("ds.any(name ~ Auth).pretty()");
        assert_eq!(p.source, Source::Root);
        assert_eq!(p.steps.len(), 1);
        assert_eq!(p.terminal, Some(Terminal::Pretty));
    }

    #[test]
    fn source_defaults_to_root() {
        assert_eq!(run(".by_name(Auth)").source, Source::Root);
        assert_eq!(run("_.count()").source, Source::Last);
        assert_eq!(run("admins").source, Source::Binding("admins".to_string()));
    }

    #[test]
    fn parse_let_statement() {
        match parse_statement("let guarded = ds.by_name(\"Auth\")").unwrap() {
            Statement::Let { name, pipeline } => {
                assert_eq!(name, "guarded");
                assert_eq!(pipeline.steps, vec![Step::ByName("Auth".to_string())]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(parse_statement(" help ").unwrap(), Statement::Help);
        assert_eq!(parse_statement("quit").unwrap(), Statement::Quit);
        assert_eq!(parse_statement("exit").unwrap(), Statement::Quit);
    }

    #[test]
    fn any_and_all_chain() {
        let p = run("ds.any(name ~ Auth).all(not name ~ Test)");
        assert_eq!(names(&p.apply(&sample())), vec!["get"]);
    }

    #[test]
    fn all_includes_records_without_decorators() {
        let p = run("ds.all(name = Nothing)");
        assert_eq!(names(&p.apply(&sample())), vec!["bare"]);
    }

    #[test]
    fn boolean_precedence_and_grouping() {
        let rs = sample();
        let p = run("ds.find(name = GET or name = POST and value = admin)");
        assert_eq!(names(&p.apply(&rs)), vec!["get", "post"]);

        let p = run("ds.find((name = GET or name = POST) and value = admin)");
        assert_eq!(names(&p.apply(&rs)), vec!["post"]);

        // any() tests one decorator at a time
        let p = run("ds.any(name = POST and value = admin)");
        assert!(p.apply(&rs).is_empty());
    }

    #[test]
    fn find_uses_record_fields() {
        let rs = sample();
        assert_eq!(names(&run("ds.find(line >= 20 and line < 40)").apply(&rs)), vec!["post", "test"]);
        assert_eq!(names(&run("ds.find(function = get)").apply(&rs)), vec!["get"]);
        assert_eq!(names(&run("ds.find(path ~ 'web/b')").apply(&rs)), vec!["bare"]);
        assert_eq!(names(&run("ds.find(class != Api)").apply(&rs)), Vec::<&str>::new());
    }

    #[test]
    fn find_name_and_value_match_any_decorator() {
        let rs = sample();
        let via_find = run("ds.find(name ~ Roles and value ~ adm)").apply(&rs);
        let via_helper = rs.by_name_and_value("Roles", "adm");
        assert_eq!(via_find.to_records(), via_helper.to_records());
    }

    #[test]
    fn convenience_calls() {
        let rs = sample();
        assert_eq!(names(&run("ds.by_name(Auth)").apply(&rs)), vec!["get", "test"]);
        assert_eq!(names(&run("ds.by_exact_name(\"Auth\")").apply(&rs)), vec!["get"]);
        assert_eq!(names(&run("ds.by_value(adm)").apply(&rs)), vec!["post"]);
        assert_eq!(names(&run("ds.by_exact_value(adm)").apply(&rs)), Vec::<&str>::new());
        assert_eq!(
            names(&run("ds.by_name_and_value('Roles', \"admin\")").apply(&rs)),
            vec!["post"]
        );
    }

    #[test]
    fn bare_string_arguments_may_contain_operators() {
        let rs = ResultSet::from_records(vec![
            record("a", 1, &[("Param", "id=1")]),
            record("b", 2, &[("Param", "id")]),
        ]);
        assert_eq!(
            run("ds.by_value(id=1)").steps,
            vec![Step::ByValue("id=1".to_string())]
        );
        assert_eq!(names(&run("ds.by_exact_value(id=1)").apply(&rs)), vec!["a"]);
        assert_eq!(
            names(&run("ds.by_name_and_value(Param, id=1)").apply(&rs)),
            vec!["a"]
        );
        assert!(matches!(
            parse_statement("ds.find(Auth)").unwrap_err(),
            ExprError::Arguments { .. }
        ));
    }

    #[test]
    fn quoted_values_may_contain_spaces_and_operators() {
        let f = parse_filter("value = \"a b, (c)\"", Scope::Decorator).unwrap();
        assert!(f.matches_decorator(&Decorator::new("X", "a b, (c)")));
        assert!(!f.matches_decorator(&Decorator::new("X", "a b")));
    }

    #[test]
    fn empty_quoted_value_matches_markers() {
        let f = parse_filter("value = \"\"", Scope::Decorator).unwrap();
        assert!(f.matches_decorator(&Decorator::marker("GET")));
    }

    #[test]
    fn record_keys_are_rejected_inside_decorator_scope() {
        let err = parse_statement("ds.any(path ~ web)").unwrap_err();
        assert!(matches!(err, ExprError::KeyScope { .. }));
    }

    #[test]
    fn semantic_errors() {
        assert!(matches!(
            parse_statement("ds.find(colour = red)").unwrap_err(),
            ExprError::UnknownKey(_)
        ));
        assert!(matches!(
            parse_statement("ds.find(line ~ 3)").unwrap_err(),
            ExprError::Operator { .. }
        ));
        assert!(matches!(
            parse_statement("ds.find(name > 3)").unwrap_err(),
            ExprError::Operator { .. }
        ));
        assert!(matches!(
            parse_statement("ds.find(line > ten)").unwrap_err(),
            ExprError::NotANumber { .. }
        ));
        assert!(matches!(
            parse_statement("ds.frobnicate()").unwrap_err(),
            ExprError::UnknownMethod(_)
        ));
        assert!(matches!(
            parse_statement("ds.by_name()").unwrap_err(),
            ExprError::Arguments { .. }
        ));
        assert!(matches!(
            parse_statement("ds.count().by_name(x)").unwrap_err(),
            ExprError::TerminalNotLast(_)
        ));
        assert!(matches!(
            parse_statement("let ds = ds.by_name(x)").unwrap_err(),
            ExprError::Reserved(_)
        ));
    }

    #[test]
    fn syntax_errors_report_a_column() {
        let err = parse_statement("ds.any(name ~ Auth").unwrap_err();
        assert!(matches!(err, ExprError::Syntax { .. }));
    }

    #[test]
    fn not_keyword_requires_a_boundary() {
        let f = parse_filter("not name = X", Scope::Decorator).unwrap();
        assert!(f.matches_decorator(&Decorator::marker("Y")));
        assert!(matches!(
            parse_filter("nothing = X", Scope::Decorator).unwrap_err(),
            ExprError::UnknownKey(_)
        ));
    }

    #[test]
    fn pipelines_do_not_mutate_their_input() {
        let rs = sample();
        let _ = run("ds.by_name(Auth).find(line > 15)").apply(&rs);
        assert_eq!(rs.len(), 4);
    }
}
