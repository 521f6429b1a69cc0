//! Parser-independent view of the declarations the normalizer consumes.
//!
//! A [`SourceParser`] turns file text into a flat list of [`ClassDecl`]s.
//! Nested types are returned as their own entries rather than as members of
//! their enclosing class.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationArgument {
    /// A single literal. String delimiters are already stripped.
    Literal(String),
    /// `member` or `qualifier.member`, e.g. an enum constant.
    Reference {
        qualifier: Option<String>,
        member: String,
    },
    Array(Vec<AnnotationArgument>),
    /// Marker annotation, or an empty argument list.
    Absent,
    /// Any other payload; `kind` is the grammar node kind that produced it.
    Unsupported { kind: String },
}

impl AnnotationArgument {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn reference(qualifier: Option<&str>, member: impl Into<String>) -> Self {
        Self::Reference {
            qualifier: qualifier.map(str::to_string),
            member: member.into(),
        }
    }

    pub fn shape(&self) -> &str {
        match self {
            Self::Literal(_) => "literal",
            Self::Reference { .. } => "reference",
            Self::Array(_) => "array",
            Self::Absent => "absent",
            Self::Unsupported { kind } => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub argument: AnnotationArgument,
    pub line: usize,
}

impl Annotation {
    pub fn new(name: impl Into<String>, argument: AnnotationArgument) -> Self {
        Self {
            name: name.into(),
            argument,
            line: 0,
        }
    }

    pub fn marker(name: impl Into<String>) -> Self {
        Self::new(name, AnnotationArgument::Absent)
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    /// 1-based line of the signature, after any modifiers.
    pub line: usize,
    pub parameters: Vec<Parameter>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Method(MethodDecl),
    /// Fields, constructors, initializers, nested types.
    Other { kind: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub kind: ClassKind,
    pub annotations: Vec<Annotation>,
    pub members: Vec<Member>,
}

impl ClassDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            Member::Other { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("failed to load grammar: {0}")]
    Language(String),
    #[error("parser produced no tree")]
    NoTree,
    #[error("syntax error at line {line}, column {column}")]
    Invalid { line: usize, column: usize },
}

pub trait SourceParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Vec<ClassDecl>, SyntaxError>;
}
