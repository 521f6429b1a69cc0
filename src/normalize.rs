//! Annotation normalizer: flattens a class's methods into [`FunctionRecord`]s.
//!
//! Each annotation is reduced to a [`Decorator`] according to the shape of its
//! argument. Shapes we cannot reduce never fail the record; they are logged
//! and handled according to the [`UnsupportedPolicy`].

use thiserror::Error;

use crate::record::{Decorator, FunctionRecord};
use crate::syntax::{Annotation, AnnotationArgument, ClassDecl, MethodDecl};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported argument shape `{shape}` in @{annotation}")]
pub struct UnsupportedShape {
    pub annotation: String,
    pub shape: String,
}

/// What to do with an annotation whose argument cannot be reduced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Omit the decorator entirely, name included.
    #[default]
    Drop,
    /// Keep the name with an empty value so name searches still see it.
    KeepName,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    policy: UnsupportedPolicy,
}

impl Normalizer {
    pub fn new(policy: UnsupportedPolicy) -> Self {
        Self { policy }
    }

    /// One record per method declared directly in `class`, in member order.
    pub fn normalize_class(&self, path: &str, class: &ClassDecl) -> Vec<FunctionRecord> {
        class
            .methods()
            .map(|method| self.normalize_method(path, class, method))
            .collect()
    }

    fn normalize_method(&self, path: &str, class: &ClassDecl, method: &MethodDecl) -> FunctionRecord {
        let sources = class
            .annotations
            .iter()
            .chain(method.annotations.iter())
            .chain(method.parameters.iter().flat_map(|p| p.annotations.iter()));

        let decorators = sources
            .filter_map(|annotation| self.decorator_for(path, annotation))
            .collect();

        FunctionRecord {
            path: path.to_string(),
            class_name: class.name.clone(),
            function: method.name.clone(),
            line: method.line,
            decorators,
        }
    }

    fn decorator_for(&self, path: &str, annotation: &Annotation) -> Option<Decorator> {
        match reduce(annotation) {
            Ok(decorator) => Some(decorator),
            Err(err) => {
                tracing::warn!(path, line = annotation.line, "{err}");
                match self.policy {
                    UnsupportedPolicy::Drop => None,
                    UnsupportedPolicy::KeepName => Some(Decorator::marker(&annotation.name)),
                }
            }
        }
    }
}

/// Reduce one annotation to its `{name, value}` pair.
///
/// Arrays join their literal elements with `,`; other elements are skipped
/// with a warning.
pub fn reduce(annotation: &Annotation) -> Result<Decorator, UnsupportedShape> {
    let value = match &annotation.argument {
        AnnotationArgument::Literal(text) => text.clone(),
        AnnotationArgument::Reference { qualifier, member } => match qualifier {
            Some(q) if !q.is_empty() => format!("{q}.{member}"),
            _ => member.clone(),
        },
        AnnotationArgument::Array(elements) => elements
            .iter()
            .filter_map(|element| match element {
                AnnotationArgument::Literal(text) => Some(text.as_str()),
                other => {
                    tracing::warn!(
                        line = annotation.line,
                        "skipping `{}` element in array argument of @{}",
                        other.shape(),
                        annotation.name
                    );
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(","),
        AnnotationArgument::Absent => String::new(),
        AnnotationArgument::Unsupported { kind } => {
            return Err(UnsupportedShape {
                annotation: annotation.name.clone(),
                shape: kind.clone(),
            });
        }
    };

    Ok(Decorator::new(annotation.name.clone(), value))
}
