use serde::{Deserialize, Serialize};

/// One annotation reduced to a searchable `{name, value}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decorator {
    pub name: String,
    /// Empty for marker annotations.
    pub value: String,
}

impl Decorator {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn marker(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }
}

/// A method together with every annotation that applies to it.
///
/// `decorators` holds class annotations first, then the method's own, then
/// its parameters' annotations, each group in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub path: String,
    pub class_name: String,
    pub function: String,
    pub line: usize,
    pub decorators: Vec<Decorator>,
}

impl FunctionRecord {
    pub fn has_decorator_name(&self, needle: &str) -> bool {
        self.decorators.iter().any(|d| d.name.contains(needle))
    }

    pub fn has_decorator_value(&self, needle: &str) -> bool {
        self.decorators.iter().any(|d| d.value.contains(needle))
    }
}
