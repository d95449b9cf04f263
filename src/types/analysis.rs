//! Entity model produced by the extractor.

use serde::{Deserialize, Serialize};

/// Discriminator for a class record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
}

/// Discriminator for a method record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Method,
}

/// Structural summary of a single source unit.
///
/// Entities appear in the order the tree walk first reached them. Nothing
/// downstream reorders them, so two analyses of the same text compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Caller-supplied label, copied verbatim.
    pub file_path: String,

    /// Class records in traversal order.
    pub entities: Vec<ClassEntity>,
}

impl FileAnalysis {
    /// Create an analysis with no entities.
    pub fn empty(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            entities: Vec::new(),
        }
    }

    /// Find the first method named `name`, searching classes in order and
    /// then methods in declaration order.
    pub fn find_method(&self, name: &str) -> Option<(&ClassEntity, &MethodEntity)> {
        self.entities.iter().find_map(|class| {
            class
                .methods
                .iter()
                .find(|method| method.name == name)
                .map(|method| (class, method))
        })
    }

    /// All method names in model order, duplicates included.
    pub fn method_names(&self) -> Vec<&str> {
        self.entities
            .iter()
            .flat_map(|class| class.methods.iter().map(|m| m.name.as_str()))
            .collect()
    }

    /// Total number of methods across all classes.
    pub fn method_count(&self) -> usize {
        self.entities.iter().map(|c| c.methods.len()).sum()
    }
}

/// A class definition found anywhere in the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntity {
    #[serde(rename = "type")]
    pub kind: ClassKind,

    pub name: String,

    /// Leading string literal of the class body, if any.
    pub docstring: Option<String>,

    /// Direct function members of the class body, in declaration order.
    pub methods: Vec<MethodEntity>,
}

impl ClassEntity {
    pub fn new(name: &str, docstring: Option<String>) -> Self {
        Self {
            kind: ClassKind::Class,
            name: name.to_string(),
            docstring,
            methods: Vec::new(),
        }
    }
}

/// A function declared directly in a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntity {
    #[serde(rename = "type")]
    pub kind: MethodKind,

    pub name: String,

    /// Parameter names as declared, including `self`/`cls`.
    pub args: Vec<String>,

    pub docstring: Option<String>,

    /// 1-based line of the `def` keyword.
    pub line_start: usize,
}

impl MethodEntity {
    pub fn new(name: &str, args: Vec<String>, docstring: Option<String>, line_start: usize) -> Self {
        Self {
            kind: MethodKind::Method,
            name: name.to_string(),
            args,
            docstring,
            line_start,
        }
    }
}
