use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Canonical model of a file's public declarations
///
/// Built fresh on every analysis pass. Declaration order is whatever the
/// analyzer produced; the canonical encoder sorts before hashing, so two
/// skeletons that differ only in order hash identically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceSkeleton {
    /// Source file path (informational; excluded from canonical encoding)
    pub file_path: String,

    /// Language tag (informational; excluded from canonical encoding)
    pub language: String,

    /// Public module-level constants
    pub constants: Vec<ConstantSig>,

    /// Public module-level functions
    pub functions: Vec<FunctionSig>,

    /// Public classes with their public members
    pub classes: Vec<ClassSig>,

    /// Explicitly exported names
    pub exports: Vec<String>,
}

impl InterfaceSkeleton {
    /// Create an empty skeleton for a file
    pub fn new(file_path: impl Into<String>, language: Language) -> Self {
        Self {
            file_path: file_path.into(),
            language: language.as_str().to_string(),
            constants: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// Check whether no public declarations were extracted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
            && self.functions.is_empty()
            && self.classes.is_empty()
            && self.exports.is_empty()
    }
}

/// A public constant declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstantSig {
    /// Constant name
    pub name: String,

    /// Type annotation text, verbatim, if declared
    pub type_annotation: Option<String>,
}

impl ConstantSig {
    pub fn new(name: impl Into<String>, type_annotation: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_annotation,
        }
    }
}

/// A single function parameter
///
/// Default-value text is opaque: it is compared byte-for-byte, never
/// evaluated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterSig {
    /// Parameter name
    pub name: String,

    /// Type annotation text, verbatim, if declared
    pub type_annotation: Option<String>,

    /// Default value text, verbatim, if declared
    pub default: Option<String>,
}

impl ParameterSig {
    pub fn new(
        name: impl Into<String>,
        type_annotation: Option<String>,
        default: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_annotation,
            default,
        }
    }

    /// Parameter with neither annotation nor default
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, None, None)
    }
}

/// A public function or method signature
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionSig {
    /// Function name
    pub name: String,

    /// Parameters in declaration order; the implicit receiver of a method
    /// is elided
    pub parameters: Vec<ParameterSig>,

    /// Return type annotation text, verbatim, if declared
    pub return_type: Option<String>,

    /// Declared with async syntax
    pub is_async: bool,

    /// Declared inside a class body
    pub is_method: bool,

    /// Static method (no receiver)
    pub is_static: bool,

    /// Class-level method (receives the class, not an instance)
    pub is_class_method: bool,

    /// Property-style accessor
    pub is_property: bool,
}

impl FunctionSig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A public class with its public members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassSig {
    /// Class name
    pub name: String,

    /// Base types in declaration order; base order is semantically
    /// meaningful for inheritance and is never sorted
    pub bases: Vec<String>,

    /// Public methods
    pub methods: Vec<FunctionSig>,

    /// Public class-level constants
    pub constants: Vec<ConstantSig>,
}

impl ClassSig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            methods: Vec::new(),
            constants: Vec::new(),
        }
    }
}
