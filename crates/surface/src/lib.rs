//! # Scribe Surface
//!
//! Language-pluggable extraction of a source file's public interface into a
//! canonical, order-independent model.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> Tree-sitter Parsing → AST
//!     │
//!     ├──> Interface Extraction
//!     │    ├─> Top-level and class-body declarations only
//!     │    ├─> Per-language visibility rules
//!     │    └─> Partial results on broken syntax
//!     │
//!     └──> Canonical Encoding
//!          ├─> Name-sorted, version-tagged byte form
//!          └─> Stable input for interface hashing
//! ```
//!
//! ## Example
//!
//! ```rust
//! use scribe_surface::{encode, extract_interface, Language};
//!
//! let source = "def greet(name: str) -> str:\n    return name\n";
//! let skeleton = extract_interface(source, "greet.py", Language::Python).unwrap();
//! assert_eq!(skeleton.functions[0].name, "greet");
//!
//! // Canonical bytes are what the fingerprint engine hashes.
//! let canonical = encode(&skeleton);
//! assert!(!canonical.is_empty());
//! ```

mod analyzer;
mod encode;
mod error;
mod language;
mod python;
mod script;
mod skeleton;

pub use analyzer::{extract_interface, Analyzer};
pub use encode::{encode, ENCODING_VERSION};
pub use error::{Result, SurfaceError};
pub use language::Language;
pub use python::PythonAnalyzer;
pub use script::ScriptAnalyzer;
pub use skeleton::{ClassSig, ConstantSig, FunctionSig, InterfaceSkeleton, ParameterSig};
