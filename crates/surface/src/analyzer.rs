use crate::error::Result;
use crate::language::Language;
use crate::python::PythonAnalyzer;
use crate::script::ScriptAnalyzer;
use crate::skeleton::InterfaceSkeleton;

/// Closed set of language analyzers behind one extraction capability
pub enum Analyzer {
    Python(PythonAnalyzer),
    Js(ScriptAnalyzer),
    Ts(ScriptAnalyzer),
}

impl Analyzer {
    /// Look up the analyzer registered for a language
    ///
    /// `Ok(None)` means no analyzer exists for the language; that is a
    /// normal outcome, not an error.
    pub fn for_language(language: Language) -> Result<Option<Self>> {
        match language {
            Language::Python => Ok(Some(Self::Python(PythonAnalyzer::new()?))),
            Language::JavaScript => Ok(Some(Self::Js(ScriptAnalyzer::new_javascript()?))),
            Language::TypeScript => Ok(Some(Self::Ts(ScriptAnalyzer::new_typescript()?))),
            Language::Unknown => Ok(None),
        }
    }

    /// Extract a file's public interface; broken syntax yields whatever
    /// parsed
    pub fn extract(&mut self, source: &str, file_path: &str) -> InterfaceSkeleton {
        match self {
            Self::Python(analyzer) => analyzer.extract(source, file_path),
            Self::Js(analyzer) | Self::Ts(analyzer) => analyzer.extract(source, file_path),
        }
    }
}

/// Reduce a source file to its interface skeleton
///
/// Returns `None` when no analyzer is registered for the language. A
/// grammar that fails to load is logged and reported the same way, so the
/// caller degrades to content-hash-only tracking.
pub fn extract_interface(
    source: &str,
    file_path: &str,
    language: Language,
) -> Option<InterfaceSkeleton> {
    match Analyzer::for_language(language) {
        Ok(Some(mut analyzer)) => Some(analyzer.extract(source, file_path)),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Analyzer unavailable for {}: {e}", language.as_str());
            None
        }
    }
}
