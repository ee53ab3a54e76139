use thiserror::Error;

/// Result type for surface extraction
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Errors that can occur while setting up an analyzer
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// No analyzer is registered for the language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Tree-sitter grammar error
    #[error("Grammar error: {0}")]
    Grammar(String),
}

impl SurfaceError {
    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a grammar error
    pub fn grammar(msg: impl Into<String>) -> Self {
        Self::Grammar(msg.into())
    }
}
