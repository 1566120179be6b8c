//! Analyzer configuration

use std::fmt;
use forge_ast::AccessForm;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{Primitive, Type, DECIMAL, INTEGER};

/// Source language being analyzed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Manual ownership: single-owner values move, scoped tokens borrow
    #[default]
    RazorForge,
    /// Automatic reference counting: values are shared handles
    Suflae,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "rf" => Some(Language::RazorForge),
            "sf" => Some(Language::Suflae),
            _ => None,
        }
    }

    /// Whether initialization and assignment from a reference-semantics binding moves it
    pub fn moves_on_assignment(&self) -> bool {
        matches!(self, Language::RazorForge)
    }

    pub fn supports_access(&self, form: AccessForm) -> bool {
        match self {
            Language::RazorForge => true,
            Language::Suflae => matches!(form, AccessForm::Seizing | AccessForm::Observing),
        }
    }

    /// `danger!` and `mayhem!` blocks
    pub fn supports_unsafe_blocks(&self) -> bool {
        matches!(self, Language::RazorForge)
    }

    pub fn supports_usurping(&self) -> bool {
        matches!(self, Language::RazorForge)
    }

    /// Type given to an unannotated binding of an unsuffixed integer literal
    pub fn default_integer(&self) -> Type {
        match self {
            Language::RazorForge => Type::Primitive(Primitive::S64),
            Language::Suflae => Type::named(INTEGER),
        }
    }

    /// Type given to an unannotated binding of an unsuffixed fractional literal
    pub fn default_fractional(&self) -> Type {
        match self {
            Language::RazorForge => Type::Primitive(Primitive::F64),
            Language::Suflae => Type::named(DECIMAL),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::RazorForge => write!(f, "RazorForge"),
            Language::Suflae => write!(f, "Suflae"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid analyzer configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub language: Language,
    /// Skip prelude modules the loader cannot provide instead of reporting them
    pub tolerate_missing_prelude: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            language: Language::RazorForge,
            tolerate_missing_prelude: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn with_tolerate_missing_prelude(mut self, tolerate: bool) -> Self {
        self.tolerate_missing_prelude = tolerate;
        self
    }

    /// Parse a configuration table such as:
    ///
    /// ```toml
    /// language = "suflae"
    /// tolerate_missing_prelude = false
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rf"), Some(Language::RazorForge));
        assert_eq!(Language::from_extension("sf"), Some(Language::Suflae));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn test_language_policies() {
        assert!(Language::RazorForge.supports_access(AccessForm::Viewing));
        assert!(!Language::Suflae.supports_access(AccessForm::Hijacking));
        assert!(Language::Suflae.supports_access(AccessForm::Observing));
        assert!(!Language::Suflae.moves_on_assignment());
        assert_eq!(Language::Suflae.default_integer(), Type::named("Integer"));
        assert_eq!(
            Language::RazorForge.default_fractional(),
            Type::Primitive(Primitive::F64)
        );
    }

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.language, Language::RazorForge);
        assert!(config.tolerate_missing_prelude);
    }

    #[test]
    fn test_from_toml() {
        let config = AnalyzerConfig::from_toml_str(
            "language = \"suflae\"\ntolerate_missing_prelude = false\n",
        )
        .unwrap();
        assert_eq!(
            config,
            AnalyzerConfig::new(Language::Suflae).with_tolerate_missing_prelude(false)
        );

        let partial = AnalyzerConfig::from_toml_str("language = \"razorforge\"").unwrap();
        assert!(partial.tolerate_missing_prelude);
    }

    #[test]
    fn test_from_toml_rejects_unknown() {
        assert!(AnalyzerConfig::from_toml_str("language = \"cobol\"").is_err());
        assert!(AnalyzerConfig::from_toml_str("strict = true").is_err());
    }
}
