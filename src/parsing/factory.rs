//! Extractor factory for creating language-specific extractors
//!
//! This module provides a factory for creating extractors based on
//! language detection and configuration settings.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::{
    DiscoveredEndpoint, EndpointExtractor, GoExtractor, JavaScriptExtractor, Language, ParseError,
    PythonExtractor, RustExtractor,
};
use crate::Settings;

/// Factory for creating endpoint extractors based on configuration
#[derive(Debug, Clone)]
pub struct ExtractorFactory {
    settings: Arc<Settings>,
}

impl ExtractorFactory {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Create an extractor for the specified language
    pub fn create_extractor(
        &self,
        language: Language,
    ) -> Result<Box<dyn EndpointExtractor>, ParseError> {
        if !self.is_language_enabled(language) {
            return Err(ParseError::LanguageDisabled(language));
        }

        match language {
            Language::Python => Ok(Box::new(PythonExtractor::new()?)),
            Language::JavaScript => Ok(Box::new(JavaScriptExtractor::javascript()?)),
            Language::TypeScript => Ok(Box::new(JavaScriptExtractor::typescript()?)),
            Language::Rust => Ok(Box::new(RustExtractor::new()?)),
            Language::Go => Ok(Box::new(GoExtractor::new()?)),
        }
    }

    pub fn is_language_enabled(&self, language: Language) -> bool {
        self.settings
            .languages
            .get(language.config_key())
            .is_some_and(|config| config.enabled)
    }

    pub fn enabled_languages(&self) -> Vec<Language> {
        self.settings.enabled_languages()
    }

    /// Language for a file path, honoring configured extensions
    pub fn language_for(&self, path: &Path) -> Option<Language> {
        self.settings.language_for(path)
    }

    pub fn extractor_set(&self) -> ExtractorSet {
        ExtractorSet {
            factory: self.clone(),
            extractors: HashMap::new(),
        }
    }
}

/// Lazily created extractors, one per language. Each worker thread owns one.
pub struct ExtractorSet {
    factory: ExtractorFactory,
    extractors: HashMap<Language, Box<dyn EndpointExtractor>>,
}

impl ExtractorSet {
    pub fn extract(
        &mut self,
        language: Language,
        code: &str,
        file: &Path,
    ) -> Result<Vec<DiscoveredEndpoint>, ParseError> {
        if !self.extractors.contains_key(&language) {
            let extractor = self.factory.create_extractor(language)?;
            self.extractors.insert(language, extractor);
        }

        Ok(self
            .extractors
            .get_mut(&language)
            .map(|extractor| extractor.extract(code, file))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_every_extractor() {
        let factory = ExtractorFactory::new(Arc::new(Settings::default()));

        for language in Language::ALL {
            let extractor = factory.create_extractor(language).unwrap();
            assert_eq!(extractor.language(), language);
        }
    }

    #[test]
    fn test_disabled_language() {
        let mut settings = Settings::default();
        if let Some(go) = settings.languages.get_mut("go") {
            go.enabled = false;
        }

        let factory = ExtractorFactory::new(Arc::new(settings));
        let result = factory.create_extractor(Language::Go);
        assert!(matches!(result, Err(ParseError::LanguageDisabled(Language::Go))));
        assert!(!factory.enabled_languages().contains(&Language::Go));
    }

    #[test]
    fn test_extractor_set_reuses_extractors() {
        let factory = ExtractorFactory::new(Arc::new(Settings::default()));
        let mut set = factory.extractor_set();

        let first = set
            .extract(Language::Python, "@app.get('/a')\ndef a(): pass\n", Path::new("a.py"))
            .unwrap();
        let second = set
            .extract(Language::Python, "@app.post('/b')\ndef b(): pass\n", Path::new("b.py"))
            .unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second[0].to_string(), "POST /b");
        assert_eq!(set.extractors.len(), 1);
    }
}
