//! One shared parser instance per translation

use crate::content_tree::ContentTreeParser;
use crate::passage::PassageParser;
use crate::verse_export::VerseExportParser;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use verso_core::{
    Chapter, ChapterError, ChapterParser, ParserConfig, ParserError, SourceFamily, Translation,
};

static GLOBAL: LazyLock<ParserRegistry> =
    LazyLock::new(|| ParserRegistry::new(Arc::new(ParserConfig::default())));

/// Immutable map from translation to its parser
///
/// Built once; parsers hold only shared configuration, so the registry can be
/// used from any number of threads without locking.
pub struct ParserRegistry {
    config: Arc<ParserConfig>,
    parsers: HashMap<Translation, Arc<dyn ChapterParser>>,
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut translations: Vec<_> = self.parsers.keys().collect();
        translations.sort();
        f.debug_struct("ParserRegistry")
            .field("translations", &translations)
            .field("config", &self.config)
            .finish()
    }
}

impl ParserRegistry {
    /// Build parsers for every supported translation
    pub fn new(config: Arc<ParserConfig>) -> Self {
        let parsers = Translation::ALL
            .iter()
            .map(|&translation| (translation, Self::build(translation, &config)))
            .collect();
        tracing::debug!(translations = Translation::ALL.len(), "parser registry built");
        Self { config, parsers }
    }

    /// Process-wide registry with the default configuration
    pub fn global() -> &'static ParserRegistry {
        &GLOBAL
    }

    fn build(translation: Translation, config: &Arc<ParserConfig>) -> Arc<dyn ChapterParser> {
        let config = Arc::clone(config);
        match translation.family() {
            SourceFamily::Passage => Arc::new(PassageParser::with_config(translation, config)),
            SourceFamily::VerseExport => {
                Arc::new(VerseExportParser::with_config(translation, config))
            }
            SourceFamily::ContentTree => {
                Arc::new(ContentTreeParser::with_config(translation, config))
            }
        }
    }

    /// Configuration shared by every parser
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parser for a translation
    pub fn get(&self, translation: Translation) -> Option<Arc<dyn ChapterParser>> {
        self.parsers.get(&translation).cloned()
    }

    /// Parse a payload with the translation's parser
    ///
    /// Failures carry the translation and, when the payload has one, the
    /// reference string.
    pub fn parse(
        &self,
        translation: Translation,
        payload: &serde_json::Value,
    ) -> Result<Chapter, ChapterError> {
        let parser = self.parsers.get(&translation).ok_or_else(|| {
            ChapterError::new(
                translation,
                payload_reference(payload),
                ParserError::UnknownTranslation(translation.to_string()),
            )
        })?;

        parser.parse(payload).map_err(|source| {
            let reference = payload_reference(payload);
            tracing::warn!(
                parser = %parser.name(),
                reference = reference.as_deref().unwrap_or_default(),
                error = %source,
                "chapter parse failed"
            );
            ChapterError::new(translation, reference, source)
        })
    }
}

/// Reference string in any of the three payload shapes
fn payload_reference(payload: &serde_json::Value) -> Option<String> {
    let body = payload.get("data").filter(|d| d.is_object()).unwrap_or(payload);
    body.get("canonical")
        .or_else(|| body.get("reference"))
        .or_else(|| body.pointer("/passages/0/reference"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
