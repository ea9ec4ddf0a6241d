//! Test utilities for configuration testing.

use crate::ParserConfig;
use std::io::Write;
use tempfile::NamedTempFile;

/// Test configuration builder for creating test configurations easily.
pub struct TestConfigBuilder {
    config: ParserConfig,
}

impl TestConfigBuilder {
    /// Create a new test configuration builder seeded with defaults.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Replace the red-letter aliases.
    pub fn red_letter_classes(mut self, classes: &[&str]) -> Self {
        self.config.red_letter_classes = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a superscription opening phrase.
    pub fn superscription_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.superscription_prefixes.push(prefix.into());
        self
    }

    /// Set the default footnote markers.
    pub fn markers<S: Into<String>>(mut self, footnote: S, cross_reference: S) -> Self {
        self.config.footnote_marker = footnote.into();
        self.config.cross_reference_marker = cross_reference.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ParserConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `contents` to a temporary file with the given extension.
pub fn write_temp_config(contents: &str, extension: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
